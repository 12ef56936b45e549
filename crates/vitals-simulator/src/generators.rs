use monitor_core::{SignalKind, VitalRecord};
use rand::{thread_rng, Rng};

// Physiological bounds the synthetic values stay inside.
const SYSTOLIC_RANGE: (f64, f64) = (90.0, 180.0);
const DIASTOLIC_RANGE: (f64, f64) = (60.0, 120.0);
const SATURATION_RANGE: (f64, f64) = (90.0, 100.0);
const ECG_RANGE: (f64, f64) = (30.0, 200.0);

/// Probability of a patient pressing the call button on any given check.
const MARKER_TRIGGER_LAMBDA: f64 = 0.1;
/// Probability an open manual alert gets resolved on the next check.
const MARKER_RESOLVE_P: f64 = 0.9;

/// One synthetic signal source with per-patient state.
///
/// Patient ids are 1-based; implementations size their state for
/// `patient_count + 1` and index directly.
pub trait VitalGenerator: Send {
    /// Name for scheduler logs.
    fn name(&self) -> &'static str;

    /// Produce this source's records for one patient at one instant.
    fn generate(&mut self, patient_id: u32, now_ms: i64) -> Vec<VitalRecord>;
}

/// Random walk around a per-patient baseline, clamped to a fixed range.
fn walk(rng: &mut impl Rng, value: f64, step: i64, range: (f64, f64)) -> f64 {
    let next = value + rng.gen_range(-step..=step) as f64;
    next.clamp(range.0, range.1)
}

pub struct BloodPressureGenerator {
    systolic: Vec<f64>,
    diastolic: Vec<f64>,
}

impl BloodPressureGenerator {
    pub fn new(patient_count: u32) -> Self {
        let mut rng = thread_rng();
        let size = patient_count as usize + 1;
        Self {
            systolic: (0..size).map(|_| rng.gen_range(110..=130) as f64).collect(),
            diastolic: (0..size).map(|_| rng.gen_range(70..=85) as f64).collect(),
        }
    }
}

impl VitalGenerator for BloodPressureGenerator {
    fn name(&self) -> &'static str {
        "blood_pressure"
    }

    fn generate(&mut self, patient_id: u32, now_ms: i64) -> Vec<VitalRecord> {
        let mut rng = thread_rng();
        let idx = patient_id as usize;
        self.systolic[idx] = walk(&mut rng, self.systolic[idx], 5, SYSTOLIC_RANGE);
        self.diastolic[idx] = walk(&mut rng, self.diastolic[idx], 5, DIASTOLIC_RANGE);
        vec![
            VitalRecord::new(patient_id, SignalKind::SystolicBp, self.systolic[idx], now_ms),
            VitalRecord::new(patient_id, SignalKind::DiastolicBp, self.diastolic[idx], now_ms),
        ]
    }
}

pub struct SaturationGenerator {
    last: Vec<f64>,
}

impl SaturationGenerator {
    pub fn new(patient_count: u32) -> Self {
        let mut rng = thread_rng();
        let size = patient_count as usize + 1;
        Self {
            last: (0..size).map(|_| rng.gen_range(95..=100) as f64).collect(),
        }
    }
}

impl VitalGenerator for SaturationGenerator {
    fn name(&self) -> &'static str {
        "saturation"
    }

    fn generate(&mut self, patient_id: u32, now_ms: i64) -> Vec<VitalRecord> {
        let mut rng = thread_rng();
        let idx = patient_id as usize;
        self.last[idx] = walk(&mut rng, self.last[idx], 1, SATURATION_RANGE);
        vec![VitalRecord::new(
            patient_id,
            SignalKind::OxygenSaturation,
            self.last[idx],
            now_ms,
        )]
    }
}

pub struct EcgGenerator {
    last: Vec<f64>,
}

impl EcgGenerator {
    pub fn new(patient_count: u32) -> Self {
        let size = patient_count as usize + 1;
        // Resting rate varies by patient, not by time.
        Self {
            last: (0..size).map(|id| 70.0 + (id % 5) as f64 * 10.0).collect(),
        }
    }
}

impl VitalGenerator for EcgGenerator {
    fn name(&self) -> &'static str {
        "ecg"
    }

    fn generate(&mut self, patient_id: u32, now_ms: i64) -> Vec<VitalRecord> {
        let mut rng = thread_rng();
        let idx = patient_id as usize;
        self.last[idx] = walk(&mut rng, self.last[idx], 10, ECG_RANGE);
        vec![VitalRecord::new(
            patient_id,
            SignalKind::Ecg,
            self.last[idx],
            now_ms,
        )]
    }
}

/// Lab panel readings. Nothing evaluates these; they exercise the
/// unknown-label path end to end.
pub struct BloodLevelsGenerator {
    cholesterol: Vec<f64>,
    white_cells: Vec<f64>,
    red_cells: Vec<f64>,
}

impl BloodLevelsGenerator {
    pub fn new(patient_count: u32) -> Self {
        let mut rng = thread_rng();
        let size = patient_count as usize + 1;
        Self {
            cholesterol: (0..size).map(|_| rng.gen_range(150.0..=200.0)).collect(),
            white_cells: (0..size).map(|_| rng.gen_range(4.0..=10.0)).collect(),
            red_cells: (0..size).map(|_| rng.gen_range(4.5..=6.0)).collect(),
        }
    }
}

impl VitalGenerator for BloodLevelsGenerator {
    fn name(&self) -> &'static str {
        "blood_levels"
    }

    fn generate(&mut self, patient_id: u32, now_ms: i64) -> Vec<VitalRecord> {
        let mut rng = thread_rng();
        let idx = patient_id as usize;
        let cholesterol = self.cholesterol[idx] + rng.gen_range(-5.0..=5.0);
        let white = self.white_cells[idx] + rng.gen_range(-0.5..=0.5);
        let red = self.red_cells[idx] + rng.gen_range(-0.1..=0.1);
        vec![
            VitalRecord::new(patient_id, SignalKind::parse("Cholesterol"), cholesterol, now_ms),
            VitalRecord::new(patient_id, SignalKind::parse("WhiteBloodCells"), white, now_ms),
            VitalRecord::new(patient_id, SignalKind::parse("RedBloodCells"), red, now_ms),
        ]
    }
}

/// Simulates patients or staff pressing and clearing the manual call button.
pub struct AlertMarkerGenerator {
    active: Vec<bool>,
}

impl AlertMarkerGenerator {
    pub fn new(patient_count: u32) -> Self {
        Self {
            active: vec![false; patient_count as usize + 1],
        }
    }
}

impl VitalGenerator for AlertMarkerGenerator {
    fn name(&self) -> &'static str {
        "alert_marker"
    }

    fn generate(&mut self, patient_id: u32, now_ms: i64) -> Vec<VitalRecord> {
        let mut rng = thread_rng();
        let idx = patient_id as usize;

        if self.active[idx] {
            if rng.gen_bool(MARKER_RESOLVE_P) {
                self.active[idx] = false;
                return vec![VitalRecord::annotated(
                    patient_id,
                    SignalKind::AlertMarker,
                    0.0,
                    now_ms,
                    "resolved",
                )];
            }
        } else {
            let trigger_p = 1.0 - (-MARKER_TRIGGER_LAMBDA).exp();
            if rng.gen_bool(trigger_p) {
                self.active[idx] = true;
                return vec![VitalRecord::annotated(
                    patient_id,
                    SignalKind::AlertMarker,
                    1.0,
                    now_ms,
                    "triggered",
                )];
            }
        }
        Vec::new()
    }
}

/// Fans one generate() call out to a list of sources.
pub struct CompositeGenerator {
    sources: Vec<Box<dyn VitalGenerator>>,
}

impl CompositeGenerator {
    pub fn new(sources: Vec<Box<dyn VitalGenerator>>) -> Self {
        Self { sources }
    }
}

impl VitalGenerator for CompositeGenerator {
    fn name(&self) -> &'static str {
        "composite"
    }

    fn generate(&mut self, patient_id: u32, now_ms: i64) -> Vec<VitalRecord> {
        self.sources
            .iter_mut()
            .flat_map(|source| source.generate(patient_id, now_ms))
            .collect()
    }
}
