use monitor_core::{
    Alert, AlertKind, AlertSeverity, Detector, PatientHistory, SignalKind, VitalRecord,
};

/// Systolic reading at or above this is critical hypertension.
const HIGH_SYSTOLIC: f64 = 180.0;
/// Systolic reading at or below this is hypotension.
const LOW_SYSTOLIC: f64 = 90.0;
const HIGH_DIASTOLIC: f64 = 120.0;
const LOW_DIASTOLIC: f64 = 60.0;
/// Saturation strictly below this is hypoxemia.
const LOW_OXYGEN: f64 = 92.0;

const KINDS: [AlertKind; 5] = [
    AlertKind::HighSystolicBp,
    AlertKind::LowSystolicBp,
    AlertKind::HighDiastolicBp,
    AlertKind::LowDiastolicBp,
    AlertKind::LowOxygenSaturation,
];

/// Fixed-bound checks against the single most recent reading of each
/// covered signal.
#[derive(Debug, Default)]
pub struct ThresholdDetector;

impl ThresholdDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Detector for ThresholdDetector {
    fn category(&self) -> &'static str {
        "threshold"
    }

    fn kinds(&self) -> &'static [AlertKind] {
        &KINDS
    }

    fn evaluate(&self, patient_id: u32, history: &PatientHistory) -> Vec<Alert> {
        let mut alerts = Vec::new();
        if let Some(reading) = history.latest(&SignalKind::SystolicBp) {
            alerts.extend(check_systolic(patient_id, reading));
        }
        if let Some(reading) = history.latest(&SignalKind::DiastolicBp) {
            alerts.extend(check_diastolic(patient_id, reading));
        }
        if let Some(reading) = history.latest(&SignalKind::OxygenSaturation) {
            alerts.extend(check_oxygen(patient_id, reading));
        }
        alerts
    }
}

fn check_systolic(patient_id: u32, reading: &VitalRecord) -> Option<Alert> {
    if reading.value >= HIGH_SYSTOLIC {
        return Some(Alert::new(
            patient_id,
            AlertKind::HighSystolicBp,
            format!(
                "Critical high systolic blood pressure: {} mmHg",
                reading.value
            ),
            reading.timestamp,
            AlertSeverity::Critical,
        ));
    }
    if reading.value <= LOW_SYSTOLIC {
        return Some(Alert::new(
            patient_id,
            AlertKind::LowSystolicBp,
            format!(
                "Critical low systolic blood pressure: {} mmHg",
                reading.value
            ),
            reading.timestamp,
            AlertSeverity::High,
        ));
    }
    None
}

fn check_diastolic(patient_id: u32, reading: &VitalRecord) -> Option<Alert> {
    if reading.value >= HIGH_DIASTOLIC {
        return Some(Alert::new(
            patient_id,
            AlertKind::HighDiastolicBp,
            format!(
                "Critical high diastolic blood pressure: {} mmHg",
                reading.value
            ),
            reading.timestamp,
            AlertSeverity::High,
        ));
    }
    if reading.value <= LOW_DIASTOLIC {
        return Some(Alert::new(
            patient_id,
            AlertKind::LowDiastolicBp,
            format!(
                "Critical low diastolic blood pressure: {} mmHg",
                reading.value
            ),
            reading.timestamp,
            AlertSeverity::Medium,
        ));
    }
    None
}

fn check_oxygen(patient_id: u32, reading: &VitalRecord) -> Option<Alert> {
    if reading.value < LOW_OXYGEN {
        return Some(Alert::new(
            patient_id,
            AlertKind::LowOxygenSaturation,
            format!("Low oxygen saturation: {}%", reading.value),
            reading.timestamp,
            AlertSeverity::High,
        ));
    }
    None
}
