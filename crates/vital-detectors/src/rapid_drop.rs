use monitor_core::{Alert, AlertKind, AlertSeverity, Detector, PatientHistory, SignalKind};

/// Window scanned backwards from the latest reading.
const DROP_WINDOW_MS: i64 = 10 * 60 * 1000;
/// Saturation fall that counts as a rapid drop.
const DROP_THRESHOLD: f64 = 5.0;

const KINDS: [AlertKind; 1] = [AlertKind::RapidOxygenDrop];

/// Oxygen saturation falls of five points or more within ten minutes of
/// the latest reading.
#[derive(Debug, Default)]
pub struct RapidDropDetector;

impl RapidDropDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Detector for RapidDropDetector {
    fn category(&self) -> &'static str {
        "rapid_drop"
    }

    fn kinds(&self) -> &'static [AlertKind] {
        &KINDS
    }

    fn evaluate(&self, patient_id: u32, history: &PatientHistory) -> Vec<Alert> {
        let series = history.series(&SignalKind::OxygenSaturation);
        let latest = match series.last() {
            Some(latest) => latest,
            None => return Vec::new(),
        };

        for earlier in series[..series.len() - 1].iter().rev() {
            if latest.timestamp - earlier.timestamp > DROP_WINDOW_MS {
                break;
            }
            let drop = earlier.value - latest.value;
            if drop >= DROP_THRESHOLD {
                return vec![Alert::new(
                    patient_id,
                    AlertKind::RapidOxygenDrop,
                    format!(
                        "Rapid drop in oxygen saturation of {:.1}% within 10 minutes",
                        drop
                    ),
                    latest.timestamp,
                    AlertSeverity::High,
                )];
            }
        }
        Vec::new()
    }
}
