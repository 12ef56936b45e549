use monitor_core::{Alert, AlertKind, AlertSeverity, Detector, PatientHistory, SignalKind};

/// Readings in the statistical window.
const ECG_WINDOW: usize = 20;
/// Deviation from the window mean, in standard deviations, that counts as
/// abnormal.
const SIGMA_LIMIT: f64 = 2.0;

const KINDS: [AlertKind; 1] = [AlertKind::EcgAbnormalPeak];

/// Flags the latest ECG reading when it sits more than two standard
/// deviations from the mean of the last twenty readings. Inactive until a
/// full window exists.
#[derive(Debug, Default)]
pub struct EcgAnomalyDetector;

impl EcgAnomalyDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Detector for EcgAnomalyDetector {
    fn category(&self) -> &'static str {
        "ecg"
    }

    fn kinds(&self) -> &'static [AlertKind] {
        &KINDS
    }

    fn evaluate(&self, patient_id: u32, history: &PatientHistory) -> Vec<Alert> {
        let window = history.latest_window(&SignalKind::Ecg, ECG_WINDOW);
        if window.len() < ECG_WINDOW {
            return Vec::new();
        }

        let values: Vec<f64> = window.iter().map(|r| r.value).collect();
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let variance = values
            .iter()
            .map(|value| (value - mean).powi(2))
            .sum::<f64>()
            / values.len() as f64;
        let std_dev = variance.sqrt();

        let latest = &window[window.len() - 1];
        if (latest.value - mean).abs() > SIGMA_LIMIT * std_dev {
            return vec![Alert::new(
                patient_id,
                AlertKind::EcgAbnormalPeak,
                format!(
                    "Abnormal ECG peak detected: {} (exceeds threshold)",
                    latest.value
                ),
                latest.timestamp,
                AlertSeverity::High,
            )];
        }
        Vec::new()
    }
}
