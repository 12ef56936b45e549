use monitor_core::{Alert, AlertKind, AlertSeverity, Detector, PatientHistory, SignalKind};

/// Marker annotation that raises the alert, compared case-insensitively.
const TRIGGERED: &str = "triggered";

const KINDS: [AlertKind; 1] = [AlertKind::ManualTrigger];

/// Staff or patient initiated alerts carried by "Alert" marker records.
///
/// Only the most recent marker counts. A "resolved" marker (or any other
/// annotation) raises nothing; the orchestrator's derived no-alert verdict
/// then clears any active manual alert, so an explicit resolve and a
/// missing re-trigger end the same way.
#[derive(Debug, Default)]
pub struct ManualDetector;

impl ManualDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Detector for ManualDetector {
    fn category(&self) -> &'static str {
        "manual"
    }

    fn kinds(&self) -> &'static [AlertKind] {
        &KINDS
    }

    fn evaluate(&self, patient_id: u32, history: &PatientHistory) -> Vec<Alert> {
        let marker = match history.latest(&SignalKind::AlertMarker) {
            Some(marker) => marker,
            None => return Vec::new(),
        };
        let annotation = match marker.annotation.as_deref() {
            Some(annotation) => annotation,
            None => return Vec::new(),
        };

        if annotation.eq_ignore_ascii_case(TRIGGERED) {
            return vec![Alert::new(
                patient_id,
                AlertKind::ManualTrigger,
                "Manual alert triggered by patient or staff",
                marker.timestamp,
                AlertSeverity::High,
            )];
        }
        Vec::new()
    }
}
