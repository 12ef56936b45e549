use monitor_core::{Alert, AlertKind, AlertSeverity, Detector, PatientHistory, SignalKind};

/// Systolic strictly below this counts as hypotension here.
const SYSTOLIC_FLOOR: f64 = 90.0;
const OXYGEN_FLOOR: f64 = 92.0;

const KINDS: [AlertKind; 1] = [AlertKind::HypotensiveHypoxemia];

/// Hypotension and hypoxemia at the same time, judged from the latest
/// reading of each signal independently of any window.
#[derive(Debug, Default)]
pub struct CombinedDetector;

impl CombinedDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Detector for CombinedDetector {
    fn category(&self) -> &'static str {
        "combined"
    }

    fn kinds(&self) -> &'static [AlertKind] {
        &KINDS
    }

    fn evaluate(&self, patient_id: u32, history: &PatientHistory) -> Vec<Alert> {
        let systolic = match history.latest(&SignalKind::SystolicBp) {
            Some(reading) => reading,
            None => return Vec::new(),
        };
        let oxygen = match history.latest(&SignalKind::OxygenSaturation) {
            Some(reading) => reading,
            None => return Vec::new(),
        };

        if systolic.value < SYSTOLIC_FLOOR && oxygen.value < OXYGEN_FLOOR {
            return vec![Alert::new(
                patient_id,
                AlertKind::HypotensiveHypoxemia,
                "Critical condition: Hypotensive Hypoxemia detected - Low blood pressure and low oxygen saturation",
                systolic.timestamp.max(oxygen.timestamp),
                AlertSeverity::Critical,
            )];
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monitor_core::VitalRecord;

    fn history(systolic: Option<(f64, i64)>, oxygen: Option<(f64, i64)>) -> PatientHistory {
        let mut h = PatientHistory::new();
        if let Some((value, ts)) = systolic {
            h.merge(vec![VitalRecord::new(1, SignalKind::SystolicBp, value, ts)]);
        }
        if let Some((value, ts)) = oxygen {
            h.merge(vec![VitalRecord::new(
                1,
                SignalKind::OxygenSaturation,
                value,
                ts,
            )]);
        }
        h
    }

    #[test]
    fn test_both_low_raises_critical_with_later_timestamp() {
        let detector = CombinedDetector::new();
        let alerts = detector.evaluate(1, &history(Some((85.0, 1000)), Some((91.0, 5000))));

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::HypotensiveHypoxemia);
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
        assert_eq!(alerts[0].timestamp, 5000);
    }

    #[test]
    fn test_later_systolic_timestamp_wins_too() {
        let detector = CombinedDetector::new();
        let alerts = detector.evaluate(1, &history(Some((85.0, 9000)), Some((91.0, 5000))));
        assert_eq!(alerts[0].timestamp, 9000);
    }

    #[test]
    fn test_low_bp_alone_is_not_combined() {
        let detector = CombinedDetector::new();
        assert!(detector
            .evaluate(1, &history(Some((85.0, 1000)), Some((95.0, 1000))))
            .is_empty());
    }

    #[test]
    fn test_low_oxygen_alone_is_not_combined() {
        let detector = CombinedDetector::new();
        assert!(detector
            .evaluate(1, &history(Some((110.0, 1000)), Some((91.0, 1000))))
            .is_empty());
    }

    #[test]
    fn test_systolic_bound_is_strict() {
        let detector = CombinedDetector::new();
        // 90 exactly is low for the threshold rule but not for this one.
        assert!(detector
            .evaluate(1, &history(Some((90.0, 1000)), Some((91.0, 1000))))
            .is_empty());
    }

    #[test]
    fn test_missing_signal_raises_nothing() {
        let detector = CombinedDetector::new();
        assert!(detector
            .evaluate(1, &history(Some((85.0, 1000)), None))
            .is_empty());
        assert!(detector
            .evaluate(1, &history(None, Some((91.0, 1000))))
            .is_empty());
    }
}
