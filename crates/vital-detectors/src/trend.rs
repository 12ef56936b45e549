use monitor_core::{Alert, AlertKind, AlertSeverity, Detector, PatientHistory, SignalKind, VitalRecord};

/// Consecutive readings examined for a trend.
const TREND_READINGS: usize = 3;
/// A step must move by strictly more than this many units to count.
const TREND_STEP: f64 = 10.0;

const KINDS: [AlertKind; 2] = [AlertKind::BpIncreasingTrend, AlertKind::BpDecreasingTrend];
const BP_SIGNALS: [SignalKind; 2] = [SignalKind::SystolicBp, SignalKind::DiastolicBp];

/// Strictly monotonic blood pressure trends over the last three readings.
///
/// Both BP signals are examined and the first one trending names itself in
/// the message. The trend kinds are shared across the two signals, so a
/// flat series on one signal must not be able to resolve a trend raised by
/// the other.
#[derive(Debug, Default)]
pub struct TrendDetector;

impl TrendDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Detector for TrendDetector {
    fn category(&self) -> &'static str {
        "trend"
    }

    fn kinds(&self) -> &'static [AlertKind] {
        &KINDS
    }

    fn evaluate(&self, patient_id: u32, history: &PatientHistory) -> Vec<Alert> {
        let mut alerts: Vec<Alert> = Vec::new();
        for signal in &BP_SIGNALS {
            let window = history.latest_window(signal, TREND_READINGS);
            if window.len() < TREND_READINGS {
                continue;
            }
            let newest = window[window.len() - 1].timestamp;
            if !has_kind(&alerts, AlertKind::BpIncreasingTrend) && strict_trend(window, 1.0) {
                alerts.push(Alert::new(
                    patient_id,
                    AlertKind::BpIncreasingTrend,
                    format!(
                        "Increasing trend in {} detected over {} readings",
                        signal, TREND_READINGS
                    ),
                    newest,
                    AlertSeverity::Medium,
                ));
            }
            if !has_kind(&alerts, AlertKind::BpDecreasingTrend) && strict_trend(window, -1.0) {
                alerts.push(Alert::new(
                    patient_id,
                    AlertKind::BpDecreasingTrend,
                    format!(
                        "Decreasing trend in {} detected over {} readings",
                        signal, TREND_READINGS
                    ),
                    newest,
                    AlertSeverity::Medium,
                ));
            }
        }
        alerts
    }
}

/// True when every consecutive step moves in `direction` by strictly more
/// than [`TREND_STEP`] units.
fn strict_trend(window: &[VitalRecord], direction: f64) -> bool {
    window
        .windows(2)
        .all(|pair| (pair[1].value - pair[0].value) * direction > TREND_STEP)
}

fn has_kind(alerts: &[Alert], kind: AlertKind) -> bool {
    alerts.iter().any(|alert| alert.kind == kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use monitor_core::VitalRecord;

    fn series(signal: SignalKind, values: &[f64]) -> Vec<VitalRecord> {
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| VitalRecord::new(1, signal.clone(), value, (i as i64 + 1) * 1000))
            .collect()
    }

    #[test]
    fn test_increasing_systolic_trend() {
        let detector = TrendDetector::new();
        let mut history = PatientHistory::new();
        history.merge(series(SignalKind::SystolicBp, &[140.0, 155.0, 170.0]));

        let alerts = detector.evaluate(1, &history);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::BpIncreasingTrend);
        assert_eq!(alerts[0].severity, AlertSeverity::Medium);
        assert!(alerts[0].message.contains("SystolicBP"));
        assert_eq!(alerts[0].timestamp, 3000);
    }

    #[test]
    fn test_decreasing_diastolic_trend() {
        let detector = TrendDetector::new();
        let mut history = PatientHistory::new();
        history.merge(series(SignalKind::DiastolicBp, &[110.0, 95.0, 80.0]));

        let alerts = detector.evaluate(1, &history);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::BpDecreasingTrend);
        assert!(alerts[0].message.contains("DiastolicBP"));
    }

    #[test]
    fn test_steps_of_exactly_ten_do_not_trend() {
        let detector = TrendDetector::new();
        let mut history = PatientHistory::new();
        history.merge(series(SignalKind::SystolicBp, &[140.0, 150.0, 160.0]));

        assert!(detector.evaluate(1, &history).is_empty());
    }

    #[test]
    fn test_one_weak_step_breaks_the_trend() {
        let detector = TrendDetector::new();
        let mut history = PatientHistory::new();
        history.merge(series(SignalKind::SystolicBp, &[140.0, 155.0, 160.0]));

        assert!(detector.evaluate(1, &history).is_empty());
    }

    #[test]
    fn test_two_readings_are_not_enough() {
        let detector = TrendDetector::new();
        let mut history = PatientHistory::new();
        history.merge(series(SignalKind::SystolicBp, &[140.0, 155.0]));

        assert!(detector.evaluate(1, &history).is_empty());
    }

    #[test]
    fn test_only_last_three_readings_count() {
        let detector = TrendDetector::new();
        let mut history = PatientHistory::new();
        // Older rise, then a flat tail.
        history.merge(series(SignalKind::SystolicBp, &[100.0, 120.0, 140.0, 141.0, 142.0]));

        assert!(detector.evaluate(1, &history).is_empty());
    }

    #[test]
    fn test_opposite_trends_on_both_signals_raise_both_kinds() {
        let detector = TrendDetector::new();
        let mut history = PatientHistory::new();
        history.merge(series(SignalKind::SystolicBp, &[140.0, 155.0, 170.0]));
        history.merge(series(SignalKind::DiastolicBp, &[110.0, 95.0, 80.0]));

        let alerts = detector.evaluate(1, &history);
        let kinds: Vec<AlertKind> = alerts.iter().map(|a| a.kind).collect();
        assert_eq!(alerts.len(), 2);
        assert!(kinds.contains(&AlertKind::BpIncreasingTrend));
        assert!(kinds.contains(&AlertKind::BpDecreasingTrend));
    }

    #[test]
    fn test_same_trend_on_both_signals_raises_once() {
        let detector = TrendDetector::new();
        let mut history = PatientHistory::new();
        history.merge(series(SignalKind::SystolicBp, &[140.0, 155.0, 170.0]));
        history.merge(series(SignalKind::DiastolicBp, &[60.0, 75.0, 90.0]));

        let alerts = detector.evaluate(1, &history);
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].message.contains("SystolicBP"));
    }
}
