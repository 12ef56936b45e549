#[cfg(test)]
mod lifecycle_tests {
    use monitor_core::{Alert, AlertKind, AlertSeverity, Verdict};

    use crate::events::Transition;
    use crate::manager::AlertManager;

    fn systolic_alert(patient_id: u32, message: &str, ts: i64, severity: AlertSeverity) -> Alert {
        Alert::new(patient_id, AlertKind::HighSystolicBp, message, ts, severity)
    }

    #[test]
    fn test_trigger_from_inactive() {
        let manager = AlertManager::new();
        let alert = systolic_alert(1, "bp 185", 1000, AlertSeverity::Critical);

        let event = manager
            .apply(1, AlertKind::HighSystolicBp, Verdict::Alert(alert.clone()))
            .expect("transition expected");

        assert_eq!(event.transition, Transition::Triggered);
        assert_eq!(event.alert, alert);
        assert_eq!(manager.active_alerts_for(1), vec![alert]);
    }

    #[test]
    fn test_update_refreshes_message_and_timestamp_but_not_severity() {
        let manager = AlertManager::new();
        manager.apply(
            1,
            AlertKind::HighSystolicBp,
            Verdict::Alert(systolic_alert(1, "bp 185", 1000, AlertSeverity::Critical)),
        );

        // Second firing reports a different severity; it must not stick.
        let event = manager
            .apply(
                1,
                AlertKind::HighSystolicBp,
                Verdict::Alert(systolic_alert(1, "bp 190", 2000, AlertSeverity::Low)),
            )
            .expect("transition expected");

        assert_eq!(event.transition, Transition::Updated);
        let active = manager.active_alerts_for(1);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].message, "bp 190");
        assert_eq!(active[0].timestamp, 2000);
        assert_eq!(active[0].severity, AlertSeverity::Critical);
    }

    #[test]
    fn test_resolve_from_active_removes_the_entry() {
        let manager = AlertManager::new();
        manager.apply(
            1,
            AlertKind::HighSystolicBp,
            Verdict::Alert(systolic_alert(1, "bp 185", 1000, AlertSeverity::Critical)),
        );

        let event = manager
            .apply(1, AlertKind::HighSystolicBp, Verdict::NoAlert)
            .expect("transition expected");

        assert_eq!(event.transition, Transition::Resolved);
        assert_eq!(event.alert.message, "bp 185");
        assert!(manager.active_alerts_for(1).is_empty());
        assert_eq!(manager.active_count(), 0);
    }

    #[test]
    fn test_no_alert_while_inactive_is_a_no_op() {
        let manager = AlertManager::new();
        assert!(manager.apply(1, AlertKind::HighSystolicBp, Verdict::NoAlert).is_none());
        assert!(manager.all_active_alerts().is_empty());
    }

    #[test]
    fn test_at_most_one_active_alert_per_patient_and_kind() {
        let manager = AlertManager::new();
        for ts in [1000, 2000, 3000] {
            manager.apply(
                1,
                AlertKind::HighSystolicBp,
                Verdict::Alert(systolic_alert(1, "bp high", ts, AlertSeverity::Critical)),
            );
        }

        assert_eq!(manager.active_alerts_for(1).len(), 1);
        assert_eq!(manager.active_count(), 1);
    }

    #[test]
    fn test_kinds_are_independent_within_a_patient() {
        let manager = AlertManager::new();
        manager.apply(
            1,
            AlertKind::HighSystolicBp,
            Verdict::Alert(systolic_alert(1, "bp", 1000, AlertSeverity::Critical)),
        );
        manager.apply(
            1,
            AlertKind::LowOxygenSaturation,
            Verdict::Alert(Alert::new(
                1,
                AlertKind::LowOxygenSaturation,
                "oxygen 91",
                1000,
                AlertSeverity::High,
            )),
        );

        assert_eq!(manager.active_alerts_for(1).len(), 2);

        manager.apply(1, AlertKind::HighSystolicBp, Verdict::NoAlert);
        let remaining = manager.active_alerts_for(1);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].kind, AlertKind::LowOxygenSaturation);
    }

    #[test]
    fn test_patients_are_independent() {
        let manager = AlertManager::new();
        manager.apply(
            1,
            AlertKind::HighSystolicBp,
            Verdict::Alert(systolic_alert(1, "bp", 1000, AlertSeverity::Critical)),
        );
        manager.apply(
            2,
            AlertKind::HighSystolicBp,
            Verdict::Alert(systolic_alert(2, "bp", 1000, AlertSeverity::Critical)),
        );

        manager.apply(1, AlertKind::HighSystolicBp, Verdict::NoAlert);

        assert!(manager.active_alerts_for(1).is_empty());
        assert_eq!(manager.active_alerts_for(2).len(), 1);
        assert_eq!(manager.all_active_alerts().len(), 1);
    }

    #[test]
    fn test_transitions_reach_subscribers() {
        let manager = AlertManager::new();
        let mut rx = manager.subscribe();

        manager.apply(
            1,
            AlertKind::HighSystolicBp,
            Verdict::Alert(systolic_alert(1, "bp 185", 1000, AlertSeverity::Critical)),
        );
        manager.apply(
            1,
            AlertKind::HighSystolicBp,
            Verdict::Alert(systolic_alert(1, "bp 186", 2000, AlertSeverity::Critical)),
        );
        manager.apply(1, AlertKind::HighSystolicBp, Verdict::NoAlert);

        assert_eq!(rx.try_recv().unwrap().transition, Transition::Triggered);
        assert_eq!(rx.try_recv().unwrap().transition, Transition::Updated);
        assert_eq!(rx.try_recv().unwrap().transition, Transition::Resolved);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_emitting_without_subscribers_does_not_fail() {
        let manager = AlertManager::new();
        let event = manager.apply(
            1,
            AlertKind::HighSystolicBp,
            Verdict::Alert(systolic_alert(1, "bp 185", 1000, AlertSeverity::Critical)),
        );
        assert!(event.is_some());
    }

    #[test]
    fn test_clear_empties_the_set_silently() {
        let manager = AlertManager::new();
        let mut rx = manager.subscribe();
        manager.apply(
            1,
            AlertKind::HighSystolicBp,
            Verdict::Alert(systolic_alert(1, "bp 185", 1000, AlertSeverity::Critical)),
        );
        let _ = rx.try_recv();

        manager.clear();
        assert!(manager.all_active_alerts().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_retrigger_after_resolve_is_a_fresh_trigger() {
        let manager = AlertManager::new();
        manager.apply(
            1,
            AlertKind::HighSystolicBp,
            Verdict::Alert(systolic_alert(1, "bp 185", 1000, AlertSeverity::Critical)),
        );
        manager.apply(1, AlertKind::HighSystolicBp, Verdict::NoAlert);

        let event = manager
            .apply(
                1,
                AlertKind::HighSystolicBp,
                Verdict::Alert(systolic_alert(1, "bp 182", 3000, AlertSeverity::High)),
            )
            .expect("transition expected");

        assert_eq!(event.transition, Transition::Triggered);
        // Fresh trigger records the new severity.
        assert_eq!(manager.active_alerts_for(1)[0].severity, AlertSeverity::High);
    }
}
