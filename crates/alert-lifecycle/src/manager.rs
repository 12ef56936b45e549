use std::collections::HashMap;

use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::{debug, info};

use monitor_core::{Alert, AlertKind, Verdict};

use crate::events::{AlertEvent, Transition};

/// Buffered transitions per subscriber before the channel lags.
const EVENT_BUFFER: usize = 256;

/// Owns the active-alert set and applies verdict-driven transitions.
///
/// At most one alert is active per (patient, kind). Per-patient maps are
/// created lazily on the first trigger and dropped when their last alert
/// resolves. Sharding is per patient, so different patients can be driven
/// concurrently; one patient's verdicts must arrive sequentially.
pub struct AlertManager {
    active: DashMap<u32, HashMap<AlertKind, Alert>>,
    events: broadcast::Sender<AlertEvent>,
}

impl AlertManager {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            active: DashMap::new(),
            events,
        }
    }

    /// Subscribe to trigger/update/resolve transitions. Best effort:
    /// events emitted with no subscriber are dropped.
    pub fn subscribe(&self) -> broadcast::Receiver<AlertEvent> {
        self.events.subscribe()
    }

    /// Apply one verdict for one (patient, kind). Returns the transition
    /// it caused, if any.
    ///
    /// An update overwrites message and timestamp but never severity; the
    /// severity recorded at trigger time stands until the alert resolves.
    pub fn apply(&self, patient_id: u32, kind: AlertKind, verdict: Verdict) -> Option<AlertEvent> {
        let event = match verdict {
            Verdict::Alert(alert) => {
                debug_assert_eq!(alert.kind, kind);
                let mut entry = self.active.entry(patient_id).or_default();
                match entry.get_mut(&kind) {
                    Some(active) => {
                        active.refresh(alert.message, alert.timestamp);
                        debug!("Alert refreshed for patient {}: {}", patient_id, kind);
                        Some(AlertEvent::new(Transition::Updated, active.clone()))
                    }
                    None => {
                        info!("Alert triggered: {}", alert);
                        entry.insert(kind, alert.clone());
                        Some(AlertEvent::new(Transition::Triggered, alert))
                    }
                }
            }
            Verdict::NoAlert => {
                let mut removed = None;
                let mut now_empty = false;
                if let Some(mut entry) = self.active.get_mut(&patient_id) {
                    removed = entry.remove(&kind);
                    now_empty = entry.is_empty();
                }
                if now_empty {
                    self.active.remove_if(&patient_id, |_, alerts| alerts.is_empty());
                }
                removed.map(|alert| {
                    info!("Alert resolved for patient {}: {}", patient_id, kind);
                    AlertEvent::new(Transition::Resolved, alert)
                })
            }
        };

        if let Some(event) = &event {
            let _ = self.events.send(event.clone());
        }
        event
    }

    /// Active alerts for one patient; empty when none.
    pub fn active_alerts_for(&self, patient_id: u32) -> Vec<Alert> {
        self.active
            .get(&patient_id)
            .map(|entry| entry.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Every active alert across all patients.
    pub fn all_active_alerts(&self) -> Vec<Alert> {
        self.active
            .iter()
            .flat_map(|entry| entry.values().cloned().collect::<Vec<_>>())
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.active.iter().map(|entry| entry.len()).sum()
    }

    /// Drop every active alert without emitting resolve events. Meant for
    /// test isolation and process resets.
    pub fn clear(&self) {
        self.active.clear();
    }
}

impl Default for AlertManager {
    fn default() -> Self {
        Self::new()
    }
}
