use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use alert_lifecycle::{AlertEvent, AlertManager};
use dashmap::DashMap;
use monitor_core::{Alert, AlertKind, PatientHistory, SignalKind, Verdict, VitalRecord};
use tokio::sync::broadcast;
use tracing::debug;
use vital_detectors::DetectorRegistry;
use vitals_storage::RecordStore;

/// Per-patient evaluation orchestrator.
///
/// Owns the history store and the lifecycle manager, and runs the full
/// merge-detect-apply cycle for one patient per [`evaluate`](Self::evaluate)
/// call. Evaluations for different patients may run concurrently; evaluations
/// for the same patient are serialized on that patient's history shard.
pub struct PatientMonitor {
    history: DashMap<u32, PatientHistory>,
    registry: DetectorRegistry,
    lifecycle: AlertManager,
    /// Optional backfill source consulted before each evaluation
    store: Option<Arc<dyn RecordStore>>,
    /// Highest storage timestamp already merged, per patient
    watermarks: DashMap<u32, i64>,
}

impl PatientMonitor {
    pub fn new() -> Self {
        Self::with_registry(DetectorRegistry::standard())
    }

    pub fn with_registry(registry: DetectorRegistry) -> Self {
        Self {
            history: DashMap::new(),
            registry,
            lifecycle: AlertManager::new(),
            store: None,
            watermarks: DashMap::new(),
        }
    }

    /// Attach a record store; evaluate() will pull anything newer than the
    /// per-patient watermark before running detectors.
    pub fn with_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn registry(&self) -> &DetectorRegistry {
        &self.registry
    }

    /// Run one evaluation cycle for a patient.
    ///
    /// Merges `new_records` (plus any unfetched storage records) into the
    /// patient's history, evaluates every registered detector against the
    /// merged history, and feeds one verdict per declared alert kind to the
    /// lifecycle manager. Kinds no detector raised this cycle are fed as
    /// NoAlert so active alerts resolve symmetrically with how they trigger.
    /// Returns the cycle's transitions in detector registration order.
    pub fn evaluate(&self, patient_id: u32, new_records: Vec<VitalRecord>) -> Vec<AlertEvent> {
        // Hold this patient's history shard for the whole cycle so two
        // evaluations for the same patient cannot interleave between the
        // merge and the lifecycle pass.
        let mut history = self.history.entry(patient_id).or_default();

        let mut batch = new_records;
        if let Some(store) = &self.store {
            batch.extend(self.backfill(store.as_ref(), patient_id));
        }
        let merged = batch.len();
        history.merge(batch);

        let mut raised: HashMap<AlertKind, Alert> = HashMap::new();
        for detector in self.registry.iter() {
            for alert in detector.evaluate(patient_id, &history) {
                raised.entry(alert.kind).or_insert(alert);
            }
        }

        let mut events = Vec::new();
        let mut seen: HashSet<AlertKind> = HashSet::new();
        for detector in self.registry.iter() {
            for kind in detector.kinds() {
                if !seen.insert(*kind) {
                    continue;
                }
                let verdict = match raised.remove(kind) {
                    Some(alert) => Verdict::Alert(alert),
                    None => Verdict::NoAlert,
                };
                if let Some(event) = self.lifecycle.apply(patient_id, *kind, verdict) {
                    events.push(event);
                }
            }
        }

        debug!(
            "Evaluated patient {}: {} records offered, {} in history, {} transitions",
            patient_id,
            merged,
            history.record_count(),
            events.len()
        );
        events
    }

    fn backfill(&self, store: &dyn RecordStore, patient_id: u32) -> Vec<VitalRecord> {
        let from = self
            .watermarks
            .get(&patient_id)
            .map(|mark| mark.saturating_add(1))
            .unwrap_or(i64::MIN);
        let fetched = store.fetch_records(patient_id, from, i64::MAX);
        if let Some(max_ts) = fetched.iter().map(|record| record.timestamp).max() {
            self.watermarks.insert(patient_id, max_ts);
            debug!(
                "Backfilled {} storage records for patient {} up to {}",
                fetched.len(),
                patient_id,
                max_ts
            );
        }
        fetched
    }

    pub fn active_alerts_for(&self, patient_id: u32) -> Vec<Alert> {
        self.lifecycle.active_alerts_for(patient_id)
    }

    pub fn all_active_alerts(&self) -> Vec<Alert> {
        self.lifecycle.all_active_alerts()
    }

    pub fn active_alert_count(&self) -> usize {
        self.lifecycle.active_count()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AlertEvent> {
        self.lifecycle.subscribe()
    }

    /// Snapshot of the most recent `n` readings of one signal, oldest first.
    pub fn latest_window(&self, patient_id: u32, signal: &SignalKind, n: usize) -> Vec<VitalRecord> {
        match self.history.get(&patient_id) {
            Some(history) => history.latest_window(signal, n).to_vec(),
            None => Vec::new(),
        }
    }

    pub fn record_count(&self, patient_id: u32) -> usize {
        self.history
            .get(&patient_id)
            .map(|history| history.record_count())
            .unwrap_or(0)
    }

    /// Drops all history, active alerts, and backfill watermarks.
    pub fn clear(&self) {
        self.history.clear();
        self.watermarks.clear();
        self.lifecycle.clear();
    }
}

impl Default for PatientMonitor {
    fn default() -> Self {
        Self::new()
    }
}
