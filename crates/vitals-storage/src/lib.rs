use dashmap::DashMap;
use monitor_core::{SignalKind, VitalRecord};

// ---------------------------------------------------------------------------
// Store trait (backend-agnostic)
// ---------------------------------------------------------------------------

pub trait RecordStore: Send + Sync {
    /// All records for a patient with `from <= timestamp <= to`, in insertion order
    fn fetch_records(&self, patient_id: u32, from: i64, to: i64) -> Vec<VitalRecord>;

    /// Every patient id the store has seen at least one record for
    fn patient_ids(&self) -> Vec<u32>;
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Append-only in-memory record store, sharded per patient.
///
/// The store keeps whatever it is given; deduplication and ordering are the
/// history store's concern. Construct one per process (or per test) and pass
/// it by reference to whoever needs backfill.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: DashMap<u32, Vec<VitalRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    pub fn add_record(&self, record: VitalRecord) {
        self.records
            .entry(record.patient_id)
            .or_default()
            .push(record);
    }

    pub fn add_reading(&self, patient_id: u32, signal: SignalKind, value: f64, timestamp: i64) {
        self.add_record(VitalRecord::new(patient_id, signal, value, timestamp));
    }

    pub fn record_count(&self) -> usize {
        self.records.iter().map(|entry| entry.value().len()).sum()
    }

    /// Drops everything. Intended for test isolation between scenarios.
    pub fn clear(&self) {
        self.records.clear();
    }
}

impl RecordStore for InMemoryStore {
    fn fetch_records(&self, patient_id: u32, from: i64, to: i64) -> Vec<VitalRecord> {
        match self.records.get(&patient_id) {
            Some(entry) => entry
                .iter()
                .filter(|record| record.timestamp >= from && record.timestamp <= to)
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    fn patient_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.records.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_range_is_inclusive_on_both_ends() {
        let store = InMemoryStore::new();
        for ts in [1000, 2000, 3000, 4000] {
            store.add_reading(1, SignalKind::OxygenSaturation, 97.0, ts);
        }

        let fetched = store.fetch_records(1, 2000, 3000);
        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched[0].timestamp, 2000);
        assert_eq!(fetched[1].timestamp, 3000);
    }

    #[test]
    fn fetch_preserves_insertion_order_not_timestamp_order() {
        let store = InMemoryStore::new();
        store.add_reading(1, SignalKind::Ecg, 70.0, 3000);
        store.add_reading(1, SignalKind::Ecg, 72.0, 1000);

        let fetched = store.fetch_records(1, 0, i64::MAX);
        assert_eq!(fetched[0].timestamp, 3000);
        assert_eq!(fetched[1].timestamp, 1000);
    }

    #[test]
    fn duplicate_timestamps_are_kept_verbatim() {
        let store = InMemoryStore::new();
        store.add_reading(1, SignalKind::SystolicBp, 120.0, 1000);
        store.add_reading(1, SignalKind::SystolicBp, 121.0, 1000);

        assert_eq!(store.fetch_records(1, 0, i64::MAX).len(), 2);
    }

    #[test]
    fn unknown_patient_fetches_empty() {
        let store = InMemoryStore::new();
        assert!(store.fetch_records(42, 0, i64::MAX).is_empty());
    }

    #[test]
    fn patient_ids_are_sorted_and_deduplicated() {
        let store = InMemoryStore::new();
        store.add_reading(7, SignalKind::Ecg, 70.0, 1000);
        store.add_reading(2, SignalKind::Ecg, 70.0, 1000);
        store.add_reading(7, SignalKind::Ecg, 71.0, 2000);

        assert_eq!(store.patient_ids(), vec![2, 7]);
    }

    #[test]
    fn annotated_records_survive_the_round_trip() {
        let store = InMemoryStore::new();
        store.add_record(VitalRecord::annotated(
            1,
            SignalKind::AlertMarker,
            1.0,
            1000,
            "triggered",
        ));

        let fetched = store.fetch_records(1, 0, i64::MAX);
        assert_eq!(fetched[0].annotation.as_deref(), Some("triggered"));
    }

    #[test]
    fn clear_empties_every_shard() {
        let store = InMemoryStore::new();
        store.add_reading(1, SignalKind::Ecg, 70.0, 1000);
        store.add_reading(2, SignalKind::Ecg, 70.0, 1000);
        assert_eq!(store.record_count(), 2);

        store.clear();
        assert_eq!(store.record_count(), 0);
        assert!(store.patient_ids().is_empty());
    }
}
