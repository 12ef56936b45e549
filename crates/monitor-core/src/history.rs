use std::collections::HashMap;

use crate::types::{SignalKind, VitalRecord};

/// Most recent entries kept per (patient, signal) series.
pub const MAX_SERIES_LEN: usize = 100;

/// Bounded measurement history for one patient.
///
/// Each signal kind gets its own series, kept ascending by timestamp,
/// deduplicated by exact timestamp, and capped to the most recent
/// [`MAX_SERIES_LEN`] entries with the oldest evicted first.
#[derive(Debug, Clone, Default)]
pub struct PatientHistory {
    series: HashMap<SignalKind, Vec<VitalRecord>>,
}

impl PatientHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge records into the per-signal series. A record whose timestamp
    /// already exists for the same signal is dropped. No-op on empty input.
    pub fn merge(&mut self, records: Vec<VitalRecord>) {
        if records.is_empty() {
            return;
        }
        let mut touched: Vec<SignalKind> = Vec::new();
        for record in records {
            let series = self.series.entry(record.signal.clone()).or_default();
            if series.iter().any(|r| r.timestamp == record.timestamp) {
                continue;
            }
            if !touched.contains(&record.signal) {
                touched.push(record.signal.clone());
            }
            series.push(record);
        }
        for kind in touched {
            if let Some(series) = self.series.get_mut(&kind) {
                series.sort_by_key(|r| r.timestamp);
                if series.len() > MAX_SERIES_LEN {
                    let excess = series.len() - MAX_SERIES_LEN;
                    series.drain(..excess);
                }
            }
        }
    }

    /// Most recent record of the given signal.
    pub fn latest(&self, kind: &SignalKind) -> Option<&VitalRecord> {
        self.series.get(kind).and_then(|series| series.last())
    }

    /// The last `n` records of the signal, oldest first; fewer if the
    /// series is shorter.
    pub fn latest_window(&self, kind: &SignalKind, n: usize) -> &[VitalRecord] {
        let series = self.series(kind);
        let start = series.len().saturating_sub(n);
        &series[start..]
    }

    /// Full ordered series for a signal; empty if the signal was never seen.
    pub fn series(&self, kind: &SignalKind) -> &[VitalRecord] {
        self.series.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Highest timestamp across all signals.
    pub fn latest_timestamp(&self) -> Option<i64> {
        self.series
            .values()
            .filter_map(|series| series.last())
            .map(|record| record.timestamp)
            .max()
    }

    /// Total records across all signals.
    pub fn record_count(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.series.values().all(Vec::is_empty)
    }
}
