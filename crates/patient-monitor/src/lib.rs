//! Evaluation orchestrator tying history, detectors, and alert lifecycle
//! together.
//!
//! One [`PatientMonitor`] serves a whole patient population: callers hand it
//! batches of parsed vital records (or attach a [`vitals_storage::RecordStore`]
//! for backfill) and it returns the alert transitions each evaluation cycle
//! produced.

pub mod monitor;


pub use monitor::PatientMonitor;
