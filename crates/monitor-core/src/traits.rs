use crate::history::PatientHistory;
use crate::types::{Alert, AlertKind};

/// One detection rule set over a patient's history.
///
/// Implementations are stateless: the outcome is a pure function of the
/// supplied history. `evaluate` returns at most one alert per kind listed
/// by `kinds`; the orchestrator derives a no-alert verdict for every
/// declared kind the result omits, so resolutions flow symmetrically with
/// triggers.
pub trait Detector: Send + Sync + std::fmt::Debug {
    /// Registry key for this detector, lowercase.
    fn category(&self) -> &'static str;

    /// The closed set of alert kinds this detector can raise.
    fn kinds(&self) -> &'static [AlertKind];

    /// Evaluate the patient's history. Read-only; never mutates history
    /// or any alert state.
    fn evaluate(&self, patient_id: u32, history: &PatientHistory) -> Vec<Alert>;
}
