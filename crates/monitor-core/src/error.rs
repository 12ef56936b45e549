use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Unknown alert kind: {0}")]
    UnknownAlertKind(String),

    #[error("Unknown detector category: {0}")]
    UnknownCategory(String),

    #[error("Duplicate detector category: {0}")]
    DuplicateCategory(String),
}
