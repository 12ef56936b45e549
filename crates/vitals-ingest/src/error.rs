use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Malformed record '{line}': {reason}")]
    Malformed { line: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestError {
    pub(crate) fn malformed(line: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            line: line.trim().to_string(),
            reason: reason.into(),
        }
    }
}
