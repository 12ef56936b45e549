use monitor_core::Alert;
use serde::{Deserialize, Serialize};

/// Lifecycle state change attached to an emitted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    Triggered,
    Updated,
    Resolved,
}

impl Transition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::Triggered => "triggered",
            Transition::Updated => "updated",
            Transition::Resolved => "resolved",
        }
    }
}

/// One lifecycle transition, carrying the alert as it looked when the
/// transition happened (for resolves, the entry that was removed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub transition: Transition,
    pub alert: Alert,
}

impl AlertEvent {
    pub fn new(transition: Transition, alert: Alert) -> Self {
        Self { transition, alert }
    }
}
