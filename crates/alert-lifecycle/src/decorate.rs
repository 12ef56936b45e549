use monitor_core::Alert;
use serde::{Deserialize, Serialize};

/// Post-lifecycle decoration applied by event consumers.
///
/// Decoration works on a copy of the alert; the stored active entry is
/// never touched. Policies compose left to right, so an escalation before
/// a repeat counter prefixes the message first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AlertPolicy {
    /// Step severity up one level (CRITICAL saturates) and prefix the
    /// message with the escalation reason.
    EscalatePriority { reason: String },
    /// Append a repeat counter derived from time elapsed since the alert
    /// fired. An updated alert carries a refreshed timestamp, which
    /// restarts the schedule.
    Repeat { interval_ms: i64, max_repeats: u32 },
}

/// Apply `policies` to a copy of `alert` as of `now_ms`.
pub fn decorate(alert: &Alert, policies: &[AlertPolicy], now_ms: i64) -> Alert {
    let mut decorated = alert.clone();
    for policy in policies {
        match policy {
            AlertPolicy::EscalatePriority { reason } => {
                decorated.severity = decorated.severity.escalate();
                decorated.message = format!("PRIORITY: {} - {}", decorated.message, reason);
            }
            AlertPolicy::Repeat {
                interval_ms,
                max_repeats,
            } => {
                let count = repeat_count(decorated.timestamp, now_ms, *interval_ms, *max_repeats);
                decorated.message =
                    format!("{} [REPEAT {}/{}]", decorated.message, count, max_repeats);
            }
        }
    }
    decorated
}

/// Completed repeat intervals since the alert fired, clamped to the cap.
fn repeat_count(alert_ts: i64, now_ms: i64, interval_ms: i64, max_repeats: u32) -> u32 {
    if interval_ms <= 0 || now_ms <= alert_ts {
        return 0;
    }
    let completed = (now_ms - alert_ts) / interval_ms;
    completed.min(max_repeats as i64) as u32
}
