use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MonitorError;

/// Measurement type tag as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SignalKind {
    SystolicBp,
    DiastolicBp,
    OxygenSaturation,
    Ecg,
    /// Manual alert marker; its annotation carries meaning, not its value.
    AlertMarker,
    /// Any other label (lab values etc.); stored in history, evaluated by nothing.
    Other(String),
}

impl SignalKind {
    pub fn parse(label: &str) -> Self {
        match label {
            "SystolicBP" => SignalKind::SystolicBp,
            "DiastolicBP" => SignalKind::DiastolicBp,
            "OxygenSaturation" => SignalKind::OxygenSaturation,
            "ECG" => SignalKind::Ecg,
            "Alert" => SignalKind::AlertMarker,
            other => SignalKind::Other(other.to_string()),
        }
    }

    /// Wire label for this signal.
    pub fn as_str(&self) -> &str {
        match self {
            SignalKind::SystolicBp => "SystolicBP",
            SignalKind::DiastolicBp => "DiastolicBP",
            SignalKind::OxygenSaturation => "OxygenSaturation",
            SignalKind::Ecg => "ECG",
            SignalKind::AlertMarker => "Alert",
            SignalKind::Other(label) => label,
        }
    }
}

impl From<String> for SignalKind {
    fn from(label: String) -> Self {
        SignalKind::parse(&label)
    }
}

impl From<SignalKind> for String {
    fn from(kind: SignalKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One timestamped measurement for one patient. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalRecord {
    pub patient_id: u32,
    pub signal: SignalKind,
    pub value: f64,
    /// Epoch milliseconds.
    pub timestamp: i64,
    #[serde(default)]
    pub annotation: Option<String>,
}

impl VitalRecord {
    pub fn new(patient_id: u32, signal: SignalKind, value: f64, timestamp: i64) -> Self {
        Self {
            patient_id,
            signal,
            value,
            timestamp,
            annotation: None,
        }
    }

    pub fn annotated(
        patient_id: u32,
        signal: SignalKind,
        value: f64,
        timestamp: i64,
        annotation: impl Into<String>,
    ) -> Self {
        Self {
            patient_id,
            signal,
            value,
            timestamp,
            annotation: Some(annotation.into()),
        }
    }

    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

/// Closed set of rule outcomes the detectors can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    HighSystolicBp,
    LowSystolicBp,
    HighDiastolicBp,
    LowDiastolicBp,
    BpIncreasingTrend,
    BpDecreasingTrend,
    LowOxygenSaturation,
    RapidOxygenDrop,
    HypotensiveHypoxemia,
    EcgAbnormalPeak,
    ManualTrigger,
}

impl AlertKind {
    pub const ALL: [AlertKind; 11] = [
        AlertKind::HighSystolicBp,
        AlertKind::LowSystolicBp,
        AlertKind::HighDiastolicBp,
        AlertKind::LowDiastolicBp,
        AlertKind::BpIncreasingTrend,
        AlertKind::BpDecreasingTrend,
        AlertKind::LowOxygenSaturation,
        AlertKind::RapidOxygenDrop,
        AlertKind::HypotensiveHypoxemia,
        AlertKind::EcgAbnormalPeak,
        AlertKind::ManualTrigger,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::HighSystolicBp => "HIGH_SYSTOLIC_BP",
            AlertKind::LowSystolicBp => "LOW_SYSTOLIC_BP",
            AlertKind::HighDiastolicBp => "HIGH_DIASTOLIC_BP",
            AlertKind::LowDiastolicBp => "LOW_DIASTOLIC_BP",
            AlertKind::BpIncreasingTrend => "BP_INCREASING_TREND",
            AlertKind::BpDecreasingTrend => "BP_DECREASING_TREND",
            AlertKind::LowOxygenSaturation => "LOW_OXYGEN_SATURATION",
            AlertKind::RapidOxygenDrop => "RAPID_OXYGEN_DROP",
            AlertKind::HypotensiveHypoxemia => "HYPOTENSIVE_HYPOXEMIA",
            AlertKind::EcgAbnormalPeak => "ECG_ABNORMAL_PEAK",
            AlertKind::ManualTrigger => "MANUAL_TRIGGER",
        }
    }
}

impl FromStr for AlertKind {
    type Err = MonitorError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| MonitorError::UnknownAlertKind(name.to_string()))
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert severity, ordered LOW through CRITICAL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Low => "LOW",
            AlertSeverity::Medium => "MEDIUM",
            AlertSeverity::High => "HIGH",
            AlertSeverity::Critical => "CRITICAL",
        }
    }

    /// One step up; CRITICAL saturates.
    pub fn escalate(&self) -> Self {
        match self {
            AlertSeverity::Low => AlertSeverity::Medium,
            AlertSeverity::Medium => AlertSeverity::High,
            AlertSeverity::High => AlertSeverity::Critical,
            AlertSeverity::Critical => AlertSeverity::Critical,
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raised or active alert. Identity is (patient_id, kind).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub patient_id: u32,
    pub kind: AlertKind,
    pub message: String,
    /// Epoch milliseconds of the reading that raised it.
    pub timestamp: i64,
    pub severity: AlertSeverity,
}

impl Alert {
    pub fn new(
        patient_id: u32,
        kind: AlertKind,
        message: impl Into<String>,
        timestamp: i64,
        severity: AlertSeverity,
    ) -> Self {
        Self {
            patient_id,
            kind,
            message: message.into(),
            timestamp,
            severity,
        }
    }

    /// Overwrite message and timestamp in place; severity is left alone.
    pub fn refresh(&mut self, message: impl Into<String>, timestamp: i64) {
        self.message = message.into();
        self.timestamp = timestamp;
    }

    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] patient {} {}: {}",
            self.severity, self.patient_id, self.kind, self.message
        )
    }
}

/// Per alert kind outcome of one detector pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Verdict {
    NoAlert,
    Alert(Alert),
}

impl Verdict {
    pub fn is_alert(&self) -> bool {
        matches!(self, Verdict::Alert(_))
    }
}
