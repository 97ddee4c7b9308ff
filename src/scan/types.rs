//! Core types for analysis results.

use phf::phf_set;
use serde::{Deserialize, Serialize};

/// Method names recognized on a meter receiver.
pub static METER_METHODS: phf::Set<&'static str> = phf_set! {
    "counter", "timer", "gauge", "summary", "rate", "throughput",
};

/// Method names recognized on an event receiver.
pub static EVENT_METHODS: phf::Set<&'static str> = phf_set! {
    "trace", "debug", "info", "warn", "error",
};

/// Value type reported for events recorded without a payload.
pub const NO_VALUE: &str = "none";

/// Kind of meter declared at a call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeterKind {
    Counter,
    Timer,
    Gauge,
    Summary,
    Rate,
    Throughput,
}

impl MeterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeterKind::Counter => "counter",
            MeterKind::Timer => "timer",
            MeterKind::Gauge => "gauge",
            MeterKind::Summary => "summary",
            MeterKind::Rate => "rate",
            MeterKind::Throughput => "throughput",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "counter" => Some(MeterKind::Counter),
            "timer" => Some(MeterKind::Timer),
            "gauge" => Some(MeterKind::Gauge),
            "summary" => Some(MeterKind::Summary),
            "rate" => Some(MeterKind::Rate),
            "throughput" => Some(MeterKind::Throughput),
            _ => None,
        }
    }
}

impl std::fmt::Display for MeterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity of a structured log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSeverity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl EventSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventSeverity::Trace => "trace",
            EventSeverity::Debug => "debug",
            EventSeverity::Info => "info",
            EventSeverity::Warn => "warn",
            EventSeverity::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "trace" => Some(EventSeverity::Trace),
            "debug" => Some(EventSeverity::Debug),
            "info" => Some(EventSeverity::Info),
            "warn" => Some(EventSeverity::Warn),
            "error" => Some(EventSeverity::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A meter declared in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeterEntry {
    pub name: String,
    pub kind: MeterKind,
    pub source_file: String,
    /// False when the name still carries an interpolation token or an
    /// identifier that could not be looked up.
    pub resolved: bool,
}

impl MeterEntry {
    /// Deduplication key across files.
    pub fn key(&self) -> (String, MeterKind) {
        (self.name.clone(), self.kind)
    }
}

/// A structured log event declared in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEntry {
    pub name: String,
    pub severity: EventSeverity,
    /// Inferred payload type, or [`NO_VALUE`].
    pub value_type: String,
    pub source_file: String,
    pub resolved: bool,
}

impl EventEntry {
    /// Deduplication key across files.
    pub fn key(&self) -> (String, EventSeverity, String) {
        (self.name.clone(), self.severity, self.value_type.clone())
    }
}

/// Entries found in a single file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub meters: Vec<MeterEntry>,
    pub events: Vec<EventEntry>,
}

impl AnalysisResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.meters.is_empty() && self.events.is_empty()
    }
}
