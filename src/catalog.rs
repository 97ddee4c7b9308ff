//! Cross-file aggregation of analysis results.
//!
//! Files are folded in provider order. The first occurrence of a meter
//! (name, kind) or an event (name, severity, value type) wins and keeps its
//! source file.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use crate::scan::{AnalysisResult, EventEntry, EventSeverity, MeterEntry, MeterKind};

/// Row category in the tabular report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Meter,
    Event,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Meter => "meter",
            Category::Event => "event",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One line of the report. Fields that do not apply to the category are
/// empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub category: Category,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: String,
    pub value_type: String,
    pub source_file: String,
}

/// A name that still carries an unresolved template token.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnresolvedName {
    pub source_file: String,
    pub name: String,
    pub category: Category,
}

/// Deduplicated meters and events across all analyzed files.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    meters: Vec<MeterEntry>,
    events: Vec<EventEntry>,
    meter_keys: HashSet<(String, MeterKind)>,
    event_keys: HashSet<(String, EventSeverity, String)>,
    unresolved: BTreeSet<UnresolvedName>,
    files_scanned: usize,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one file's result.
    pub fn add(&mut self, result: AnalysisResult) {
        self.files_scanned += 1;

        for meter in result.meters {
            if !meter.resolved {
                self.unresolved.insert(UnresolvedName {
                    source_file: meter.source_file.clone(),
                    name: meter.name.clone(),
                    category: Category::Meter,
                });
            }
            if self.meter_keys.insert(meter.key()) {
                self.meters.push(meter);
            }
        }

        for event in result.events {
            if !event.resolved {
                self.unresolved.insert(UnresolvedName {
                    source_file: event.source_file.clone(),
                    name: event.name.clone(),
                    category: Category::Event,
                });
            }
            if self.event_keys.insert(event.key()) {
                self.events.push(event);
            }
        }
    }

    pub fn meters(&self) -> &[MeterEntry] {
        &self.meters
    }

    pub fn events(&self) -> &[EventEntry] {
        &self.events
    }

    pub fn files_scanned(&self) -> usize {
        self.files_scanned
    }

    /// Unresolved names, sorted by source file then name.
    pub fn unresolved(&self) -> Vec<&UnresolvedName> {
        self.unresolved.iter().collect()
    }

    pub fn has_unresolved(&self) -> bool {
        !self.unresolved.is_empty()
    }

    /// Report rows: meters then events, each sorted by source file then name.
    pub fn rows(&self) -> Vec<ReportRow> {
        let mut meters: Vec<&MeterEntry> = self.meters.iter().collect();
        meters.sort_by(|a, b| {
            (&a.source_file, &a.name, a.kind).cmp(&(&b.source_file, &b.name, b.kind))
        });

        let mut events: Vec<&EventEntry> = self.events.iter().collect();
        events.sort_by(|a, b| {
            (&a.source_file, &a.name, a.severity, &a.value_type).cmp(&(
                &b.source_file,
                &b.name,
                b.severity,
                &b.value_type,
            ))
        });

        let meter_rows = meters.into_iter().map(|m| ReportRow {
            category: Category::Meter,
            name: m.name.clone(),
            kind: m.kind.to_string(),
            severity: String::new(),
            value_type: String::new(),
            source_file: m.source_file.clone(),
        });
        let event_rows = events.into_iter().map(|e| ReportRow {
            category: Category::Event,
            name: e.name.clone(),
            kind: String::new(),
            severity: e.severity.to_string(),
            value_type: e.value_type.clone(),
            source_file: e.source_file.clone(),
        });

        meter_rows.chain(event_rows).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meter(name: &str, kind: MeterKind, file: &str, resolved: bool) -> MeterEntry {
        MeterEntry {
            name: name.to_string(),
            kind,
            source_file: file.to_string(),
            resolved,
        }
    }

    fn event(name: &str, severity: EventSeverity, value_type: &str, file: &str) -> EventEntry {
        EventEntry {
            name: name.to_string(),
            severity,
            value_type: value_type.to_string(),
            source_file: file.to_string(),
            resolved: true,
        }
    }

    #[test]
    fn test_meter_dedup_across_files() {
        let mut catalog = Catalog::new();
        catalog.add(AnalysisResult {
            meters: vec![meter("hits", MeterKind::Counter, "A.kt", true)],
            events: vec![],
        });
        catalog.add(AnalysisResult {
            meters: vec![
                meter("hits", MeterKind::Counter, "B.kt", true),
                meter("hits", MeterKind::Gauge, "B.kt", true),
            ],
            events: vec![],
        });

        let rows = catalog.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].source_file, "A.kt");
        assert_eq!(rows[0].kind, "counter");
        assert_eq!(rows[1].kind, "gauge");
        assert_eq!(catalog.files_scanned(), 2);
    }

    #[test]
    fn test_event_dedup_by_value_type() {
        let mut catalog = Catalog::new();
        catalog.add(AnalysisResult {
            meters: vec![],
            events: vec![event("login", EventSeverity::Info, "String", "A.kt")],
        });
        catalog.add(AnalysisResult {
            meters: vec![],
            events: vec![
                event("login", EventSeverity::Info, "String", "B.kt"),
                event("login", EventSeverity::Info, "none", "B.kt"),
            ],
        });

        let rows = catalog.rows();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.category == Category::Event));
        assert_eq!(rows[0].source_file, "A.kt");
        assert_eq!(rows[1].value_type, "none");
    }

    #[test]
    fn test_rows_sorted_meters_first() {
        let mut catalog = Catalog::new();
        catalog.add(AnalysisResult {
            meters: vec![
                meter("zeta", MeterKind::Timer, "B.kt", true),
                meter("alpha", MeterKind::Timer, "B.kt", true),
            ],
            events: vec![event("boot", EventSeverity::Debug, "none", "A.kt")],
        });
        catalog.add(AnalysisResult {
            meters: vec![meter("mid", MeterKind::Rate, "A.kt", true)],
            events: vec![],
        });

        let names: Vec<_> = catalog.rows().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["mid", "alpha", "zeta", "boot"]);
    }

    #[test]
    fn test_unresolved_listed_once_per_file() {
        let mut catalog = Catalog::new();
        catalog.add(AnalysisResult {
            meters: vec![
                meter("$p.hits", MeterKind::Counter, "A.kt", false),
                meter("$p.hits", MeterKind::Counter, "A.kt", false),
            ],
            events: vec![],
        });
        catalog.add(AnalysisResult {
            meters: vec![meter("$p.hits", MeterKind::Counter, "B.kt", false)],
            events: vec![],
        });

        assert!(catalog.has_unresolved());
        let files: Vec<_> = catalog
            .unresolved()
            .into_iter()
            .map(|u| u.source_file.as_str())
            .collect();
        assert_eq!(files, vec!["A.kt", "B.kt"]);
        assert_eq!(catalog.rows().len(), 1);
    }
}
