//! Per-file analysis entry point.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::arguments::{event_arguments, meter_name};
use super::calls::{detect_calls, CallRecord};
use super::symbols::SymbolTable;
use super::template::{TemplateResolver, DEFAULT_MAX_LEN};
use super::types::{
    AnalysisResult, EventEntry, EventSeverity, MeterEntry, MeterKind, EVENT_METHODS,
    METER_METHODS, NO_VALUE,
};
use super::value_type::classify;
use crate::source::SourceText;

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// A receiver family: the conventional variable name and the type that
/// identifies other variables of the same family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receiver {
    pub token: String,
    pub type_name: String,
}

impl Receiver {
    pub fn new(token: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            type_name: type_name.into(),
        }
    }

    pub fn default_meter() -> Self {
        Self::new("meterRegistry", "MeterRegistry")
    }

    pub fn default_event() -> Self {
        Self::new("eventLogger", "EventLogger")
    }

    /// Whether `text` mentions this family at all.
    pub fn appears_in(&self, text: &str) -> bool {
        (!self.token.is_empty() && text.contains(&self.token))
            || (!self.type_name.is_empty() && text.contains(&self.type_name))
    }

    /// Receiver names to scan in `text`: the token plus every variable or
    /// parameter declared with the receiver type.
    pub fn names_in(&self, text: &str) -> Vec<String> {
        let mut names = Vec::new();
        if IDENTIFIER.is_match(&self.token) {
            names.push(self.token.clone());
        }
        if !IDENTIFIER.is_match(&self.type_name) {
            return names;
        }

        let pattern = format!(
            r"\b([A-Za-z_][A-Za-z0-9_]*)\s*:\s*{}\b",
            regex::escape(&self.type_name)
        );
        if let Ok(typed_re) = Regex::new(&pattern) {
            for caps in typed_re.captures_iter(text) {
                if let Some(name) = caps.get(1) {
                    let name = name.as_str().to_string();
                    if !names.contains(&name) {
                        names.push(name);
                    }
                }
            }
        }
        names
    }
}

/// Stateless analyzer configured with the two receiver families.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analyzer {
    meter: Receiver,
    event: Receiver,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(Receiver::default_meter(), Receiver::default_event())
    }
}

impl Analyzer {
    pub fn new(meter: Receiver, event: Receiver) -> Self {
        Self { meter, event }
    }

    /// Analyze one source file.
    pub fn analyze(
        &self,
        source: &SourceText,
        overrides: &BTreeMap<String, String>,
    ) -> AnalysisResult {
        self.analyze_text(&source.name, &source.text, overrides)
    }

    /// Analyze `text`, reporting entries against `file_name`. Overrides are
    /// matched against the file name without its extension.
    pub fn analyze_text(
        &self,
        file_name: &str,
        text: &str,
        overrides: &BTreeMap<String, String>,
    ) -> AnalysisResult {
        let mut result = AnalysisResult::new();
        if !self.meter.appears_in(text) && !self.event.appears_in(text) {
            return result;
        }

        let identifier = file_identifier(file_name);
        let table = SymbolTable::build(text, identifier, overrides);
        let resolver = TemplateResolver::new(&table, identifier)
            .with_max_len(text.len().max(DEFAULT_MAX_LEN));

        let meter_calls = detect_calls(text, &self.meter.names_in(text), &METER_METHODS);
        result.meters = meter_calls
            .iter()
            .filter_map(|call| meter_entry(call, &resolver, file_name))
            .collect();

        let event_calls = detect_calls(text, &self.event.names_in(text), &EVENT_METHODS);
        result.events = event_calls
            .iter()
            .filter_map(|call| event_entry(call, &resolver, file_name))
            .collect();

        tracing::trace!(
            file = file_name,
            symbols = table.len(),
            meters = result.meters.len(),
            events = result.events.len(),
            "analyzed"
        );
        result
    }
}

fn meter_entry(call: &CallRecord, resolver: &TemplateResolver, file: &str) -> Option<MeterEntry> {
    let kind = MeterKind::parse(&call.method)?;
    let Some(expr) = meter_name(&call.args) else {
        tracing::trace!(file, offset = call.open, method = %call.method, "skipping meter call without a name");
        return None;
    };
    let name = resolver.resolve(&expr);

    Some(MeterEntry {
        name: name.value,
        kind,
        source_file: file.to_string(),
        resolved: name.resolved,
    })
}

fn event_entry(call: &CallRecord, resolver: &TemplateResolver, file: &str) -> Option<EventEntry> {
    let severity = EventSeverity::parse(&call.method)?;
    let Some(parsed) = event_arguments(&call.args) else {
        tracing::trace!(file, offset = call.open, method = %call.method, "skipping event call without a name");
        return None;
    };
    let name = resolver.resolve(&parsed.name);
    let value_type = parsed
        .value
        .as_deref()
        .map(classify)
        .unwrap_or_else(|| NO_VALUE.to_string());

    Some(EventEntry {
        name: name.value,
        severity,
        value_type,
        source_file: file.to_string(),
        resolved: name.resolved,
    })
}

/// File name without directories and extension: `OrderService.kt` ->
/// `OrderService`.
pub fn file_identifier(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
}

/// Analyze one file with the default receivers.
pub fn analyze(
    file_identifier: &str,
    text: &str,
    overrides: &BTreeMap<String, String>,
) -> AnalysisResult {
    Analyzer::default().analyze_text(file_identifier, text, overrides)
}
