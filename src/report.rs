//! Output formatting for the instrumentation catalog.
//!
//! Supports three output formats:
//! - CSV: the tabular catalog (`category,name,type,severity,value_type,source_file`)
//! - JSON: rows plus summary counts for programmatic consumption
//! - Pretty: colored terminal output for human readability

use colored::*;
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::catalog::{Catalog, Category, ReportRow, UnresolvedName};

/// CSV header, in column order.
pub const CSV_HEADER: &[&str] = &[
    "category",
    "name",
    "type",
    "severity",
    "value_type",
    "source_file",
];

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
    Pretty,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Format::Csv),
            "json" => Ok(Format::Json),
            "pretty" => Ok(Format::Pretty),
            _ => Err(format!("unknown format: {}", s)),
        }
    }
}

impl Format {
    pub fn reporter(&self) -> Box<dyn Reporter> {
        match self {
            Format::Csv => Box::new(CsvReporter),
            Format::Json => Box::new(JsonReporter),
            Format::Pretty => Box::new(PrettyReporter),
        }
    }
}

/// Writes a catalog to an output stream.
pub trait Reporter {
    fn write(&self, catalog: &Catalog, out: &mut dyn Write) -> anyhow::Result<()>;

    /// Whether the report already shows unresolved names itself.
    fn includes_unresolved(&self) -> bool {
        false
    }
}

// =============================================================================
// CSV Format
// =============================================================================

pub struct CsvReporter;

impl Reporter for CsvReporter {
    fn write(&self, catalog: &Catalog, out: &mut dyn Write) -> anyhow::Result<()> {
        writeln!(out, "{}", CSV_HEADER.join(","))?;
        for row in catalog.rows() {
            let fields: [&str; 6] = [
                row.category.as_str(),
                &row.name,
                &row.kind,
                &row.severity,
                &row.value_type,
                &row.source_file,
            ];
            let line: Vec<String> = fields.iter().map(|f| escape_csv(f)).collect();
            writeln!(out, "{}", line.join(","))?;
        }
        Ok(())
    }
}

/// Quote a field containing a separator, quote or newline; inner quotes
/// are doubled.
pub fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

// =============================================================================
// JSON Format
// =============================================================================

/// JSON report structure.
#[derive(Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub files_scanned: usize,
    pub meter_count: usize,
    pub event_count: usize,
    pub rows: Vec<ReportRow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<UnresolvedName>,
}

impl JsonReport {
    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            files_scanned: catalog.files_scanned(),
            meter_count: catalog.meters().len(),
            event_count: catalog.events().len(),
            rows: catalog.rows(),
            unresolved: catalog.unresolved().into_iter().cloned().collect(),
        }
    }
}

pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn write(&self, catalog: &Catalog, out: &mut dyn Write) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(&JsonReport::from_catalog(catalog))?;
        writeln!(out, "{}", json)?;
        Ok(())
    }
}

// =============================================================================
// Pretty Format
// =============================================================================

pub struct PrettyReporter;

impl Reporter for PrettyReporter {
    fn write(&self, catalog: &Catalog, out: &mut dyn Write) -> anyhow::Result<()> {
        writeln!(out)?;
        writeln!(
            out,
            "  {} v{}",
            "meterscan".cyan().bold(),
            env!("CARGO_PKG_VERSION")
        )?;
        writeln!(out)?;
        writeln!(
            out,
            "  {} {}  {} {}  {} {}",
            "Files:".dimmed(),
            catalog.files_scanned(),
            "Meters:".dimmed(),
            catalog.meters().len(),
            "Events:".dimmed(),
            catalog.events().len()
        )?;
        writeln!(out)?;

        let rows = catalog.rows();
        let meters: Vec<_> = rows.iter().filter(|r| r.category == Category::Meter).collect();
        let events: Vec<_> = rows.iter().filter(|r| r.category == Category::Event).collect();

        if !meters.is_empty() {
            writeln!(out, "  {} ({}):", "Meters".bold(), meters.len())?;
            for row in meters {
                writeln!(
                    out,
                    "    {:<12}{:<48}{}",
                    row.kind.green(),
                    row.name,
                    row.source_file.blue()
                )?;
            }
            writeln!(out)?;
        }

        if !events.is_empty() {
            writeln!(out, "  {} ({}):", "Events".bold(), events.len())?;
            for row in events {
                writeln!(
                    out,
                    "    {}{:<48}{:<20}{}",
                    severity_tag(&row.severity),
                    row.name,
                    row.value_type.dimmed(),
                    row.source_file.blue()
                )?;
            }
            writeln!(out)?;
        }

        if catalog.has_unresolved() {
            write_unresolved(catalog, out)?;
        }
        Ok(())
    }

    fn includes_unresolved(&self) -> bool {
        true
    }
}

fn severity_tag(severity: &str) -> ColoredString {
    let tag = format!("{:<8}", severity.to_uppercase());
    match severity {
        "error" => tag.red(),
        "warn" => tag.yellow(),
        "info" => tag.blue(),
        _ => tag.dimmed(),
    }
}

/// Warning block listing every name that kept a template token.
pub fn write_unresolved(catalog: &Catalog, out: &mut dyn Write) -> anyhow::Result<()> {
    let unresolved = catalog.unresolved();
    if unresolved.is_empty() {
        return Ok(());
    }

    writeln!(
        out,
        "  {} {} name(s) could not be fully resolved:",
        "WARN".yellow(),
        unresolved.len()
    )?;
    for entry in &unresolved {
        writeln!(
            out,
            "    {:<8}{:<48}{}",
            entry.category.as_str().dimmed(),
            entry.name,
            entry.source_file.blue()
        )?;
    }
    writeln!(
        out,
        "  Add an override such as `<ClassName>.<variable>: value` to the config or pass --override."
    )?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::{AnalysisResult, EventEntry, EventSeverity, MeterEntry, MeterKind};

    fn sample_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.add(AnalysisResult {
            meters: vec![MeterEntry {
                name: "orders,placed".to_string(),
                kind: MeterKind::Counter,
                source_file: "Orders.kt".to_string(),
                resolved: true,
            }],
            events: vec![EventEntry {
                name: "say \"hi\"".to_string(),
                severity: EventSeverity::Warn,
                value_type: "Array<Int, String>".to_string(),
                source_file: "Orders.kt".to_string(),
                resolved: false,
            }],
        });
        catalog
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn test_csv_rows() {
        let mut out = Vec::new();
        CsvReporter.write(&sample_catalog(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "category,name,type,severity,value_type,source_file");
        assert_eq!(lines[1], "meter,\"orders,placed\",counter,,,Orders.kt");
        assert_eq!(
            lines[2],
            "event,\"say \"\"hi\"\"\",,warn,\"Array<Int, String>\",Orders.kt"
        );
    }

    #[test]
    fn test_json_report() {
        let mut out = Vec::new();
        JsonReporter.write(&sample_catalog(), &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["meter_count"], 1);
        assert_eq!(value["rows"][0]["type"], "counter");
        assert_eq!(value["rows"][1]["category"], "event");
        assert_eq!(value["unresolved"][0]["name"], "say \"hi\"");
    }

    #[test]
    fn test_pretty_mentions_unresolved() {
        colored::control::set_override(false);
        let mut out = Vec::new();
        PrettyReporter.write(&sample_catalog(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("orders,placed"));
        assert!(text.contains("could not be fully resolved"));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("CSV".parse::<Format>(), Ok(Format::Csv));
        assert!("xml".parse::<Format>().is_err());
    }
}
