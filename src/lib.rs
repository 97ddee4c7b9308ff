//! Meterscan - static catalog of instrumentation points.
//!
//! Meterscan reads source files as plain text and lists every meter
//! (`counter`, `timer`, `gauge`, `summary`, `rate`, `throughput`) and
//! structured log event (`trace` .. `error`) recorded through a known
//! receiver, with names resolved from same-file string constants.
//!
//! # Architecture
//!
//! - `scan`: the per-file analyzer (delimiter scanning, call detection,
//!   scope blocks, template resolution, value typing) and the parallel runner
//! - `source`: file providers feeding `(name, text)` pairs to the runner
//! - `catalog`: cross-file deduplication and report rows
//! - `config`: YAML configuration and manual overrides
//! - `report`: output formatting (CSV, JSON, pretty)

pub mod catalog;
pub mod cli;
pub mod config;
pub mod report;
pub mod scan;
pub mod source;

pub use catalog::{Catalog, Category, ReportRow, UnresolvedName};
pub use config::{Config, ConfigError};
pub use report::{Format, Reporter};
pub use scan::{
    analyze, AnalysisResult, Analyzer, EventEntry, EventSeverity, MeterEntry, MeterKind,
    Receiver, Runner,
};
pub use source::{DirectoryProvider, FileProvider, MemoryProvider, SourceText};
