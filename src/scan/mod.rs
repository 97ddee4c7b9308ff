//! Instrumentation scanning over raw source text.

mod analyzer;
mod arguments;
mod calls;
mod delimiters;
mod runner;
mod scope;
mod symbols;
mod template;
mod types;
mod value_type;

pub use analyzer::{analyze, file_identifier, Analyzer, Receiver};
pub use arguments::{event_arguments, meter_name, named_argument, CallArguments};
pub use calls::{detect_calls, CallDetector, CallRecord};
pub use delimiters::{extract_arguments, find_matching_brace, split_top_level};
pub use runner::Runner;
pub use scope::{find_scope_regions, ScopeReceiver, ScopeRegion, DEFAULT_PARAMETER};
pub use symbols::SymbolTable;
pub use template::{resolve, Resolution, TemplateResolver};
pub use types::{
    AnalysisResult, EventEntry, EventSeverity, MeterEntry, MeterKind, EVENT_METHODS,
    METER_METHODS, NO_VALUE,
};
pub use value_type::classify;
