//! Heuristic classification of event payload expressions.
//!
//! Rules are evaluated in order and the first match wins. Literal shapes
//! come first, then accessor suffixes, then keyword guesses on identifier
//! names.

use lazy_static::lazy_static;
use regex::Regex;

use super::delimiters::split_top_level;

lazy_static! {
    static ref ARRAY_CONSTRUCTOR: Regex =
        Regex::new(r"(?s)^arrayOf\s*(?:<[^>]*>)?\s*\((.*)\)$").unwrap();
    static ref LONG_LITERAL: Regex = Regex::new(r"^-?\d[\d_]*[lL]$").unwrap();
    static ref DECIMAL_LITERAL: Regex =
        Regex::new(r"^-?(?:\d[\d_]*\.\d[\d_]*(?:[eE][+-]?\d+)?|\d[\d_]*[eE][+-]?\d+)[fFdD]?$|^-?\d[\d_]*[fF]$").unwrap();
    static ref INT_LITERAL: Regex = Regex::new(r"^-?(?:0[xX][0-9a-fA-F_]+|0[bB][01_]+|\d[\d_]*)$").unwrap();
    static ref QUOTED_LITERAL: Regex = Regex::new(r#"(?s)^".*"$"#).unwrap();
    static ref DURATION_MARKER: Regex = Regex::new(r"(?i)duration|nanos").unwrap();
    static ref SIZE_ACCESSOR: Regex =
        Regex::new(r"\.(?:size|length|size\(\)|count\(\))$").unwrap();
    static ref NUMERIC_CONVERSION: Regex =
        Regex::new(r"\.to(Int|Long|Double|Float|Short|Byte)\(\)$").unwrap();
    static ref TEXT_ACCESSOR: Regex =
        Regex::new(r"\.(?:toString\(\)|message|localizedMessage|name|text)$").unwrap();
    static ref TIME_KEYWORD: Regex = Regex::new(r"(?i)elapsed|latency|millis|seconds|time").unwrap();
    static ref QUANTITY_KEYWORD: Regex =
        Regex::new(r"(?i)bytes|count|records|items|size|length|total|number").unwrap();
    static ref LAST_SEGMENT: Regex = Regex::new(r"([A-Za-z_][A-Za-z0-9_]*)\W*$").unwrap();
}

/// Return the semantic type label for a value expression.
pub fn classify(expr: &str) -> String {
    let expr = expr.trim();

    if let Some(caps) = ARRAY_CONSTRUCTOR.captures(expr) {
        let body = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let elements: Vec<String> = split_top_level(body).iter().map(|e| classify(e)).collect();
        if elements.is_empty() {
            return "Array<Object>".to_string();
        }
        return format!("Array<{}>", elements.join(", "));
    }

    classify_scalar(expr).to_string()
}

fn classify_scalar(expr: &str) -> &'static str {
    if LONG_LITERAL.is_match(expr) {
        return "Long";
    }
    if DECIMAL_LITERAL.is_match(expr) {
        return "Double";
    }
    if INT_LITERAL.is_match(expr) {
        return "Int";
    }
    if QUOTED_LITERAL.is_match(expr) {
        return "String";
    }
    if expr == "true" || expr == "false" {
        return "Boolean";
    }
    if DURATION_MARKER.is_match(expr) {
        return "Duration";
    }
    if SIZE_ACCESSOR.is_match(expr) {
        return "Int";
    }
    if let Some(caps) = NUMERIC_CONVERSION.captures(expr) {
        return match caps.get(1).map(|m| m.as_str()) {
            Some("Long") => "Long",
            Some("Double") => "Double",
            Some("Float") => "Float",
            Some("Short") => "Short",
            Some("Byte") => "Byte",
            _ => "Int",
        };
    }
    if TEXT_ACCESSOR.is_match(expr) {
        return "String";
    }
    if TIME_KEYWORD.is_match(expr) {
        return "Duration";
    }
    if QUANTITY_KEYWORD.is_match(expr) {
        return "Number";
    }
    if looks_like_error(expr) {
        return "Throwable";
    }
    "Object"
}

fn looks_like_error(expr: &str) -> bool {
    let lower = expr.to_lowercase();
    if lower.contains("throwable") || lower.contains("exception") {
        return true;
    }
    let last = LAST_SEGMENT
        .captures(&lower)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or_default();
    last == "e" || last == "error" || last.ends_with("cause")
}
