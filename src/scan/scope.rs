//! Scope-lambda regions attached to a receiver.
//!
//! `registry?.apply { counter(...) }` makes the receiver implicit inside the
//! block, while `registry?.let { it.counter(...) }` passes it as a block
//! parameter (`it` unless the block names it with `param ->`).

use lazy_static::lazy_static;
use regex::Regex;

use super::delimiters::{find_matching_brace, CodeMap};

/// Placeholder name of an unnamed lambda parameter.
pub const DEFAULT_PARAMETER: &str = "it";

/// Bytes after the opening brace searched for a `param ->` prefix.
const PARAMETER_LOOKAHEAD: usize = 64;

/// Scope keywords whose block runs with the receiver as `this`.
const IMPLICIT_KEYWORDS: &[&str] = &["apply", "run"];

/// Scope keywords whose block receives the receiver as an argument.
const PARAMETER_KEYWORDS: &[&str] = &["let", "also"];

lazy_static! {
    static ref PARAMETER_PREFIX: Regex =
        Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*(?::\s*[A-Za-z_][\w.<>?]*\s*)?->").unwrap();
}

/// How calls inside a scope block reach the receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeReceiver {
    /// Bare `counter(...)` calls.
    Implicit,
    /// Calls prefixed by the block parameter, `it.counter(...)`.
    Parameter { name: String },
}

/// A `{ ... }` block bound to a receiver. `open` and `close` are the byte
/// offsets of the braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeRegion {
    pub open: usize,
    pub close: usize,
    pub receiver: ScopeReceiver,
}

impl ScopeRegion {
    /// Text strictly between the braces.
    pub fn body<'a>(&self, text: &'a str) -> &'a str {
        &text[self.open + 1..self.close]
    }
}

/// Find every scope block opened on `receiver`.
pub fn find_scope_regions(text: &str, receiver: &str) -> Vec<ScopeRegion> {
    scope_regions_in(text, &CodeMap::new(text), receiver)
}

/// Like [`find_scope_regions`], reusing a precomputed [`CodeMap`].
pub(crate) fn scope_regions_in(text: &str, code: &CodeMap, receiver: &str) -> Vec<ScopeRegion> {
    let keywords = IMPLICIT_KEYWORDS
        .iter()
        .chain(PARAMETER_KEYWORDS.iter())
        .copied()
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(
        r"\b{}\s*\??\.\s*({})\s*\{{",
        regex::escape(receiver),
        keywords
    );
    let Ok(scope_re) = Regex::new(&pattern) else {
        return Vec::new();
    };

    let mut regions = Vec::new();
    for caps in scope_re.captures_iter(text) {
        let (Some(whole), Some(keyword)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if !code.is_code(whole.start()) {
            continue;
        }
        let open = whole.end() - 1;
        let Some(close) = find_matching_brace(text, open) else {
            continue;
        };

        let receiver = if IMPLICIT_KEYWORDS.contains(&keyword.as_str()) {
            ScopeReceiver::Implicit
        } else {
            ScopeReceiver::Parameter {
                name: parameter_name(text, open, close),
            }
        };

        regions.push(ScopeRegion {
            open,
            close,
            receiver,
        });
    }

    regions
}

/// Explicit `name ->` right after the brace, else the default placeholder.
fn parameter_name(text: &str, open: usize, close: usize) -> String {
    let mut end = (open + 1 + PARAMETER_LOOKAHEAD).min(close);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let window = &text[open + 1..end];

    PARAMETER_PREFIX
        .captures(window)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_PARAMETER.to_string())
}
