//! Call-site detection for meter and event receivers.
//!
//! Two shapes are recognized:
//! - direct: `receiver.counter(...)`, `receiver?.info(...)`
//! - scoped: calls inside a scope block opened on the receiver, either bare
//!   (`apply`/`run`) or through the block parameter (`let`/`also`)
//!
//! Every call is keyed by the offset of its opening parenthesis. An offset
//! is claimed by the first pass that finds it so nested or overlapping
//! blocks never produce the same call twice.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};

use super::delimiters::{extract_arguments, CodeMap};
use super::scope::{scope_regions_in, ScopeReceiver};
use super::types::{EVENT_METHODS, METER_METHODS};

lazy_static! {
    static ref METER_BARE_CALL: Regex = Regex::new(&bare_call_pattern(&METER_METHODS)).unwrap();
    static ref EVENT_BARE_CALL: Regex = Regex::new(&bare_call_pattern(&EVENT_METHODS)).unwrap();
}

/// A detected call before interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    /// Method token, e.g. `counter` or `warn`.
    pub method: String,
    /// Byte offset of the `(` opening the argument list.
    pub open: usize,
    pub args: Vec<String>,
}

/// Finds calls of one method family on a set of receivers.
pub struct CallDetector<'a> {
    text: &'a str,
    methods: &'a phf::Set<&'static str>,
    code: CodeMap,
    /// Bare-call pattern for `methods`, `None` if it does not compile.
    bare: Option<Regex>,
    /// Compiled `<prefix>.<method>(` patterns by prefix.
    prefixed: HashMap<String, Regex>,
    claimed: BTreeSet<usize>,
    records: Vec<CallRecord>,
}

impl<'a> CallDetector<'a> {
    pub fn new(text: &'a str, methods: &'a phf::Set<&'static str>) -> Self {
        Self {
            text,
            methods,
            code: CodeMap::new(text),
            bare: bare_call_regex(methods),
            prefixed: HashMap::new(),
            claimed: BTreeSet::new(),
            records: Vec::new(),
        }
    }

    /// Run the direct pass for every receiver, then the scope pass, and
    /// return the records in source order.
    pub fn detect(mut self, receivers: &[String]) -> Vec<CallRecord> {
        for receiver in receivers {
            self.scan_prefixed(receiver, 0, self.text.len());
        }

        for receiver in receivers {
            for region in scope_regions_in(self.text, &self.code, receiver) {
                let (start, end) = (region.open + 1, region.close);
                match &region.receiver {
                    ScopeReceiver::Implicit => self.scan_bare(start, end),
                    ScopeReceiver::Parameter { name } => self.scan_prefixed(name, start, end),
                }
            }
        }

        self.records.sort_by_key(|r| r.open);
        self.records
    }

    /// `<prefix>[?].<method>(` within `text[start..end]`.
    fn scan_prefixed(&mut self, prefix: &str, start: usize, end: usize) {
        let Some(call_re) = self.prefixed_regex(prefix) else {
            return;
        };

        let window = &self.text[start..end];
        let found: Vec<(String, usize)> = call_re
            .captures_iter(window)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                if !self.code.is_code(start + whole.start()) {
                    return None;
                }
                let method = caps.get(1)?.as_str();
                self.methods
                    .contains(method)
                    .then(|| (method.to_string(), start + whole.end() - 1))
            })
            .collect();

        for (method, open) in found {
            self.claim(method, open);
        }
    }

    fn prefixed_regex(&mut self, prefix: &str) -> Option<Regex> {
        if let Some(re) = self.prefixed.get(prefix) {
            return Some(re.clone());
        }
        let pattern = format!(
            r"\b{}\s*\??\.\s*([A-Za-z_][A-Za-z0-9_]*)\s*\(",
            regex::escape(prefix)
        );
        let re = Regex::new(&pattern).ok()?;
        self.prefixed.insert(prefix.to_string(), re.clone());
        Some(re)
    }

    /// Bare `<method>(` or `this.<method>(` within `text[start..end]`, not
    /// a call on another object and not a `fun` declaration.
    fn scan_bare(&mut self, start: usize, end: usize) {
        let Some(bare_re) = self.bare.clone() else {
            return;
        };

        let window = &self.text[start..end];
        let found: Vec<(String, usize)> = bare_re
            .captures_iter(window)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let method = caps.get(1)?;
                if !self.code.is_code(start + method.start()) {
                    return None;
                }
                let before = window[..method.start()].trim_end();
                if let Some(qualifier) = before.strip_suffix('.') {
                    let qualifier = qualifier.trim_end();
                    let qualifier = qualifier.strip_suffix('?').unwrap_or(qualifier);
                    if !ends_with_word(qualifier.trim_end(), "this") {
                        return None;
                    }
                } else if ends_with_word(before, "fun") {
                    return None;
                }
                Some((method.as_str().to_string(), start + whole.end() - 1))
            })
            .collect();

        for (method, open) in found {
            self.claim(method, open);
        }
    }

    fn claim(&mut self, method: String, open: usize) {
        if !self.claimed.insert(open) {
            return;
        }
        let args = extract_arguments(self.text, open);
        self.records.push(CallRecord { method, open, args });
    }
}

/// Regex clones share the compiled program, so the two built-in families
/// are compiled once per process.
fn bare_call_regex(methods: &phf::Set<&'static str>) -> Option<Regex> {
    if std::ptr::eq(methods, &METER_METHODS) {
        Some(METER_BARE_CALL.clone())
    } else if std::ptr::eq(methods, &EVENT_METHODS) {
        Some(EVENT_BARE_CALL.clone())
    } else {
        Regex::new(&bare_call_pattern(methods)).ok()
    }
}

fn bare_call_pattern(methods: &phf::Set<&'static str>) -> String {
    let mut names: Vec<&str> = methods.iter().copied().collect();
    names.sort_unstable();
    format!(r"\b({})\s*\(", names.join("|"))
}

/// `text` ends with `word` as a whole identifier.
fn ends_with_word(text: &str, word: &str) -> bool {
    text.strip_suffix(word).map_or(false, |head| {
        !head
            .chars()
            .next_back()
            .map_or(false, |c| c.is_alphanumeric() || c == '_')
    })
}

/// Convenience wrapper over [`CallDetector`].
pub fn detect_calls(
    text: &str,
    receivers: &[String],
    methods: &phf::Set<&'static str>,
) -> Vec<CallRecord> {
    CallDetector::new(text, methods).detect(receivers)
}
