//! String template resolution against the same-file symbol table.
//!
//! Handles `$name` and `${name}` tokens, following chains such as
//! `val meterPrefix = "$basePrefix.orders"`. Tokens that cannot be resolved
//! are left verbatim so the final report still shows where the name came
//! from.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

use super::symbols::SymbolTable;

/// Upper bound on nested substitutions within one resolution.
const MAX_DEPTH: usize = 32;

/// Smallest expansion limit, used for short inputs.
pub const DEFAULT_MAX_LEN: usize = 4096;

lazy_static! {
    static ref TEMPLATE_TOKEN: Regex =
        Regex::new(r"\$\{([^}]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)").unwrap();
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// Outcome of resolving a name expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub value: String,
    /// False if any token or identifier could not be substituted.
    pub resolved: bool,
}

impl Resolution {
    fn unresolved(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            resolved: false,
        }
    }
}

/// State of one top-level resolution.
#[derive(Default)]
struct Expansion {
    /// Names currently being expanded, outermost first.
    chain: Vec<String>,
    /// Names already expanded, so each name is expanded at most once.
    /// Results cut short by a cycle stay unresolved wherever they are reused.
    cache: HashMap<String, Resolution>,
}

/// Resolves name expressions for a single file.
pub struct TemplateResolver<'a> {
    table: &'a SymbolTable,
    file_identifier: &'a str,
    max_len: usize,
}

impl<'a> TemplateResolver<'a> {
    pub fn new(table: &'a SymbolTable, file_identifier: &'a str) -> Self {
        Self {
            table,
            file_identifier,
            max_len: DEFAULT_MAX_LEN,
        }
    }

    /// Cap on the length of any expanded value. Tokens that would push a
    /// value past it stay verbatim and the result is unresolved.
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    /// Resolve a raw name expression: a quoted literal or a bare identifier.
    pub fn resolve(&self, expr: &str) -> Resolution {
        let mut state = Expansion::default();
        self.resolve_expr(expr.trim(), &mut state)
    }

    fn resolve_expr(&self, expr: &str, state: &mut Expansion) -> Resolution {
        match unquote(expr) {
            Some(body) => self.resolve_literal(body, state),
            None => {
                let name = self.local_name(expr);
                self.resolve_name(name, state)
                    .unwrap_or_else(|| Resolution::unresolved(expr))
            }
        }
    }

    /// Look up `name` and resolve its value. `None` when the name is
    /// unknown, cyclic, or nested too deep.
    fn resolve_name(&self, name: &str, state: &mut Expansion) -> Option<Resolution> {
        if let Some(cached) = state.cache.get(name) {
            return Some(cached.clone());
        }
        if state.chain.len() >= MAX_DEPTH || state.chain.iter().any(|seen| seen == name) {
            return None;
        }
        let value = self.table.get(name)?;

        state.chain.push(name.to_string());
        let resolution = self.resolve_literal(value, state);
        state.chain.pop();

        state.cache.insert(name.to_string(), resolution.clone());
        Some(resolution)
    }

    fn resolve_literal(&self, body: &str, state: &mut Expansion) -> Resolution {
        let mut resolved = true;
        let mut value = String::with_capacity(body.len());
        let mut last = 0;

        for caps in TEMPLATE_TOKEN.captures_iter(body) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            value.push_str(&body[last..whole.start()]);
            last = whole.end();

            let token = whole.as_str();
            let name = caps
                .get(1)
                .map(|m| m.as_str().trim())
                .or_else(|| caps.get(2).map(|m| m.as_str()))
                .unwrap_or_default();

            // ${expr.call()} and friends
            if !IDENTIFIER.is_match(name) || value.len() >= self.max_len {
                resolved = false;
                value.push_str(token);
                continue;
            }

            match self.resolve_name(name, state) {
                Some(inner) if value.len() + inner.value.len() <= self.max_len => {
                    resolved &= inner.resolved;
                    value.push_str(&inner.value);
                }
                _ => {
                    resolved = false;
                    value.push_str(token);
                }
            }
        }
        value.push_str(&body[last..]);

        Resolution { value, resolved }
    }

    /// Strip a `<FileIdentifier>.` qualifier from a bare reference.
    fn local_name<'e>(&self, expr: &'e str) -> &'e str {
        if self.file_identifier.is_empty() {
            return expr;
        }
        expr.strip_prefix(self.file_identifier)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(expr)
    }
}

/// Body of a double-quoted literal, if `expr` is one.
fn unquote(expr: &str) -> Option<&str> {
    if expr.len() >= 2 && expr.starts_with('"') && expr.ends_with('"') {
        Some(&expr[1..expr.len() - 1])
    } else {
        None
    }
}

/// Resolve `expr` against `table` with no file qualifier.
pub fn resolve(expr: &str, table: &SymbolTable) -> Resolution {
    TemplateResolver::new(table, "").resolve(expr)
}
