//! Same-file string constant table.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};

use super::delimiters::CodeMap;

lazy_static! {
    /// `[visibility] [const] val name[: Type] = "literal"` where the literal is
    /// the whole initializer.
    static ref VAL_DECLARATION: Regex = Regex::new(
        r#"(?m)(?:\b(?:private|public|internal|protected)\s+)?(?:\bconst\s+)?\bval\s+([A-Za-z_][A-Za-z0-9_]*)\s*(?::\s*[A-Za-z_][\w.<>?]*\s*)?=\s*"((?:[^"\\\n]|\\.)*)"[ \t]*(?:;|//.*)?\r?$"#
    ).unwrap();
}

/// Identifier to literal value bindings for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    values: HashMap<String, String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `text` for literal `val` declarations. Later declarations of the
    /// same name replace earlier ones. Declarations inside comments or
    /// string literals are not code and are skipped.
    pub fn from_source(text: &str) -> Self {
        let code = CodeMap::new(text);
        let mut table = Self::new();
        for caps in VAL_DECLARATION.captures_iter(text) {
            let (Some(name), Some(value)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            if !code.is_code(name.start()) {
                continue;
            }
            table.insert(name.as_str(), value.as_str());
        }
        table
    }

    /// Build the table for a file and apply the overrides addressed to it.
    pub fn build(text: &str, file_identifier: &str, overrides: &BTreeMap<String, String>) -> Self {
        let mut table = Self::from_source(text);
        table.apply_overrides(file_identifier, overrides);
        table
    }

    /// Apply overrides keyed `<file_identifier>.<name>`; other keys are
    /// ignored.
    pub fn apply_overrides(&mut self, file_identifier: &str, overrides: &BTreeMap<String, String>) {
        for (key, value) in overrides {
            let Some((class, name)) = key.split_once('.') else {
                continue;
            };
            if class == file_identifier && !name.is_empty() {
                self.insert(name, value);
            }
        }
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        self.values.insert(name.to_string(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
