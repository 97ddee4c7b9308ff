//! Configuration schema for meterscan.
//!
//! A config file names the receiver families to look for, which files to
//! scan, and manual overrides for names the analyzer cannot resolve on its
//! own.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::scan::Receiver;

/// Config file names searched for in the working directory.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["meterscan.yaml", ".meterscan.yaml"];

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("{family} receiver {field} {value:?} is not an identifier")]
    InvalidReceiver {
        family: &'static str,
        field: &'static str,
        value: String,
    },
    #[error("override key {0:?} must look like ClassName.variableName")]
    InvalidOverrideKey(String),
    #[error("override {0:?} must be given as KEY=VALUE")]
    InvalidOverrideArgument(String),
    #[error("no file extensions configured")]
    NoExtensions,
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "Receiver::default_meter")]
    pub meter_receiver: Receiver,
    #[serde(default = "Receiver::default_event")]
    pub event_receiver: Receiver,
    /// File extensions to scan (without the dot).
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Glob patterns for paths to skip (e.g. "**/test/**").
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    /// `ClassName.variableName -> value`.
    #[serde(default)]
    pub overrides: BTreeMap<String, String>,
}

fn default_extensions() -> Vec<String> {
    vec!["kt".to_string(), "kts".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meter_receiver: Receiver::default_meter(),
            event_receiver: Receiver::default_event(),
            extensions: default_extensions(),
            excluded_paths: Vec::new(),
            overrides: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a config from YAML text. An empty document yields the defaults.
    pub fn parse_str(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Look for a config file in `dir`.
    pub fn discover<P: AsRef<Path>>(dir: P) -> Option<PathBuf> {
        DEFAULT_CONFIG_NAMES
            .iter()
            .map(|name| dir.as_ref().join(name))
            .find(|path| path.is_file())
    }

    /// Add `KEY=VALUE` overrides given on the command line.
    pub fn apply_override_args(&mut self, args: &[String]) -> Result<(), ConfigError> {
        for arg in args {
            let (key, value) = arg
                .split_once('=')
                .ok_or_else(|| ConfigError::InvalidOverrideArgument(arg.clone()))?;
            self.overrides
                .insert(key.trim().to_string(), value.to_string());
        }
        Ok(())
    }
}

/// Validate a configuration.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    for (family, receiver) in [
        ("meter", &config.meter_receiver),
        ("event", &config.event_receiver),
    ] {
        if !IDENTIFIER.is_match(&receiver.token) {
            return Err(ConfigError::InvalidReceiver {
                family,
                field: "token",
                value: receiver.token.clone(),
            });
        }
        if !IDENTIFIER.is_match(&receiver.type_name) {
            return Err(ConfigError::InvalidReceiver {
                family,
                field: "type_name",
                value: receiver.type_name.clone(),
            });
        }
    }

    if config.extensions.is_empty() {
        return Err(ConfigError::NoExtensions);
    }

    for key in config.overrides.keys() {
        let valid = key
            .split_once('.')
            .map(|(class, name)| IDENTIFIER.is_match(class) && IDENTIFIER.is_match(name))
            .unwrap_or(false);
        if !valid {
            return Err(ConfigError::InvalidOverrideKey(key.clone()));
        }
    }

    Ok(())
}
