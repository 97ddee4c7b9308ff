//! Runs the analyzer over every file a provider yields.

use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::analyzer::Analyzer;
use crate::catalog::Catalog;
use crate::config::Config;
use crate::source::FileProvider;

/// Analyzes files in parallel and folds the results into a [`Catalog`].
pub struct Runner {
    analyzer: Analyzer,
    overrides: BTreeMap<String, String>,
}

impl Runner {
    /// Create a runner from a loaded configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            analyzer: Analyzer::new(config.meter_receiver.clone(), config.event_receiver.clone()),
            overrides: config.overrides.clone(),
        }
    }

    /// Add or replace manual overrides (`Class.name -> value`).
    pub fn with_overrides(mut self, overrides: BTreeMap<String, String>) -> Self {
        self.overrides.extend(overrides);
        self
    }

    /// Analyze every file from `provider`.
    ///
    /// Files are analyzed in parallel; merging happens afterwards in the
    /// provider's order so the catalog is deterministic.
    pub fn run(&self, provider: &dyn FileProvider) -> anyhow::Result<Catalog> {
        let files = provider.files()?;
        info!(files = files.len(), "analyzing sources");

        let results: Vec<_> = files
            .par_iter()
            .map(|file| self.analyzer.analyze(file, &self.overrides))
            .collect();

        let mut catalog = Catalog::new();
        for (file, result) in files.iter().zip(results) {
            if !result.is_empty() {
                debug!(
                    file = %file.path.display(),
                    meters = result.meters.len(),
                    events = result.events.len(),
                    "found instrumentation"
                );
            }
            catalog.add(result);
        }

        info!(
            meters = catalog.meters().len(),
            events = catalog.events().len(),
            "catalog built"
        );
        Ok(catalog)
    }
}
