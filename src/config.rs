//! Weights and project-list configuration documents
//!
//! Both inputs are YAML, consumed once at startup. The weights key set
//! defines the universe of metrics eligible to contribute to a total;
//! collectors may still report metrics outside it, but aggregation ignores
//! them.

use crate::error::{BenchError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Weight entry for one configured metric
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricWeight {
    /// Relative weight, must be non-negative
    pub weight: f64,
}

/// The weights document (`config.yaml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightsDoc {
    /// Metric name -> weight. YAML declaration order is preserved and
    /// becomes the table column order.
    pub metrics: IndexMap<String, MetricWeight>,
}

impl WeightsDoc {
    /// Load and validate a weights document
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BenchError::config(format!("cannot read weights file {}: {e}", path.display()))
        })?;
        let doc: WeightsDoc = serde_yaml::from_str(&content)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Validate that every weight is non-negative and at least one metric is
    /// configured
    pub fn validate(&self) -> Result<()> {
        if self.metrics.is_empty() {
            return Err(BenchError::config("weights document declares no metrics"));
        }
        for (name, entry) in &self.metrics {
            if entry.weight < 0.0 || !entry.weight.is_finite() {
                return Err(BenchError::config(format!(
                    "metric '{name}' has invalid weight {}",
                    entry.weight
                )));
            }
        }
        let sum: f64 = self.metrics.values().map(|m| m.weight).sum();
        if (sum - 1.0).abs() > 0.01 {
            tracing::warn!(
                "metric weights sum to {sum:.3}, not 1.0; totals are renormalized over \
                 observed metrics anyway"
            );
        }
        Ok(())
    }

    /// Flatten to the metric -> weight map the aggregator consumes
    pub fn weights(&self) -> BTreeMap<String, f64> {
        self.metrics
            .iter()
            .map(|(name, entry)| (name.clone(), entry.weight))
            .collect()
    }

    /// Metric names in table-column order, i.e. declaration order
    pub fn metric_names(&self) -> Vec<String> {
        self.metrics.keys().cloned().collect()
    }
}

/// One project to evaluate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSpec {
    /// Display name, also the ranking row label
    pub name: String,
    /// Project root directory
    pub path: PathBuf,
    /// Command that starts a dev server, run through `sh -c` in `path`.
    /// Both-or-neither with `serve_url`; absence means analyzers run against
    /// the filesystem only.
    #[serde(default)]
    pub serve_command: Option<String>,
    /// URL polled for readiness and handed to URL-dependent collectors
    #[serde(default)]
    pub serve_url: Option<String>,
    /// Production build command, defaults to `npm run build`
    #[serde(default)]
    pub build_command: Option<String>,
    /// Output folder produced by the build, relative to `path`, defaults to
    /// `dist`
    #[serde(default)]
    pub dist_folder: Option<String>,
}

impl ProjectSpec {
    pub fn build_command(&self) -> &str {
        self.build_command.as_deref().unwrap_or("npm run build")
    }

    pub fn dist_folder(&self) -> &str {
        self.dist_folder.as_deref().unwrap_or("dist")
    }
}

/// The projects document (`projects.yaml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectsDoc {
    pub projects: Vec<ProjectSpec>,
}

impl ProjectsDoc {
    /// Load and validate a projects document
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BenchError::config(format!("cannot read projects file {}: {e}", path.display()))
        })?;
        let doc: ProjectsDoc = serde_yaml::from_str(&content)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Validate project entries. `serve_command` and `serve_url` must be
    /// given together or not at all.
    pub fn validate(&self) -> Result<()> {
        for project in &self.projects {
            if project.name.trim().is_empty() {
                return Err(BenchError::config("project with empty name"));
            }
            match (&project.serve_command, &project.serve_url) {
                (Some(_), None) => {
                    return Err(BenchError::config(format!(
                        "project '{}' declares serve_command without serve_url",
                        project.name
                    )));
                }
                (None, Some(_)) => {
                    return Err(BenchError::config(format!(
                        "project '{}' declares serve_url without serve_command",
                        project.name
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}
