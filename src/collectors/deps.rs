//! Dependency-count collector: package.json manifest size

use crate::error::CollectorError;
use crate::score::{count_score, ScoreMap};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Fewer-is-better band: at most this many dependencies scores 10
const DEPS_FLOOR: u32 = 20;
/// At least this many dependencies scores 0
const DEPS_CEILING: u32 = 100;

/// The slice of package.json this collector cares about: only key counts
/// matter, versions are ignored.
#[derive(Debug, Deserialize)]
struct PackageManifest {
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: BTreeMap<String, String>,
}

/// Count declared runtime plus development dependencies and score the total.
///
/// A missing manifest omits the metric entirely rather than scoring 0 (the
/// raw count would be meaningless) or 10 (absence of a manifest is not
/// evidence of a dependency-free project).
pub async fn collect(root: &Path) -> Result<ScoreMap, CollectorError> {
    let manifest_path = root.join("package.json");
    if !manifest_path.exists() {
        return Err(CollectorError::output("package.json not found"));
    }

    let content = std::fs::read_to_string(&manifest_path)?;
    let manifest: PackageManifest = serde_json::from_str(&content)?;
    let total = (manifest.dependencies.len() + manifest.dev_dependencies.len()) as u32;

    info!(
        "{} runtime + {} dev dependencies declared",
        manifest.dependencies.len(),
        manifest.dev_dependencies.len()
    );

    let mut scores = ScoreMap::new();
    scores.insert_score(
        "package_dependencies",
        count_score(total, DEPS_FLOOR, DEPS_CEILING),
    );
    scores.insert_raw("package_dependencies", total as f64);
    Ok(scores)
}
