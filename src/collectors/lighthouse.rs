//! External-audit collector backed by the Lighthouse CLI

use super::run_tool;
use crate::error::CollectorError;
use crate::score::ScoreMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Lighthouse category keys as the tool emits them, paired with the metric
/// names used in weight configuration. The tool's hyphenated identifiers are
/// part of its output contract and must not be renamed.
const CATEGORIES: &[(&str, &str)] = &[
    ("performance", "performance"),
    ("accessibility", "accessibility"),
    ("best-practices", "best_practices"),
    ("seo", "seo"),
    ("pwa", "pwa"),
];

#[derive(Debug, Deserialize)]
struct LighthouseReport {
    categories: HashMap<String, Category>,
}

#[derive(Debug, Deserialize)]
struct Category {
    /// 0-1 scale in the tool's output
    score: Option<f64>,
}

/// Audit the live URL with headless-Chrome Lighthouse and rescale its 0-1
/// category scores to 0-10.
///
/// Categories missing from the tool's output are omitted from the result,
/// not scored as zero. Without a live URL this collector fails gracefully.
pub async fn collect(root: &Path, live_url: Option<&str>) -> Result<ScoreMap, CollectorError> {
    let url = live_url.ok_or_else(|| CollectorError::NoLiveUrl {
        tool: "lighthouse".to_string(),
    })?;

    let output = run_tool(
        "lighthouse",
        &[
            url,
            "--output=json",
            "--output-path=stdout",
            "--quiet",
            "--chrome-flags=--headless",
        ],
        root,
        "lighthouse",
        "`npm i -g lighthouse`",
    )
    .await?;

    if !output.success() {
        return Err(CollectorError::failed(
            "lighthouse",
            format!("exited with status {}", output.status.unwrap_or(-1)),
        ));
    }

    let report: LighthouseReport = serde_json::from_str(&output.stdout)?;
    let scores = rescale_categories(&report);
    info!("lighthouse produced {} category scores", scores.len());
    Ok(scores)
}

fn rescale_categories(report: &LighthouseReport) -> ScoreMap {
    let mut scores = ScoreMap::new();
    for (external_key, metric) in CATEGORIES {
        if let Some(score) = report
            .categories
            .get(*external_key)
            .and_then(|category| category.score)
        {
            scores.insert_score(metric, score * 10.0);
        }
    }
    scores
}
