//! Ranking driver: sequential evaluation and the sorted result set

use crate::config::{ProjectSpec, WeightsDoc};
use crate::evaluate::{evaluate_with_timeouts, Evaluation};
use crate::score::weighted_total;
use crate::server::{POLL_INTERVAL, READY_TIMEOUT};
use serde::Serialize;
use std::time::Duration;

/// One table cell: a metric either measured (score, maybe a raw value) or
/// absent. Absence is distinct from a zero score.
#[derive(Debug, Clone, Serialize)]
pub struct MetricCell {
    pub metric: String,
    pub score: Option<f64>,
    pub raw: Option<f64>,
}

/// Final ranking row for one project, immutable once built
#[derive(Debug, Serialize)]
pub struct RankedResult {
    pub project_name: String,
    pub cells: Vec<MetricCell>,
    pub total: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Evaluate every configured project in order and rank the outcomes.
///
/// Projects run strictly sequentially: an evaluation owns its project's
/// working directory and a listening port, so overlap risks collision.
pub async fn run_ranking(projects: &[ProjectSpec], weights: &WeightsDoc) -> Vec<RankedResult> {
    run_ranking_with_timeouts(projects, weights, READY_TIMEOUT).await
}

/// Same as [`run_ranking`] with an adjustable server-readiness window.
pub async fn run_ranking_with_timeouts(
    projects: &[ProjectSpec],
    weights: &WeightsDoc,
    ready_timeout: Duration,
) -> Vec<RankedResult> {
    let mut evaluations = Vec::with_capacity(projects.len());
    for project in projects {
        evaluations.push(evaluate_with_timeouts(project, ready_timeout, POLL_INTERVAL).await);
    }
    rank_evaluations(evaluations, weights)
}

/// Turn evaluations into a ranking: weighted totals over observed metrics,
/// sorted descending, ties broken by configured order (stable sort).
pub fn rank_evaluations(evaluations: Vec<Evaluation>, weights: &WeightsDoc) -> Vec<RankedResult> {
    let weight_map = weights.weights();
    let metric_names = weights.metric_names();

    let mut results: Vec<RankedResult> = evaluations
        .into_iter()
        .map(|evaluation| {
            let cells = metric_names
                .iter()
                .map(|metric| MetricCell {
                    metric: metric.clone(),
                    score: evaluation.scores.score(metric),
                    raw: evaluation.scores.raw(metric),
                })
                .collect();
            RankedResult {
                total: weighted_total(&evaluation.scores, &weight_map),
                project_name: evaluation.project_name,
                cells,
                warnings: evaluation.warnings,
            }
        })
        .collect();

    results.sort_by(|a, b| b.total.total_cmp(&a.total));
    results
}
