//! Per-project evaluation lifecycle
//!
//! One evaluation owns at most one dev-server process: start it, wait for
//! readiness, run every collector with failure isolation, and tear the
//! server down on every exit path. A server that never becomes reachable
//! aborts the project with an empty score map; a failing collector only
//! leaves its own metrics absent.

use crate::collectors::{build, deps, lighthouse, lint, security, volume};
use crate::config::ProjectSpec;
use crate::error::CollectorError;
use crate::score::ScoreMap;
use crate::server::{wait_for_url, DevServer, POLL_INTERVAL, READY_TIMEOUT};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Outcome of one project's evaluation
#[derive(Debug)]
pub struct Evaluation {
    pub project_name: String,
    pub scores: ScoreMap,
    /// Operator-facing notes: skipped collectors and security findings
    pub warnings: Vec<String>,
}

impl Evaluation {
    fn new(project_name: String) -> Self {
        Self {
            project_name,
            scores: ScoreMap::new(),
            warnings: Vec::new(),
        }
    }
}

/// Evaluate one project end to end.
pub async fn evaluate_project(project: &ProjectSpec) -> Evaluation {
    evaluate_with_timeouts(project, READY_TIMEOUT, POLL_INTERVAL).await
}

/// Same as [`evaluate_project`] with an injectable readiness window, so the
/// abort path stays testable without the full 30 s wait.
pub async fn evaluate_with_timeouts(
    project: &ProjectSpec,
    ready_timeout: Duration,
    poll_interval: Duration,
) -> Evaluation {
    info!("evaluating project '{}'", project.name);
    let mut evaluation = Evaluation::new(project.name.clone());
    let root = resolve_root(project);

    // Acquire the dev server, if one is declared. Config validation
    // guarantees command and URL come as a pair.
    let mut server = None;
    let mut live_url = None;
    if let (Some(command), Some(url)) = (&project.serve_command, &project.serve_url) {
        match DevServer::start(command, &root) {
            Ok(handle) => {
                if wait_for_url(url, ready_timeout, poll_interval).await {
                    info!("dev server ready at {url}");
                    live_url = Some(url.as_str());
                    server = Some(handle);
                } else {
                    warn!(
                        "{}: dev server never became reachable at {url}",
                        project.name
                    );
                    evaluation
                        .warnings
                        .push(format!("dev server never became reachable at {url}"));
                    handle.shutdown().await;
                    return evaluation;
                }
            }
            Err(e) => {
                warn!("{}: could not start dev server: {e}", project.name);
                evaluation
                    .warnings
                    .push(format!("could not start dev server: {e}"));
                return evaluation;
            }
        }
    }

    collect_all(&mut evaluation, &root, project, live_url).await;

    // Unconditional teardown: collectors cannot escape collect_all.
    if let Some(handle) = server {
        handle.shutdown().await;
    }

    evaluation
}

/// Run every collector in fixed declared order. Each writes a disjoint key
/// set; the merge reports any overlap so the convention is enforced.
async fn collect_all(
    evaluation: &mut Evaluation,
    root: &std::path::Path,
    project: &ProjectSpec,
    live_url: Option<&str>,
) {
    absorb(evaluation, "lighthouse", lighthouse::collect(root, live_url).await);
    absorb(evaluation, "eslint", lint::collect(root).await);
    absorb(evaluation, "build", build::collect(root, project).await);
    absorb(evaluation, "code volume", volume::collect(root).await);
    absorb(evaluation, "dependencies", deps::collect(root).await);

    match security::collect(root, live_url).await {
        Ok(posture) => {
            merge_partial(evaluation, "security", posture.scores);
            for issue in posture.issues {
                evaluation.warnings.push(format!("security: {issue}"));
            }
        }
        Err(e) => skip(evaluation, "security", e),
    }
}

fn absorb(
    evaluation: &mut Evaluation,
    category: &str,
    result: Result<ScoreMap, CollectorError>,
) {
    match result {
        Ok(partial) => merge_partial(evaluation, category, partial),
        Err(e) => skip(evaluation, category, e),
    }
}

fn merge_partial(evaluation: &mut Evaluation, category: &str, partial: ScoreMap) {
    let overwritten = evaluation.scores.merge(partial);
    if overwritten > 0 {
        warn!("{category} overwrote {overwritten} metric entries of an earlier collector");
    }
}

fn skip(evaluation: &mut Evaluation, category: &str, error: CollectorError) {
    warn!("{}: {category} skipped: {error}", evaluation.project_name);
    evaluation.warnings.push(format!("{category}: {error}"));
}

fn resolve_root(project: &ProjectSpec) -> PathBuf {
    project
        .path
        .canonicalize()
        .unwrap_or_else(|_| project.path.clone())
}
