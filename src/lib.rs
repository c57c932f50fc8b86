//! # webbench
//!
//! Benchmark a set of web projects against a common battery of quality and
//! performance metrics and rank them on one weighted scoreboard:
//! - **Live audits**: Lighthouse category scores against each running dev server
//! - **Static quality**: ESLint diagnostics, code volume, dependency count
//! - **Build footprint**: production build time and output size
//! - **Security posture**: vulnerability audit, response headers, risky source patterns
//!
//! Every raw measurement is normalized onto a 0-10 scale and combined into a
//! weighted total over only the metrics actually observed, so one broken
//! tool degrades a single column instead of aborting the comparison.
//!
//! ## Quick Start
//!
//! ```no_run
//! use webbench::{run_ranking, ProjectsDoc, WeightsDoc};
//! use std::path::Path;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let weights = WeightsDoc::load(Path::new("config.yaml"))?;
//! let projects = ProjectsDoc::load(Path::new("projects.yaml"))?;
//!
//! for row in run_ranking(&projects.projects, &weights).await {
//!     println!("{}: {:.2}", row.project_name, row.total);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - Per-collector failure isolation: an absent metric is never a zero score
//! - Dev-server lifecycle management with readiness polling and
//!   interrupt-then-kill teardown of the whole process group
//! - Weighted totals renormalized over observed metrics
//! - CLI with table, markdown, and JSON output

mod collectors;
mod config;
mod error;
mod evaluate;
mod rank;
mod report;
mod score;
mod server;

// Re-export public API
pub use config::{MetricWeight, ProjectSpec, ProjectsDoc, WeightsDoc};
pub use error::{BenchError, CollectorError, Result};
pub use evaluate::{evaluate_project, Evaluation};
pub use rank::{run_ranking, run_ranking_with_timeouts, MetricCell, RankedResult};
pub use report::{render_json, render_markdown, render_table};
pub use score::{count_score, normalize, weighted_total, ScoreMap};
