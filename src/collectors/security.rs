//! Security-posture collector
//!
//! Composes three independent sub-checks, each deducting from a 10.0
//! baseline: the dependency vulnerability audit, the response-header
//! checklist, and the risk-pattern source scan. A sub-check that cannot run
//! contributes a small fixed penalty and an issue note instead of failing
//! the collector.

use super::{is_skipped_dir, is_source_file, run_tool};
use crate::error::CollectorError;
use crate::score::ScoreMap;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Penalty cap for the vulnerability audit
const VULN_PENALTY_CAP: f64 = 4.0;
/// Penalty cap for missing security headers
const HEADER_PENALTY_CAP: f64 = 2.0;
/// Penalty cap for risk-pattern matches
const PATTERN_PENALTY_CAP: f64 = 3.0;

/// Fixed penalty when the vulnerability audit itself fails to run
const VULN_FAILURE_PENALTY: f64 = 1.0;
/// Fixed penalty when the header probe cannot run (no URL or request error)
const HEADER_FAILURE_PENALTY: f64 = 0.5;
/// Fixed penalty when the source scan fails
const SCAN_FAILURE_PENALTY: f64 = 0.5;

/// Recommended HTTP security response headers checked against the live URL
const HEADER_CHECKLIST: &[&str] = &[
    "content-security-policy",
    "strict-transport-security",
    "x-content-type-options",
    "x-frame-options",
    "referrer-policy",
    "permissions-policy",
];

/// Result of the security collector: one `security` score plus
/// human-readable issue notes for the operator.
#[derive(Debug)]
pub struct SecurityPosture {
    pub scores: ScoreMap,
    pub issues: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct NpmAuditReport {
    metadata: AuditMetadata,
}

#[derive(Debug, Deserialize)]
struct AuditMetadata {
    vulnerabilities: VulnCounts,
}

#[derive(Debug, Default, Deserialize)]
struct VulnCounts {
    #[serde(default)]
    critical: u32,
    #[serde(default)]
    high: u32,
    #[serde(default)]
    moderate: u32,
}

/// Assess the project's security posture.
pub async fn collect(root: &Path, live_url: Option<&str>) -> Result<SecurityPosture, CollectorError> {
    let mut issues = Vec::new();
    let mut penalty = 0.0;

    match audit_vulnerabilities(root).await {
        Ok(counts) => {
            let p = vuln_penalty(&counts);
            if p > 0.0 {
                issues.push(format!(
                    "npm audit: {} critical, {} high, {} moderate",
                    counts.critical, counts.high, counts.moderate
                ));
            }
            penalty += p;
        }
        Err(e) => {
            issues.push(format!("vulnerability audit unavailable: {e}"));
            penalty += VULN_FAILURE_PENALTY;
        }
    }

    match check_headers(live_url).await {
        Ok(missing) => {
            if !missing.is_empty() {
                issues.push(format!("missing security headers: {}", missing.join(", ")));
            }
            penalty += header_penalty(missing.len());
        }
        Err(e) => {
            issues.push(format!("header check unavailable: {e}"));
            penalty += HEADER_FAILURE_PENALTY;
        }
    }

    match scan_sources(root) {
        Ok(matches) => {
            if matches > 0 {
                issues.push(format!("{matches} risky source pattern(s) found"));
            }
            penalty += pattern_penalty(matches);
        }
        Err(e) => {
            issues.push(format!("source scan unavailable: {e}"));
            penalty += SCAN_FAILURE_PENALTY;
        }
    }

    let score = (10.0 - penalty).clamp(0.0, 10.0);
    info!("security posture {score:.1}/10 ({} issue(s))", issues.len());

    let mut scores = ScoreMap::new();
    scores.insert_score("security", score);
    Ok(SecurityPosture { scores, issues })
}

/// Run `npm audit --json` and read the vulnerability counts.
///
/// npm audit exits non-zero whenever it finds anything, so only unusable
/// output counts as failure.
async fn audit_vulnerabilities(root: &Path) -> Result<VulnCounts, CollectorError> {
    let output = run_tool(
        "npm",
        &["audit", "--json"],
        root,
        "npm audit",
        "Node/npm not available",
    )
    .await?;

    let report: NpmAuditReport = serde_json::from_str(&output.stdout)
        .map_err(|_| CollectorError::output("npm audit did not emit parseable JSON"))?;
    Ok(report.metadata.vulnerabilities)
}

fn vuln_penalty(counts: &VulnCounts) -> f64 {
    let raw = 3.0 * counts.critical as f64 + 2.0 * counts.high as f64 + 0.5 * counts.moderate as f64;
    raw.min(VULN_PENALTY_CAP)
}

/// Probe the live URL and list which recommended headers are absent.
async fn check_headers(live_url: Option<&str>) -> Result<Vec<String>, CollectorError> {
    let url = live_url.ok_or_else(|| CollectorError::NoLiveUrl {
        tool: "header check".to_string(),
    })?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;
    let response = client.get(url).send().await?;
    let headers = response.headers();

    let missing = HEADER_CHECKLIST
        .iter()
        .filter(|name| !headers.contains_key(**name))
        .map(|name| name.to_string())
        .collect();
    Ok(missing)
}

fn header_penalty(missing: usize) -> f64 {
    (0.3 * missing as f64).min(HEADER_PENALTY_CAP)
}

/// Risk patterns scanned for in allowlisted source files: hardcoded
/// credentials, unsafe HTML injection, dynamic code evaluation, and unsafe
/// DOM writes.
fn risk_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r#"(?i)(api[_-]?key|secret|token|password)\s*[:=]\s*["'][A-Za-z0-9+/_\-]{8,}["']"#,
            r"dangerouslySetInnerHTML|\.innerHTML\s*=",
            r"\beval\s*\(|new\s+Function\s*\(",
            r"document\.write\s*\(",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("risk pattern is a valid regex"))
        .collect()
    })
}

/// Count risk-pattern matches across the project's source files.
/// Unreadable files are skipped; an unwalkable root is an error.
fn scan_sources(root: &Path) -> Result<usize, CollectorError> {
    let mut matches = 0;

    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
        !(entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .map(is_skipped_dir)
                .unwrap_or(false))
    });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            // Depth 0 is the project root itself: missing or unreadable
            // means there is nothing meaningful to scan. Errors deeper in
            // the tree are skipped like unreadable files.
            Err(err) if err.depth() == 0 => {
                return Err(CollectorError::failed("source scan", err.to_string()))
            }
            Err(_) => continue,
        };
        if !entry.file_type().is_file() || !is_source_file(entry.path()) {
            continue;
        }
        let Ok(content) = std::fs::read_to_string(entry.path()) else {
            continue;
        };
        for pattern in risk_patterns() {
            let found = pattern.find_iter(&content).count();
            if found > 0 {
                debug!(
                    "{}: {found} match(es) for /{pattern}/",
                    entry.path().display()
                );
            }
            matches += found;
        }
    }

    Ok(matches)
}

fn pattern_penalty(matches: usize) -> f64 {
    (0.5 * matches as f64).min(PATTERN_PENALTY_CAP)
}
