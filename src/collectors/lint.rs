//! Static-analysis collector backed by ESLint

use super::run_tool;
use crate::error::CollectorError;
use crate::score::ScoreMap;
use serde::Deserialize;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

/// Per-file entry in ESLint's JSON formatter output. Only the message count
/// matters here.
#[derive(Debug, Deserialize)]
struct EslintFileReport {
    #[serde(default)]
    messages: Vec<serde_json::Value>,
}

/// Run ESLint over the project and score total diagnostics.
///
/// 0 messages scores 10, 50 or more scores 0, linear in between (the
/// (best=0, worst=50) band expressed as `10 - count/5`). The report file is
/// uniquely named and removed whether or not parsing succeeds.
pub async fn collect(root: &Path) -> Result<ScoreMap, CollectorError> {
    let report_name = format!("eslint-{}.json", Uuid::new_v4().simple());
    let report_path = root.join(&report_name);

    // ESLint exits non-zero when it finds problems; the report file is the
    // real success signal.
    let run = run_tool(
        "npx",
        &["eslint", ".", "-f", "json", "-o", &report_name],
        root,
        "eslint",
        "Node/npm not available, `npx` missing",
    )
    .await;

    let contents = std::fs::read_to_string(&report_path);
    let _ = std::fs::remove_file(&report_path);

    run?;
    let contents = contents
        .map_err(|_| CollectorError::output("ESLint did not produce JSON output"))?;
    let files: Vec<EslintFileReport> = serde_json::from_str(&contents)?;
    let count: usize = files.iter().map(|f| f.messages.len()).sum();

    info!("eslint reported {count} diagnostics");

    let mut scores = ScoreMap::new();
    scores.insert_score("code_quality", (10.0 - count as f64 / 5.0).max(0.0));
    scores.insert_raw("code_quality", count as f64);
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eslint_report_parsing() {
        let json = r#"[
            {"filePath": "a.js", "messages": [{"ruleId": "semi"}, {"ruleId": "no-unused-vars"}]},
            {"filePath": "b.js", "messages": []},
            {"filePath": "c.js", "messages": [{"ruleId": "eqeqeq"}]}
        ]"#;
        let files: Vec<EslintFileReport> = serde_json::from_str(json).unwrap();
        let count: usize = files.iter().map(|f| f.messages.len()).sum();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_diagnostic_count_scoring() {
        let score = |count: usize| (10.0 - count as f64 / 5.0).max(0.0);
        assert_eq!(score(0), 10.0);
        assert_eq!(score(5), 9.0);
        assert_eq!(score(50), 0.0);
        assert_eq!(score(400), 0.0);
    }
}
