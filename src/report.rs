//! Ranked-report rendering: console table, markdown, JSON

use crate::error::Result;
use crate::rank::RankedResult;
use chrono::Utc;

/// Column labels for the known metric families. Metrics configured outside
/// this table fall back to their configured name.
const METRIC_LABELS: &[(&str, &str)] = &[
    ("performance", "Perf"),
    ("accessibility", "A11y"),
    ("best_practices", "BestPr"),
    ("seo", "SEO"),
    ("pwa", "PWA"),
    ("code_quality", "Lint"),
    ("build_time", "Build"),
    ("bundle_size", "Bundle"),
    ("code_volume", "Lines"),
    ("file_count", "Files"),
    ("package_dependencies", "Deps"),
    ("security", "Security"),
];

/// Cell shown when a metric was not measured. Distinct from any score so
/// omission is never confused with zero.
const PLACEHOLDER: &str = "-";

fn metric_label(metric: &str) -> &str {
    METRIC_LABELS
        .iter()
        .find(|(name, _)| *name == metric)
        .map(|(_, label)| *label)
        .unwrap_or(metric)
}

/// Format a raw measurement with its unit for display.
fn format_raw(metric: &str, raw: f64) -> String {
    match metric {
        "build_time" => format!("{raw:.1}s"),
        "bundle_size" => format!("{raw:.1}MB"),
        "code_volume" | "file_count" | "package_dependencies" | "code_quality" => {
            format!("{raw:.0}")
        }
        _ => format!("{raw:.1}"),
    }
}

/// One cell: raw value where available, otherwise the score, otherwise the
/// not-measured placeholder.
fn cell_text(metric: &str, score: Option<f64>, raw: Option<f64>) -> String {
    match (raw, score) {
        (Some(raw), _) => format_raw(metric, raw),
        (None, Some(score)) => format!("{score:.2}"),
        (None, None) => PLACEHOLDER.to_string(),
    }
}

/// Render the ranked results as an aligned console table.
pub fn render_table(results: &[RankedResult], metric_names: &[String]) -> String {
    let mut headers = vec!["Project".to_string()];
    headers.extend(metric_names.iter().map(|m| metric_label(m).to_string()));
    headers.push("TOTAL".to_string());

    let rows: Vec<Vec<String>> = results.iter().map(row_cells).collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &headers, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rule, &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn row_cells(result: &RankedResult) -> Vec<String> {
    let mut row = vec![result.project_name.clone()];
    row.extend(
        result
            .cells
            .iter()
            .map(|cell| cell_text(&cell.metric, cell.score, cell.raw)),
    );
    row.push(format!("{:.2}", result.total));
    row
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        out.push_str(&format!("{cell:>width$}", width = widths[i]));
    }
    out.push('\n');
}

/// Render the ranking as a markdown document.
pub fn render_markdown(results: &[RankedResult], metric_names: &[String]) -> String {
    let mut md = String::new();
    md.push_str("# Web Project Benchmark\n\n");
    md.push_str(&format!("**Generated:** {}\n\n", Utc::now().to_rfc3339()));

    md.push_str("| Project |");
    for metric in metric_names {
        md.push_str(&format!(" {} |", metric_label(metric)));
    }
    md.push_str(" TOTAL |\n|");
    for _ in 0..metric_names.len() + 2 {
        md.push_str("---|");
    }
    md.push('\n');

    for result in results {
        md.push_str(&format!("| {} |", result.project_name));
        for cell in &result.cells {
            md.push_str(&format!(" {} |", cell_text(&cell.metric, cell.score, cell.raw)));
        }
        md.push_str(&format!(" {:.2} |\n", result.total));
    }

    let warned: Vec<&RankedResult> = results.iter().filter(|r| !r.warnings.is_empty()).collect();
    if !warned.is_empty() {
        md.push_str("\n## Warnings\n\n");
        for result in warned {
            for warning in &result.warnings {
                md.push_str(&format!("- **{}**: {}\n", result.project_name, warning));
            }
        }
    }

    md
}

/// Serialize the ranking to pretty JSON.
pub fn render_json(results: &[RankedResult]) -> Result<String> {
    Ok(serde_json::to_string_pretty(results)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::MetricCell;

    fn result(name: &str, cells: Vec<MetricCell>, total: f64) -> RankedResult {
        RankedResult {
            project_name: name.to_string(),
            cells,
            total,
            warnings: Vec::new(),
        }
    }

    fn cell(metric: &str, score: Option<f64>, raw: Option<f64>) -> MetricCell {
        MetricCell {
            metric: metric.to_string(),
            score,
            raw,
        }
    }

    #[test]
    fn test_cell_prefers_raw_then_score_then_placeholder() {
        assert_eq!(cell_text("build_time", Some(9.0), Some(7.25)), "7.2s");
        assert_eq!(cell_text("seo", Some(8.5), None), "8.50");
        assert_eq!(cell_text("seo", None, None), "-");
    }

    #[test]
    fn test_format_raw_units() {
        assert_eq!(format_raw("bundle_size", 18.44), "18.4MB");
        assert_eq!(format_raw("package_dependencies", 72.0), "72");
        assert_eq!(format_raw("code_quality", 14.0), "14");
    }

    #[test]
    fn test_table_marks_unmeasured_cells() {
        let metrics = vec!["performance".to_string(), "security".to_string()];
        let results = vec![result(
            "app",
            vec![
                cell("performance", None, None),
                cell("security", Some(8.5), None),
            ],
            8.5,
        )];

        let table = render_table(&results, &metrics);
        let data_row = table.lines().nth(2).unwrap();
        assert!(data_row.contains("app"));
        assert!(data_row.contains('-'));
        assert!(data_row.contains("8.50"));
        assert!(table.lines().next().unwrap().contains("TOTAL"));
    }

    #[test]
    fn test_markdown_contains_rows_and_warnings() {
        let metrics = vec!["security".to_string()];
        let mut ranked = result("app", vec![cell("security", Some(10.0), None)], 10.0);
        ranked.warnings.push("security: something odd".to_string());

        let md = render_markdown(&[ranked], &metrics);
        assert!(md.contains("| app |"));
        assert!(md.contains("## Warnings"));
        assert!(md.contains("something odd"));
    }

    #[test]
    fn test_json_round_trips_totals() {
        let metrics = result("app", vec![], 3.25);
        let json = render_json(&[metrics]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["project_name"], "app");
        assert_eq!(parsed[0]["total"], 3.25);
    }
}
