//! Code-volume collector: non-empty source lines and file counts

use super::{is_skipped_dir, is_source_file};
use crate::error::CollectorError;
use crate::score::{normalize, ScoreMap};
use std::path::Path;
use tracing::info;
use walkdir::WalkDir;

/// Line count band
const LINES_BAND: (f64, f64) = (500.0, 10_000.0);
/// File count band
const FILES_BAND: (f64, f64) = (10.0, 100.0);

/// Walk the project tree and score source volume.
///
/// Counts non-empty lines and files over the source-extension allowlist,
/// skipping build/dependency/VCS directories. Files that cannot be read or
/// decoded are skipped silently; the walk itself is infallible.
pub async fn collect(root: &Path) -> Result<ScoreMap, CollectorError> {
    let mut lines: u64 = 0;
    let mut files: u64 = 0;

    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
        !(entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .map(is_skipped_dir)
                .unwrap_or(false))
    });

    for entry in walker.filter_map(|entry| entry.ok()) {
        if !entry.file_type().is_file() || !is_source_file(entry.path()) {
            continue;
        }
        let Ok(content) = std::fs::read_to_string(entry.path()) else {
            continue;
        };
        files += 1;
        lines += content.lines().filter(|line| !line.trim().is_empty()).count() as u64;
    }

    info!("code volume: {lines} lines across {files} files");

    let mut scores = ScoreMap::new();
    scores.insert_score("code_volume", normalize(lines as f64, LINES_BAND.0, LINES_BAND.1));
    scores.insert_raw("code_volume", lines as f64);
    scores.insert_score("file_count", normalize(files as f64, FILES_BAND.0, FILES_BAND.1));
    scores.insert_raw("file_count", files as f64);
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_counts_source_lines_and_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/app.ts"), "line1\n\nline2\n  \nline3\n").unwrap();
        fs::write(dir.path().join("src/style.css"), "body {}\n").unwrap();
        // Not on the allowlist
        fs::write(dir.path().join("notes.txt"), "ignored\nignored\n").unwrap();

        let scores = collect(dir.path()).await.unwrap();
        assert_eq!(scores.raw("code_volume"), Some(4.0));
        assert_eq!(scores.raw("file_count"), Some(2.0));
        // Well under both floors: best score.
        assert_eq!(scores.score("code_volume"), Some(10.0));
        assert_eq!(scores.score("file_count"), Some(10.0));
    }

    #[tokio::test]
    async fn test_denylisted_dirs_excluded() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        fs::write(dir.path().join("node_modules/pkg/index.js"), "x\n".repeat(5000)).unwrap();
        fs::create_dir(dir.path().join("dist")).unwrap();
        fs::write(dir.path().join("dist/bundle.js"), "y\n".repeat(5000)).unwrap();
        fs::write(dir.path().join("main.js"), "real\n").unwrap();

        let scores = collect(dir.path()).await.unwrap();
        assert_eq!(scores.raw("code_volume"), Some(1.0));
        assert_eq!(scores.raw("file_count"), Some(1.0));
    }

    #[tokio::test]
    async fn test_undecodable_file_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ok.js"), "fine\n").unwrap();
        fs::write(dir.path().join("bad.js"), [0xff, 0xfe, 0x00, 0xff]).unwrap();

        let scores = collect(dir.path()).await.unwrap();
        assert_eq!(scores.raw("file_count"), Some(1.0));
    }
}
