//! Build performance collector: wall-clock build time and output size

use super::run_shell;
use crate::config::ProjectSpec;
use crate::error::CollectorError;
use crate::score::{normalize, ScoreMap};
use std::path::Path;
use std::time::Instant;
use tracing::info;
use walkdir::WalkDir;

/// Build time band, seconds
const BUILD_TIME_BAND: (f64, f64) = (5.0, 60.0);
/// Bundle size band, megabytes
const BUNDLE_SIZE_BAND: (f64, f64) = (1.0, 50.0);

const BYTES_PER_MB: f64 = 1_048_576.0;

/// Run the production build, timing it and sizing the declared output
/// folder.
///
/// Produces `build_time` and `bundle_size`. A non-zero build exit or a
/// missing output folder fails this collector only.
pub async fn collect(root: &Path, project: &ProjectSpec) -> Result<ScoreMap, CollectorError> {
    let command = project.build_command();

    let started = Instant::now();
    let output = run_shell(command, root, "build").await?;
    let secs = started.elapsed().as_secs_f64();

    if !output.success() {
        let tail = output
            .stderr
            .lines()
            .last()
            .unwrap_or("no output")
            .to_string();
        return Err(CollectorError::failed(
            "build",
            format!(
                "'{command}' exited with status {}: {tail}",
                output.status.unwrap_or(-1)
            ),
        ));
    }

    let dist = root.join(project.dist_folder());
    if !dist.is_dir() {
        return Err(CollectorError::output(format!(
            "output folder '{}' not found after build",
            project.dist_folder()
        )));
    }

    let mb = dir_size_bytes(&dist) as f64 / BYTES_PER_MB;
    info!(
        "build finished in {secs:.1}s, {} is {mb:.2} MB",
        project.dist_folder()
    );

    let mut scores = ScoreMap::new();
    scores.insert_score("build_time", normalize(secs, BUILD_TIME_BAND.0, BUILD_TIME_BAND.1));
    scores.insert_raw("build_time", secs);
    scores.insert_score("bundle_size", normalize(mb, BUNDLE_SIZE_BAND.0, BUNDLE_SIZE_BAND.1));
    scores.insert_raw("bundle_size", mb);
    Ok(scores)
}

/// Total recursive byte size of a directory. Unreadable entries are skipped.
fn dir_size_bytes(dir: &Path) -> u64 {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|meta| meta.len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_dir_size_bytes() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.js"), vec![0u8; 1000]).unwrap();
        fs::create_dir(dir.path().join("assets")).unwrap();
        fs::write(dir.path().join("assets/b.css"), vec![0u8; 500]).unwrap();

        assert_eq!(dir_size_bytes(dir.path()), 1500);
    }

    #[tokio::test]
    async fn test_collect_scores_fast_tiny_build() {
        let dir = tempfile::tempdir().unwrap();
        let project = ProjectSpec {
            name: "fixture".to_string(),
            path: dir.path().to_path_buf(),
            serve_command: None,
            serve_url: None,
            build_command: Some("mkdir -p dist && echo bundle > dist/app.js".to_string()),
            dist_folder: None,
        };

        let scores = collect(dir.path(), &project).await.unwrap();
        // Instant build, tiny output: both metrics at the best end.
        assert_eq!(scores.score("build_time"), Some(10.0));
        assert_eq!(scores.score("bundle_size"), Some(10.0));
        assert!(scores.raw("build_time").unwrap() < 5.0);
    }

    #[tokio::test]
    async fn test_collect_nonzero_exit_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let project = ProjectSpec {
            name: "fixture".to_string(),
            path: dir.path().to_path_buf(),
            serve_command: None,
            serve_url: None,
            build_command: Some("exit 2".to_string()),
            dist_folder: None,
        };

        let err = collect(dir.path(), &project).await.unwrap_err();
        assert!(matches!(err, CollectorError::ToolFailed { .. }));
    }

    #[tokio::test]
    async fn test_collect_missing_dist_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let project = ProjectSpec {
            name: "fixture".to_string(),
            path: dir.path().to_path_buf(),
            serve_command: None,
            serve_url: None,
            build_command: Some("true".to_string()),
            dist_folder: Some("dist".to_string()),
        };

        let err = collect(dir.path(), &project).await.unwrap_err();
        assert!(matches!(err, CollectorError::Output(_)));
    }
}
