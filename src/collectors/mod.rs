//! Metric collectors
//!
//! Each collector is an independently-failing unit: it takes the project
//! root (and a live URL where one exists) and returns a partial [`ScoreMap`]
//! or a [`CollectorError`]. A collector's failure never reaches past the
//! evaluator; the affected metric category is simply absent for that
//! project.

pub mod build;
pub mod deps;
pub mod lighthouse;
pub mod lint;
pub mod security;
pub mod volume;

use crate::error::CollectorError;
use std::path::Path;
use std::process::Stdio;
use tracing::debug;

/// Directory names excluded from every project-tree walk.
///
/// Build output, dependency trees, VCS internals, and framework caches are
/// not the project's own source.
pub(crate) const SKIP_DIRS: &[&str] = &[
    "node_modules",
    "dist",
    "build",
    ".git",
    ".next",
    ".nuxt",
    ".svelte-kit",
    ".output",
    ".cache",
    "coverage",
    "out",
    "vendor",
];

/// Source-like extensions counted by the volume walk and scanned for risk
/// patterns.
pub(crate) const SOURCE_EXTENSIONS: &[&str] = &[
    "js", "jsx", "ts", "tsx", "mjs", "cjs", "vue", "svelte", "html", "css", "scss",
];

/// Whether a walk should descend into / count this entry.
pub(crate) fn is_skipped_dir(name: &str) -> bool {
    SKIP_DIRS.contains(&name)
}

/// Whether a file path carries one of the source-like extensions.
pub(crate) fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SOURCE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Captured output of an external tool invocation
#[derive(Debug)]
pub struct ToolOutput {
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Run a program with arguments, capturing output.
///
/// A spawn failure with `NotFound` becomes [`CollectorError::ToolMissing`]
/// with an install hint; any other spawn or wait failure surfaces as a
/// collector IO error.
pub(crate) async fn run_tool(
    program: &str,
    args: &[&str],
    cwd: &Path,
    tool: &str,
    hint: &str,
) -> Result<ToolOutput, CollectorError> {
    debug!("running {tool}: {program} {args:?} in {}", cwd.display());

    let output = tokio::process::Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CollectorError::missing(tool, hint)
            } else {
                CollectorError::Io(e)
            }
        })?;

    Ok(ToolOutput {
        status: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Run a shell-level command string through `sh -c` in `cwd`.
///
/// Build and serve commands are configured as shell strings, matching how
/// package scripts are documented.
pub(crate) async fn run_shell(
    command: &str,
    cwd: &Path,
    tool: &str,
) -> Result<ToolOutput, CollectorError> {
    run_tool("sh", &["-c", command], cwd, tool, "a POSIX shell is required").await
}
