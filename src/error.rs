//! Error types for the benchmark run

use thiserror::Error;

/// Result type alias for fatal benchmark operations
pub type Result<T> = std::result::Result<T, BenchError>;

/// Fatal errors. Only configuration problems abort a run; everything that
/// happens after configuration loads degrades to an absent metric or an
/// empty project result instead.
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl BenchError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

/// Errors isolated to a single metric collector.
///
/// A collector returning one of these means "this metric category is absent
/// for this project": the evaluator logs a warning and moves on to the next
/// collector. Nothing here ever propagates past the evaluator.
#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("{tool} is not installed ({hint})")]
    ToolMissing { tool: String, hint: String },

    #[error("{tool} failed: {detail}")]
    ToolFailed { tool: String, detail: String },

    #[error("no live URL for this project; {tool} needs a running server")]
    NoLiveUrl { tool: String },

    #[error("{0}")]
    Output(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

impl CollectorError {
    /// Create a tool-missing error
    pub fn missing(tool: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::ToolMissing {
            tool: tool.into(),
            hint: hint.into(),
        }
    }

    /// Create a tool-failure error
    pub fn failed(tool: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            detail: detail.into(),
        }
    }

    /// Create an unusable-output error
    pub fn output(msg: impl Into<String>) -> Self {
        Self::Output(msg.into())
    }
}
