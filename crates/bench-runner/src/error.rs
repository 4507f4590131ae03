//! Error types for benchmark runs.

use bench_docset::DocsetError;
use thiserror::Error;

/// Errors that can occur while indexing, searching, or reporting.
#[derive(Error, Debug)]
pub enum RunnerError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The engine answered with a failure status.
    #[error("Search engine returned status {status}: {message}")]
    Engine { status: u16, message: String },

    /// The engine's response lacks a field the runner needs.
    #[error("Search engine response is missing '{0}'")]
    MissingField(&'static str),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading documents failed.
    #[error("Docset error: {0}")]
    Docset(#[from] DocsetError),

    #[error("Batch size must be at least 1")]
    InvalidBatchSize,

    /// No repetition would be counted.
    #[error("Invalid repetitions: rep_n={rep_n} must be greater than ignore_n={ignore_n}")]
    InvalidRepetitions { rep_n: usize, ignore_n: usize },

    /// A report group names a label with no search stats.
    #[error("No search stats recorded under label '{0}'")]
    UnknownLabel(String),
}
