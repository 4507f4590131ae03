//! Error types for document set persistence.

use bench_generator::GeneratorError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while saving, loading, or generating a docset.
#[derive(Error, Debug)]
pub enum DocsetError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// A line in the documents file is not a valid document.
    #[error("Invalid document at {path}:{line}: {source}")]
    InvalidDocument {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Document generation failed.
    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),

    /// The schema has no corpus size yet.
    #[error("Schema for docset '{0}' has no document count; call set_num_docs first")]
    NotConfigured(String),

    /// A saved docset is missing its documents file.
    #[error("No saved documents at {0}")]
    MissingDocs(PathBuf),
}
