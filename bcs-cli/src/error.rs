//! Error types emitted by the `bcsbuffer` CLI.

use std::path::PathBuf;

use thiserror::Error;

use bcs_core::{PolicyError, StoreError};

/// Errors emitted by the `bcsbuffer` CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist or is not a file")]
    MissingSourceFile {
        field: &'static str,
        path: PathBuf,
    },
    /// Opening a reference table or survey export failed.
    #[error("failed to open {path:?}: {source}")]
    OpenInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A reference table or survey export could not be decoded.
    #[error("failed to parse JSON in {path:?}: {source}")]
    ParseInput {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The processing date could not be parsed.
    #[error("invalid --as-of date {text:?} (expected YYYY-MM-DD): {source}")]
    InvalidAsOfDate {
        text: String,
        #[source]
        source: chrono::ParseError,
    },
    /// The buffer policy failed structural validation.
    #[error("invalid buffer policy: {0}")]
    InvalidPolicy(#[from] PolicyError),
    /// Loading records or writing requests through the store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
