//! Error types for tempograph operations.
//!
//! Source errors (one file failing to parse) never surface here: they are collected
//! as [`crate::core::Diagnostic`]s and the scan continues. This type covers the
//! failures that stop a run: unreadable roots, bad configuration, unwritable output.

use std::path::PathBuf;
use thiserror::Error;

/// Process exit code for a clean run.
pub const EXIT_OK: i32 = 0;
/// Process exit code when findings exceed the configured failure bar.
pub const EXIT_FINDINGS: i32 = 1;
/// Process exit code when extraction, configuration or I/O prevented analysis.
pub const EXIT_ERROR: i32 = 2;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File system error: {message}")]
    FileSystem {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Parse error in {file}: {message}")]
    Parse { file: PathBuf, message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Output error: {0}")]
    Output(String),

    #[error("Enhancement service error: {0}")]
    Enhancement(String),

    #[error("Analysis cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Pattern(#[from] glob::PatternError),

    #[error(transparent)]
    Regex(#[from] regex::Error),
}

impl Error {
    pub fn file_system(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::FileSystem {
            message: message.into(),
            path: Some(path.into()),
            source: None,
        }
    }

    pub fn io_at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        Self::FileSystem {
            message: format!("{}: {}", path.display(), source),
            path: Some(path),
            source: Some(source),
        }
    }

    pub fn parse(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Every error that reaches the process boundary maps to the I/O/config code.
    pub fn exit_code(&self) -> i32 {
        EXIT_ERROR
    }
}

pub type Result<T> = std::result::Result<T, Error>;
