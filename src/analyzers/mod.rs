use crate::core::{Diagnostic, TemporalNode};
use crate::errors::Error;
use anyhow::Result;
use std::path::{Path, PathBuf};

pub mod go;

pub use go::GoExtractor;

/// Everything one source file contributes to the graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileFacts {
    pub path: PathBuf,
    pub package: String,
    pub nodes: Vec<TemporalNode>,
    pub diagnostics: Vec<Diagnostic>,
}

impl FileFacts {
    pub fn new(path: PathBuf, package: String) -> Self {
        Self {
            path,
            package,
            nodes: Vec::new(),
            diagnostics: Vec::new(),
        }
    }
}

/// Turns one file's source into typed facts.
///
/// Implementations never fail on constructs they do not recognize; an `Err` means
/// the file could not be parsed at all.
pub trait PatternExtractor: Send + Sync {
    fn extract(&self, content: &str, path: &Path) -> Result<FileFacts>;
}

/// Read and extract one file. Failures become a diagnostic-only [`FileFacts`].
pub fn extract_file(path: &Path, extractor: &dyn PatternExtractor) -> FileFacts {
    let outcome = std::fs::read_to_string(path)
        .map_err(|e| anyhow::Error::new(Error::io_at(path, e)))
        .and_then(|content| extractor.extract(&content, path));

    match outcome {
        Ok(facts) => facts,
        Err(e) => {
            log::warn!("Skipping {}: {:#}", path.display(), e);
            let mut facts = FileFacts::new(path.to_path_buf(), String::new());
            facts
                .diagnostics
                .push(Diagnostic::new(path, format!("{:#}", e)));
            facts
        }
    }
}
