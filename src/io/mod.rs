pub mod output;
pub mod walker;
pub mod writers;

pub use output::{render_graph, render_lint, GraphFormat, GraphWriter, LintFormat, LintWriter};
pub use walker::FileWalker;

use crate::errors::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            return Err(Error::file_system(
                format!("output directory does not exist: {}", parent.display()),
                parent,
            ));
        }
    }
    fs::write(path, content).map_err(|e| Error::io_at(path, e))
}

/// `report.json` + `sarif` -> `report.sarif`; the stem is kept, the extension replaced.
pub fn derived_output_path(base: &Path, extension: &str) -> PathBuf {
    base.with_extension(extension)
}
