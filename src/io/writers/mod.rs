pub mod checkstyle;
pub mod dot;
pub mod github;
pub mod json;
pub mod markdown;
pub mod mermaid;
pub mod sarif;
pub mod text;

pub use checkstyle::CheckstyleWriter;
pub use dot::DotWriter;
pub use github::GithubWriter;
pub use json::JsonWriter;
pub use markdown::MarkdownWriter;
pub use mermaid::MermaidWriter;
pub use sarif::SarifWriter;
pub use text::TextWriter;

use std::path::Path;

/// Forward-slash path text, stable across platforms.
pub(crate) fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
