//! Export formats for the graph and for lint results.
//!
//! Every renderer is a pure function of its input: no timestamps, no absolute
//! environment data, and all collections iterate in sorted order.

use super::writers::{
    CheckstyleWriter, DotWriter, GithubWriter, JsonWriter, MarkdownWriter, MermaidWriter,
    SarifWriter, TextWriter,
};
use crate::core::TemporalGraph;
use crate::rules::LintResult;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphFormat {
    Json,
    Dot,
    Mermaid,
    Markdown,
    /// Interactive terminal browser; not a file format.
    Tui,
}

impl GraphFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            GraphFormat::Json => "json",
            GraphFormat::Dot => "dot",
            GraphFormat::Mermaid => "mmd",
            GraphFormat::Markdown => "md",
            GraphFormat::Tui => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LintFormat {
    Text,
    Json,
    Github,
    Sarif,
    Checkstyle,
}

impl LintFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            LintFormat::Text => "txt",
            LintFormat::Json => "json",
            LintFormat::Github => "github.txt",
            LintFormat::Sarif => "sarif",
            LintFormat::Checkstyle => "xml",
        }
    }

    /// Drops repeats while keeping first-mention order.
    pub fn dedup(formats: &[LintFormat]) -> Vec<LintFormat> {
        let mut unique = Vec::with_capacity(formats.len());
        for format in formats {
            if !unique.contains(format) {
                unique.push(*format);
            }
        }
        unique
    }
}

pub trait GraphWriter {
    fn write_graph(&mut self, graph: &TemporalGraph) -> anyhow::Result<()>;
}

pub trait LintWriter {
    fn write_lint(&mut self, result: &LintResult) -> anyhow::Result<()>;
}

pub fn render_graph(format: GraphFormat, graph: &TemporalGraph) -> anyhow::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    match format {
        GraphFormat::Json => JsonWriter::new(&mut buffer).write_graph(graph)?,
        GraphFormat::Dot => DotWriter::new(&mut buffer).write_graph(graph)?,
        GraphFormat::Mermaid => MermaidWriter::new(&mut buffer).write_graph(graph)?,
        GraphFormat::Markdown => MarkdownWriter::new(&mut buffer).write_graph(graph)?,
        GraphFormat::Tui => anyhow::bail!("the interactive browser cannot be rendered to bytes"),
    }
    Ok(buffer)
}

/// `use_color` only affects the text format.
pub fn render_lint(format: LintFormat, result: &LintResult, use_color: bool) -> anyhow::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    match format {
        LintFormat::Text => TextWriter::new(&mut buffer, use_color).write_lint(result)?,
        LintFormat::Json => JsonWriter::new(&mut buffer).write_lint(result)?,
        LintFormat::Github => GithubWriter::new(&mut buffer).write_lint(result)?,
        LintFormat::Sarif => SarifWriter::new(&mut buffer).write_lint(result)?,
        LintFormat::Checkstyle => CheckstyleWriter::new(&mut buffer).write_lint(result)?,
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_keeps_first_mention_order() {
        let formats = [LintFormat::Sarif, LintFormat::Text, LintFormat::Sarif];
        assert_eq!(
            LintFormat::dedup(&formats),
            vec![LintFormat::Sarif, LintFormat::Text]
        );
    }

    #[test]
    fn test_tui_is_not_renderable() {
        assert!(render_graph(GraphFormat::Tui, &TemporalGraph::default()).is_err());
    }
}
