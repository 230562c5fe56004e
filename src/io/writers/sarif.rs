//! SARIF 2.1.0 log for code-scanning dashboards.

use crate::io::output::LintWriter;
use crate::rules::{CodeFix, Issue, LintResult, RuleKind, Severity};
use serde::Serialize;
use std::io::Write;

const SARIF_SCHEMA: &str = "https://json.schemastore.org/sarif-2.1.0.json";
const SARIF_VERSION: &str = "2.1.0";

#[derive(Serialize)]
struct SarifLog {
    #[serde(rename = "$schema")]
    schema: &'static str,
    version: &'static str,
    runs: Vec<Run>,
}

#[derive(Serialize)]
struct Run {
    tool: Tool,
    results: Vec<SarifResult>,
}

#[derive(Serialize)]
struct Tool {
    driver: Driver,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Driver {
    name: &'static str,
    version: &'static str,
    rules: Vec<ReportingDescriptor>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportingDescriptor {
    id: &'static str,
    name: &'static str,
    short_description: Message,
    full_description: Message,
    help: Message,
    default_configuration: Configuration,
    properties: RuleProperties,
}

#[derive(Serialize)]
struct Configuration {
    level: &'static str,
}

#[derive(Serialize)]
struct RuleProperties {
    category: &'static str,
}

#[derive(Serialize)]
struct Message {
    text: String,
}

impl Message {
    fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifResult {
    rule_id: String,
    rule_index: usize,
    level: &'static str,
    message: Message,
    locations: Vec<Location>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fixes: Vec<Fix>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Location {
    physical_location: PhysicalLocation,
    logical_locations: Vec<LogicalLocation>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PhysicalLocation {
    artifact_location: ArtifactLocation,
    region: Region,
}

#[derive(Serialize)]
struct ArtifactLocation {
    uri: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Region {
    start_line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_column: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_column: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LogicalLocation {
    name: String,
    kind: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Fix {
    description: Message,
    artifact_changes: Vec<ArtifactChange>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactChange {
    artifact_location: ArtifactLocation,
    replacements: Vec<Replacement>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Replacement {
    deleted_region: Region,
    inserted_content: Message,
}

fn level_for(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "note",
    }
}

fn descriptor(rule: RuleKind) -> ReportingDescriptor {
    ReportingDescriptor {
        id: rule.id(),
        name: rule.name(),
        short_description: Message::new(rule.name()),
        full_description: Message::new(rule.rationale()),
        help: Message::new(rule.suggestion()),
        default_configuration: Configuration {
            level: level_for(rule.default_severity()),
        },
        properties: RuleProperties {
            category: rule.category().as_str(),
        },
    }
}

/// Whole-line regions: `end_line` is exclusive, so line `n` up to column 1 of `end`.
fn fix_of(fix: &CodeFix) -> Fix {
    Fix {
        description: Message::new(fix.description.clone()),
        artifact_changes: fix
            .replacements
            .iter()
            .map(|r| ArtifactChange {
                artifact_location: ArtifactLocation {
                    uri: super::display_path(&r.file),
                },
                replacements: vec![Replacement {
                    deleted_region: Region {
                        start_line: r.start_line,
                        start_column: Some(1),
                        end_line: Some(r.end_line),
                        end_column: Some(1),
                    },
                    inserted_content: Message::new(r.new_text.clone()),
                }],
            })
            .collect(),
    }
}

fn result_of(issue: &Issue) -> SarifResult {
    let rule_index = RuleKind::ALL
        .iter()
        .position(|rule| rule.id() == issue.rule_id)
        .unwrap_or(0);
    SarifResult {
        rule_id: issue.rule_id.clone(),
        rule_index,
        level: level_for(issue.severity),
        message: Message::new(format!("{}: {}", issue.node_name, issue.message)),
        locations: vec![Location {
            physical_location: PhysicalLocation {
                artifact_location: ArtifactLocation {
                    uri: super::display_path(&issue.file),
                },
                region: Region {
                    start_line: issue.line.max(1),
                    start_column: None,
                    end_line: None,
                    end_column: None,
                },
            },
            logical_locations: vec![LogicalLocation {
                name: issue.node_name.clone(),
                kind: "function",
            }],
        }],
        fixes: issue.fix.iter().map(fix_of).collect(),
    }
}

pub struct SarifWriter<W: Write> {
    writer: W,
}

impl<W: Write> SarifWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> LintWriter for SarifWriter<W> {
    fn write_lint(&mut self, result: &LintResult) -> anyhow::Result<()> {
        let log = SarifLog {
            schema: SARIF_SCHEMA,
            version: SARIF_VERSION,
            runs: vec![Run {
                tool: Tool {
                    driver: Driver {
                        name: env!("CARGO_PKG_NAME"),
                        version: env!("CARGO_PKG_VERSION"),
                        rules: RuleKind::ALL.into_iter().map(descriptor).collect(),
                    },
                },
                results: result.issues.iter().map(result_of).collect(),
            }],
        };
        let json = serde_json::to_string_pretty(&log)?;
        self.writer.write_all(json.as_bytes())?;
        writeln!(self.writer)?;
        Ok(())
    }
}
