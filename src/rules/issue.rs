use crate::core::{NodeKind, TemporalNode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Ordinal rank: `Error > Warning > Info`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            other => Err(format!("unknown severity '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Reliability,
    Structural,
    Performance,
    Maintenance,
    TypeSafety,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Reliability => "reliability",
            Category::Structural => "structural",
            Category::Performance => "performance",
            Category::Maintenance => "maintenance",
            Category::TypeSafety => "type-safety",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Replace lines `start_line..end_line` (1-indexed, end exclusive) of `file`.
/// An empty range inserts `new_text` before `start_line`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextReplacement {
    pub file: PathBuf,
    pub start_line: usize,
    pub end_line: usize,
    pub new_text: String,
}

impl TextReplacement {
    pub fn insert_before(file: impl Into<PathBuf>, line: usize, new_text: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            start_line: line,
            end_line: line,
            new_text: new_text.into(),
        }
    }

    pub fn is_insertion(&self) -> bool {
        self.start_line == self.end_line
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeFix {
    pub description: String,
    pub replacements: Vec<TextReplacement>,
}

/// One rule finding anchored to a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub rule_id: String,
    pub rule_name: String,
    pub severity: Severity,
    pub category: Category,
    pub message: String,
    pub rationale: String,
    pub suggestion: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<CodeFix>,
    pub node_name: String,
    pub node_kind: NodeKind,
    pub file: PathBuf,
    pub line: usize,
}

impl Issue {
    /// `file:line`
    pub fn location(&self) -> String {
        format!("{}:{}", self.file.display(), self.line)
    }

    /// Re-anchor the issue on a line other than the node's declaration.
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    pub fn with_fix(mut self, fix: Option<CodeFix>) -> Self {
        self.fix = fix;
        self
    }

    pub(crate) fn anchored(
        rule: super::RuleKind,
        node: &TemporalNode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule.id().to_string(),
            rule_name: rule.name().to_string(),
            severity: rule.default_severity(),
            category: rule.category(),
            message: message.into(),
            rationale: rule.rationale().to_string(),
            suggestion: rule.suggestion().to_string(),
            fix: None,
            node_name: node.name.clone(),
            node_kind: node.kind,
            file: node.file.clone(),
            line: node.line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_order() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }

    #[test]
    fn test_severity_parsing() {
        assert_eq!("WARN".parse::<Severity>(), Ok(Severity::Warning));
        assert_eq!("error".parse::<Severity>(), Ok(Severity::Error));
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn test_category_serializes_kebab_case() {
        let json = serde_json::to_string(&Category::TypeSafety).unwrap();
        assert_eq!(json, "\"type-safety\"");
    }

    #[test]
    fn test_insertion_replacement() {
        let fix = TextReplacement::insert_before("a.go", 12, "x := 1\n");
        assert!(fix.is_insertion());
        assert_eq!(fix.end_line, 12);
    }
}
