//! Workflow/activity classification of function declarations.
//!
//! A name-pattern match always wins; the context-type check on the first
//! non-receiver parameter is only consulted when no name pattern matches.

use super::DEFAULT_WORKFLOW_ALIAS;
use crate::config::ExtractionConfig;
use crate::core::NodeKind;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct Classifier {
    workflow_names: Vec<Regex>,
    activity_names: Vec<Regex>,
    workflow_context_types: Vec<String>,
    activity_context_types: Vec<String>,
}

impl Classifier {
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            workflow_names: compile_all(&config.workflow_name_patterns)?,
            activity_names: compile_all(&config.activity_name_patterns)?,
            workflow_context_types: normalize_all(&config.workflow_context_types),
            activity_context_types: normalize_all(&config.activity_context_types),
        })
    }

    pub fn classify(&self, name: &str, first_param_type: Option<&str>) -> Option<NodeKind> {
        self.classify_by_name(name)
            .or_else(|| first_param_type.and_then(|t| self.classify_by_signature(t)))
    }

    fn classify_by_name(&self, name: &str) -> Option<NodeKind> {
        if self.workflow_names.iter().any(|re| re.is_match(name)) {
            Some(NodeKind::Workflow)
        } else if self.activity_names.iter().any(|re| re.is_match(name)) {
            Some(NodeKind::Activity)
        } else {
            None
        }
    }

    fn classify_by_signature(&self, type_text: &str) -> Option<NodeKind> {
        let type_text = normalize(type_text);
        if self.workflow_context_types.contains(&type_text) {
            Some(NodeKind::Workflow)
        } else if self.activity_context_types.contains(&type_text) {
            Some(NodeKind::Activity)
        } else {
            None
        }
    }

    /// Whether a parameter type is one of the framework-supplied context types.
    pub fn is_context_type(&self, type_text: &str) -> bool {
        let type_text = normalize(type_text);
        self.workflow_context_types.contains(&type_text)
            || self.activity_context_types.contains(&type_text)
    }
}

static DEFAULT_CLASSIFIER: Lazy<Classifier> = Lazy::new(|| {
    Classifier::from_config(&ExtractionConfig::default()).unwrap_or_else(|e| {
        log::error!("Default classification patterns failed to compile: {}", e);
        Classifier {
            workflow_names: Vec::new(),
            activity_names: Vec::new(),
            workflow_context_types: Vec::new(),
            activity_context_types: Vec::new(),
        }
    })
});

impl Default for Classifier {
    fn default() -> Self {
        DEFAULT_CLASSIFIER.clone()
    }
}

fn compile_all(patterns: &[String]) -> Result<Vec<Regex>, regex::Error> {
    patterns.iter().map(|p| Regex::new(p)).collect()
}

fn normalize_all(types: &[String]) -> Vec<String> {
    types.iter().map(|t| normalize(t)).collect()
}

fn normalize(type_text: &str) -> String {
    type_text.split_whitespace().collect()
}

/// Rewrites an aliased workflow qualifier, `wf.Context` under
/// `import wf "go.temporal.io/sdk/workflow"`, to `workflow.Context`.
pub fn canonical_type(type_text: &str, workflow_aliases: &HashSet<String>) -> String {
    let normalized = normalize(type_text);
    match normalized.split_once('.') {
        Some((qualifier, member))
            if qualifier != DEFAULT_WORKFLOW_ALIAS && workflow_aliases.contains(qualifier) =>
        {
            format!("{}.{}", DEFAULT_WORKFLOW_ALIAS, member)
        }
        _ => normalized,
    }
}
