use crate::rules::{Issue, SourceContext};

pub const VERIFY_SYSTEM_PROMPT: &str = r#"You review findings from a static analyzer for Temporal Go workflows.
Decide whether the finding is a real problem in the code shown.

Respond with a JSON object only:
{
    "valid": true,
    "confidence": 0.0,
    "reason": "One sentence explaining the decision.",
    "suggestion": "A concrete, code-specific remediation, or null."
}
"#;

pub const FIX_SYSTEM_PROMPT: &str = r#"You write minimal Go fixes for findings from a static analyzer for Temporal workflows.
Follow the conventions already used in the codebase where they are listed.

Respond with a JSON object only:
{
    "code": "Go statements to insert before the flagged line.",
    "explanation": "One sentence describing the fix.",
    "imports": ["import paths the code needs"]
}
"#;

fn describe_issue(issue: &Issue) -> String {
    format!(
        "Rule: {} ({})\nSeverity: {}\nNode: {} ({})\nLocation: {}\nMessage: {}\nRationale: {}",
        issue.rule_id,
        issue.rule_name,
        issue.severity,
        issue.node_name,
        issue.node_kind,
        issue.location(),
        issue.message,
        issue.rationale
    )
}

pub fn verify_prompt(issue: &Issue, context: &SourceContext) -> String {
    format!(
        "{}\n\nCode:\n```go\n{}\n```",
        describe_issue(issue),
        context.render()
    )
}

pub fn fix_prompt(issue: &Issue, context: &SourceContext, observed_patterns: &[String]) -> String {
    let conventions = if observed_patterns.is_empty() {
        "(none observed)".to_string()
    } else {
        observed_patterns
            .iter()
            .map(|p| format!("- {}", p))
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!(
        "{}\nCurrent suggestion: {}\n\nConventions in this codebase:\n{}\n\nCode:\n```go\n{}\n```",
        describe_issue(issue),
        issue.suggestion,
        conventions,
        context.render()
    )
}
