pub mod cancel;
pub mod graph;

pub use cancel::CancellationToken;
pub use graph::{GraphStats, TemporalGraph};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Placeholder type text for arguments whose type cannot be inferred syntactically.
pub const UNKNOWN_TYPE: &str = "unknown";

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Workflow,
    Activity,
    SignalHandler,
    QueryHandler,
    UpdateHandler,
}

impl NodeKind {
    pub const ALL: [NodeKind; 5] = [
        NodeKind::Workflow,
        NodeKind::Activity,
        NodeKind::SignalHandler,
        NodeKind::QueryHandler,
        NodeKind::UpdateHandler,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Workflow => "workflow",
            NodeKind::Activity => "activity",
            NodeKind::SignalHandler => "signal_handler",
            NodeKind::QueryHandler => "query_handler",
            NodeKind::UpdateHandler => "update_handler",
        }
    }

    pub fn is_handler(&self) -> bool {
        matches!(
            self,
            NodeKind::SignalHandler | NodeKind::QueryHandler | NodeKind::UpdateHandler
        )
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        static DISPLAY_STRINGS: &[(NodeKind, &str)] = &[
            (NodeKind::Workflow, "Workflow"),
            (NodeKind::Activity, "Activity"),
            (NodeKind::SignalHandler, "Signal Handler"),
            (NodeKind::QueryHandler, "Query Handler"),
            (NodeKind::UpdateHandler, "Update Handler"),
        ];

        let display_str = DISPLAY_STRINGS
            .iter()
            .find(|(k, _)| k == self)
            .map(|(_, s)| *s)
            .unwrap_or("Unknown");

        write!(f, "{display_str}")
    }
}

/// What a call site asks the orchestrator to do.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    Activity,
    LocalActivity,
    ChildWorkflow,
    Signal,
    Query,
    Update,
}

impl CallKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallKind::Activity => "activity",
            CallKind::LocalActivity => "local_activity",
            CallKind::ChildWorkflow => "child_workflow",
            CallKind::Signal => "signal",
            CallKind::Query => "query",
            CallKind::Update => "update",
        }
    }

    /// Execute-style calls carry a context and a target before the payload arguments.
    pub fn is_execution(&self) -> bool {
        matches!(
            self,
            CallKind::Activity | CallKind::LocalActivity | CallKind::ChildWorkflow
        )
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RetryPolicy {
    pub maximum_attempts: Option<i64>,
    pub initial_interval: Option<String>,
    pub backoff_coefficient: Option<f64>,
    pub maximum_interval: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ActivityOptions {
    pub start_to_close_timeout: Option<String>,
    pub schedule_to_close_timeout: Option<String>,
    pub schedule_to_start_timeout: Option<String>,
    pub heartbeat_timeout: Option<String>,
    pub retry_policy: Option<RetryPolicy>,
}

impl ActivityOptions {
    pub fn has_timeout(&self) -> bool {
        self.start_to_close_timeout.is_some()
            || self.schedule_to_close_timeout.is_some()
            || self.schedule_to_start_timeout.is_some()
    }

    pub fn has_heartbeat(&self) -> bool {
        self.heartbeat_timeout.is_some()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CallSite {
    pub target: String,
    pub kind: CallKind,
    pub line: usize,
    /// Arguments after the context/target prefix. Zero means "not captured".
    pub arg_count: usize,
    pub arg_types: Vec<String>,
    /// Type of the value bound through `.Get(ctx, &v)`, when one is bound.
    pub result_type: Option<String>,
    pub options: Option<ActivityOptions>,
}

impl CallSite {
    pub fn new(target: impl Into<String>, kind: CallKind, line: usize) -> Self {
        Self {
            target: target.into(),
            kind,
            line,
            arg_count: 0,
            arg_types: Vec::new(),
            result_type: None,
            options: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub type_text: String,
    /// Set by the extractor when the type is a configured workflow/activity context type.
    #[serde(default)]
    pub is_context: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignalDef {
    pub name: String,
    pub has_handler: bool,
    pub line: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryDef {
    pub name: String,
    pub return_type: String,
    pub line: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateDef {
    pub name: String,
    pub has_validator: bool,
    pub line: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionDef {
    pub change_id: String,
    pub min_supported: String,
    pub max_supported: String,
    pub line: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContinueAsNewDef {
    pub target: String,
    pub arg_count: usize,
    pub line: usize,
}

/// One declared workflow, activity or handler.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TemporalNode {
    pub name: String,
    pub kind: NodeKind,
    pub file: PathBuf,
    pub line: usize,
    pub package: String,
    pub parameters: Vec<Parameter>,
    pub return_type: String,
    pub doc: String,
    pub calls: Vec<CallSite>,
    /// Filled by the graph builder; never authored by the extractor.
    pub parents: Vec<String>,
    pub activity_options: Option<ActivityOptions>,
    pub signals: Vec<SignalDef>,
    pub queries: Vec<QueryDef>,
    pub updates: Vec<UpdateDef>,
    pub versions: Vec<VersionDef>,
    pub continue_as_new: Option<ContinueAsNewDef>,
    pub uses_timers: bool,
}

impl TemporalNode {
    pub fn new(name: impl Into<String>, kind: NodeKind, file: PathBuf, line: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            file,
            line,
            package: String::new(),
            parameters: Vec::new(),
            return_type: String::new(),
            doc: String::new(),
            calls: Vec::new(),
            parents: Vec::new(),
            activity_options: None,
            signals: Vec::new(),
            queries: Vec::new(),
            updates: Vec::new(),
            versions: Vec::new(),
            continue_as_new: None,
            uses_timers: false,
        }
    }

    pub fn fan_out(&self) -> usize {
        self.calls.len()
    }

    /// Go exports identifiers that start with an uppercase letter.
    pub fn is_exported(&self) -> bool {
        let local = self.name.rsplit('.').next().unwrap_or(&self.name);
        local.chars().next().is_some_and(|c| c.is_uppercase())
    }

    /// The value type of the declared result, without a trailing `error`.
    pub fn value_return_type(&self) -> Option<&str> {
        value_type_of(&self.return_type)
    }
}

/// Extracts `T` from `T`, `(T, error)` or `(x T, err error)`; `None` for `error` or empty.
pub fn value_type_of(result: &str) -> Option<&str> {
    let trimmed = result.trim();
    let inner = trimmed
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(trimmed);
    let first = inner.split(',').next()?.trim();
    let type_text = first.rsplit_once(' ').map_or(first, |(_, t)| t).trim();
    (!type_text.is_empty() && type_text != "error").then_some(type_text)
}

/// A non-fatal problem encountered while scanning the corpus.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: PathBuf,
    pub message: String,
}

impl Diagnostic {
    pub fn new(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.file.display(), self.message)
    }
}
