use crate::io::{GraphFormat, LintFormat};
use crate::rules::Severity;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tempograph")]
#[command(about = "Call-graph extraction and linting for Temporal Go workflows", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the workflow graph and optionally lint it
    Analyze(AnalyzeArgs),

    /// Write a default .tempograph.toml into the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Directory or file to analyze
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Graph output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: GraphFormat,

    /// Output file (defaults to stdout); later lint formats get derived names
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Explicit configuration file (otherwise discovered from the path upwards)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Run the rule engine instead of exporting the graph
    #[arg(long)]
    pub lint: bool,

    /// Comma-separated lint formats: text, json, github, sarif, checkstyle
    #[arg(long = "lint-format", value_enum, value_delimiter = ',', default_value = "text")]
    pub lint_format: Vec<LintFormat>,

    /// Fail on warnings as well as errors
    #[arg(long, visible_alias = "fail-on-warning")]
    pub strict: bool,

    /// Drop issues below this severity
    #[arg(long = "min-severity", value_enum)]
    pub min_severity: Option<Severity>,

    /// Only run these rules (IDs or names, comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub enable: Vec<String>,

    /// Skip these rules (IDs or names, comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub disable: Vec<String>,

    #[arg(long = "max-fan-out")]
    pub max_fan_out: Option<usize>,

    #[arg(long = "max-call-depth")]
    pub max_call_depth: Option<usize>,

    /// Call-site count at which workflows should use GetVersion
    #[arg(long = "versioning-complexity")]
    pub versioning_complexity: Option<usize>,

    /// Keep at most this many issues (0 = unlimited)
    #[arg(long = "max-issues")]
    pub max_issues: Option<usize>,

    /// Ask the language model to confirm each issue
    #[arg(long)]
    pub verify: bool,

    /// Ask the language model for context-aware fixes
    #[arg(long)]
    pub enhance: bool,

    /// Model name for --verify/--enhance
    #[arg(long = "llm-model", env = "TEMPOGRAPH_LLM_MODEL")]
    pub llm_model: Option<String>,

    /// Include *_test.go files
    #[arg(long = "include-tests")]
    pub include_tests: bool,

    /// Include vendor/ directories
    #[arg(long = "include-vendor")]
    pub include_vendor: bool,

    /// Glob patterns of paths to skip
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Extract files on one thread
    #[arg(long = "no-parallel")]
    pub no_parallel: bool,

    /// Disable colored text output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Increase verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Suppress progress bars and informational logging
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl AnalyzeArgs {
    /// Verbosity used for logging setup; quiet wins.
    pub fn log_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbosity + 1
        }
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(args: &[&str]) -> AnalyzeArgs {
        let mut argv = vec!["tempograph", "analyze"];
        argv.extend_from_slice(args);
        match Cli::parse_from(argv).command {
            Commands::Analyze(args) => args,
            other => panic!("expected analyze, got {:?}", other),
        }
    }

    #[test]
    fn test_defaults() {
        let args = analyze(&[]);
        assert_eq!(args.path, PathBuf::from("."));
        assert_eq!(args.format, GraphFormat::Json);
        assert_eq!(args.lint_format, vec![LintFormat::Text]);
        assert!(!args.lint);
        assert_eq!(args.log_level(), 1);
    }

    #[test]
    fn test_lint_flags() {
        let args = analyze(&[
            "./svc",
            "--lint",
            "--lint-format",
            "text,sarif",
            "--fail-on-warning",
            "--min-severity",
            "warning",
            "--disable",
            "TA011,TA033",
            "--max-fan-out",
            "8",
            "-o",
            "report.txt",
        ]);
        assert!(args.lint && args.strict);
        assert_eq!(args.lint_format, vec![LintFormat::Text, LintFormat::Sarif]);
        assert_eq!(args.min_severity, Some(Severity::Warning));
        assert_eq!(args.disable, vec!["TA011".to_string(), "TA033".to_string()]);
        assert_eq!(args.max_fan_out, Some(8));
        assert_eq!(args.output, Some(PathBuf::from("report.txt")));
    }

    #[test]
    fn test_unknown_lint_format_rejected() {
        let result = Cli::try_parse_from(["tempograph", "analyze", "--lint-format", "yaml"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["tempograph", "analyze", "-q", "-v"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_init_force() {
        let cli = Cli::parse_from(["tempograph", "init", "--force"]);
        assert!(matches!(cli.command, Commands::Init { force: true }));
    }
}
