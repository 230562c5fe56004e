use crate::cli::AnalyzeArgs;
use crate::config::{load_config, TempographConfig};
use crate::core::CancellationToken;
use crate::errors::{Error, EXIT_OK};
use crate::io::{self, derived_output_path, render_graph, render_lint, GraphFormat, LintFormat};
use crate::llm::LlmEnhancer;
use crate::pipeline::{Analysis, AnalysisPipeline};
use crate::progress::{ProgressConfig, ProgressManager};
use crate::rules::{LintEngine, LintResult};
use crate::tui::GraphBrowser;
use anyhow::{Context, Result};
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Base name for extra lint formats when no `--output` is given.
const DEFAULT_REPORT_BASE: &str = "tempograph-lint";

/// Runs one analysis and returns the process exit code.
pub fn handle_analyze(args: AnalyzeArgs) -> Result<i32> {
    let config = resolve_config(&args)?;
    check_output_location(args.output.as_deref())?;

    let engine = if args.lint || args.format == GraphFormat::Tui {
        Some(build_engine(&args, &config)?)
    } else {
        None
    };

    let progress = ProgressManager::new(ProgressConfig::from_env(args.quiet, args.verbosity));
    let analysis = AnalysisPipeline::new(&config.extraction)
        .with_progress(progress.clone())
        .with_cancellation(CancellationToken::new())
        .run(&args.path)?;
    progress.clear();
    info!(
        files = analysis.files_scanned,
        nodes = analysis.graph.len(),
        diagnostics = analysis.diagnostics.len(),
        "Analysis complete"
    );

    if args.format == GraphFormat::Tui {
        let issues = engine
            .map(|engine| engine.run(&analysis.graph, &CancellationToken::new()).issues)
            .unwrap_or_default();
        GraphBrowser::new(analysis.graph, issues)?.run()?;
        return Ok(EXIT_OK);
    }

    match engine {
        Some(engine) => {
            let result = engine.run(&analysis.graph, &CancellationToken::new());
            emit_lint(&args, &result)?;
            Ok(result.exit_code)
        }
        None => {
            emit_graph(&args, &analysis)?;
            Ok(EXIT_OK)
        }
    }
}

/// File settings first, then command-line overrides.
pub fn resolve_config(args: &AnalyzeArgs) -> Result<TempographConfig> {
    let start = if args.path.is_file() {
        args.path.parent().map(Path::to_path_buf).unwrap_or_default()
    } else {
        args.path.clone()
    };
    let mut config = load_config(args.config.as_deref(), &start)?;
    apply_overrides(&mut config, args);
    Ok(config)
}

pub fn apply_overrides(config: &mut TempographConfig, args: &AnalyzeArgs) {
    let extraction = &mut config.extraction;
    extraction.include_tests |= args.include_tests;
    extraction.include_vendor |= args.include_vendor;
    extraction.exclude.extend(args.exclude.iter().cloned());
    if args.no_parallel {
        extraction.parallel = false;
    }

    let lint = &mut config.lint;
    if let Some(min) = args.min_severity {
        lint.min_severity = min;
    }
    if !args.enable.is_empty() {
        lint.enable = args.enable.clone();
    }
    lint.disable.extend(args.disable.iter().cloned());
    if let Some(value) = args.max_fan_out {
        lint.thresholds.max_fan_out = value;
    }
    if let Some(value) = args.max_call_depth {
        lint.thresholds.max_call_depth = value;
    }
    if let Some(value) = args.versioning_complexity {
        lint.thresholds.versioning_complexity = value;
    }
    if let Some(value) = args.max_issues {
        lint.max_issues = value;
    }
    lint.fail_on_warning |= args.strict;

    let enhancement = &mut config.enhancement;
    enhancement.verify |= args.verify;
    enhancement.enhance |= args.enhance;
    if args.llm_model.is_some() {
        enhancement.model = args.llm_model.clone();
    }
}

fn check_output_location(output: Option<&Path>) -> Result<()> {
    let Some(parent) = output
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty())
    else {
        return Ok(());
    };
    if !parent.is_dir() {
        return Err(Error::file_system(
            format!("output directory does not exist: {}", parent.display()),
            parent,
        )
        .into());
    }
    Ok(())
}

fn build_engine(args: &AnalyzeArgs, config: &TempographConfig) -> Result<LintEngine> {
    let engine = LintEngine::new(config.lint.clone())?;
    if !config.enhancement.is_requested() || !args.lint {
        return Ok(engine);
    }
    match LlmEnhancer::from_env(config.enhancement.model.as_deref())? {
        Some(enhancer) => Ok(engine.with_enhancer(Box::new(enhancer), config.enhancement.clone())),
        None => Ok(engine),
    }
}

fn emit_graph(args: &AnalyzeArgs, analysis: &Analysis) -> Result<()> {
    let bytes = render_graph(args.format, &analysis.graph)?;
    match &args.output {
        Some(path) => {
            io::write_file(path, &bytes)?;
            info!(path = %path.display(), "Graph written");
        }
        None => write_stdout(&bytes)?,
    }
    Ok(())
}

fn emit_lint(args: &AnalyzeArgs, result: &LintResult) -> Result<()> {
    let formats = LintFormat::dedup(&args.lint_format);
    for (i, format) in formats.iter().enumerate() {
        let target = lint_target(args.output.as_deref(), *format, i);
        let use_color = target.is_none() && !args.no_color && std::io::stdout().is_terminal();
        let bytes = render_lint(*format, result, use_color)?;
        match target {
            Some(path) => {
                io::write_file(&path, &bytes)?;
                info!(path = %path.display(), format = ?format, "Lint report written");
            }
            None => write_stdout(&bytes)?,
        }
    }
    Ok(())
}

/// The first format goes to `--output` (or stdout); later ones to derived names.
pub fn lint_target(output: Option<&Path>, format: LintFormat, index: usize) -> Option<PathBuf> {
    match (output, index) {
        (Some(path), 0) => Some(path.to_path_buf()),
        (None, 0) => None,
        (Some(path), _) => Some(derived_output_path(path, format.extension())),
        (None, _) => Some(derived_output_path(
            Path::new(DEFAULT_REPORT_BASE),
            format.extension(),
        )),
    }
}

fn write_stdout(bytes: &[u8]) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(bytes).context("Failed to write to stdout")?;
    stdout.flush().context("Failed to flush stdout")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn args(argv: &[&str]) -> AnalyzeArgs {
        let mut full = vec!["tempograph", "analyze"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Commands::Analyze(args) => args,
            Commands::Init { .. } => unreachable!(),
        }
    }

    #[test]
    fn test_flags_override_file_settings() {
        let mut config = TempographConfig::default();
        config.lint.thresholds.max_fan_out = 20;
        config.lint.disable = vec!["TA011".into()];
        apply_overrides(
            &mut config,
            &args(&["--max-fan-out", "4", "--disable", "TA033", "--strict", "--no-parallel"]),
        );
        assert_eq!(config.lint.thresholds.max_fan_out, 4);
        assert_eq!(config.lint.disable, vec!["TA011".to_string(), "TA033".to_string()]);
        assert!(config.lint.fail_on_warning);
        assert!(!config.extraction.parallel);
    }

    #[test]
    fn test_derived_targets() {
        let out = Path::new("reports/lint.txt");
        assert_eq!(lint_target(Some(out), LintFormat::Text, 0), Some(out.to_path_buf()));
        assert_eq!(
            lint_target(Some(out), LintFormat::Sarif, 1),
            Some(PathBuf::from("reports/lint.sarif"))
        );
        assert_eq!(lint_target(None, LintFormat::Text, 0), None);
        assert_eq!(
            lint_target(None, LintFormat::Checkstyle, 1),
            Some(PathBuf::from("tempograph-lint.xml"))
        );
    }

    #[test]
    fn test_missing_output_directory_fails_early() {
        let dir = tempfile::TempDir::new().unwrap();
        let output = dir.path().join("nope").join("graph.json");
        assert!(check_output_location(Some(&output)).is_err());
        assert!(check_output_location(Some(&dir.path().join("graph.json"))).is_ok());
        assert!(check_output_location(Some(Path::new("graph.json"))).is_ok());
    }
}
