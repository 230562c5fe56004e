use crate::io::output::LintWriter;
use crate::rules::{Issue, LintResult, Severity};
use colored::Colorize;
use std::io::Write;

/// Human-readable lint report, compiler-diagnostic style.
pub struct TextWriter<W: Write> {
    writer: W,
    use_color: bool,
}

impl<W: Write> TextWriter<W> {
    pub fn new(writer: W, use_color: bool) -> Self {
        Self { writer, use_color }
    }

    fn severity_label(&self, severity: Severity) -> String {
        if !self.use_color {
            return severity.as_str().to_string();
        }
        match severity {
            Severity::Error => severity.as_str().red().bold().to_string(),
            Severity::Warning => severity.as_str().yellow().bold().to_string(),
            Severity::Info => severity.as_str().blue().bold().to_string(),
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.use_color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    fn write_issue(&mut self, issue: &Issue) -> anyhow::Result<()> {
        let header = format!("{}[{}]", self.severity_label(issue.severity), issue.rule_id);
        writeln!(self.writer, "{} {}: {}", header, issue.node_name, issue.message)?;
        writeln!(
            self.writer,
            "  {} {}:{}",
            self.dim("-->"),
            super::display_path(&issue.file),
            issue.line
        )?;
        writeln!(self.writer, "  {} {}", self.dim("= help:"), issue.suggestion)?;
        if let Some(fix) = &issue.fix {
            writeln!(self.writer, "  {} {}", self.dim("= fix:"), fix.description)?;
        }
        writeln!(self.writer)?;
        Ok(())
    }
}

impl<W: Write> LintWriter for TextWriter<W> {
    fn write_lint(&mut self, result: &LintResult) -> anyhow::Result<()> {
        for issue in &result.issues {
            self.write_issue(issue)?;
        }

        let summary = format!(
            "{} issue(s): {} error(s), {} warning(s), {} info",
            result.total(),
            result.error_count,
            result.warn_count,
            result.info_count
        );
        if !self.use_color {
            writeln!(self.writer, "{}", summary)?;
        } else if result.is_failing() {
            writeln!(self.writer, "{}", summary.red().bold())?;
        } else {
            writeln!(self.writer, "{}", summary.green().bold())?;
        }
        Ok(())
    }
}
