use crate::io::output::LintWriter;
use crate::rules::{Issue, LintResult, Severity};
use html_escape::encode_double_quoted_attribute;
use std::collections::BTreeMap;
use std::io::Write;

/// Checkstyle XML, issues grouped per file in path order.
pub struct CheckstyleWriter<W: Write> {
    writer: W,
}

impl<W: Write> CheckstyleWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

fn severity_attr(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "info",
    }
}

impl<W: Write> LintWriter for CheckstyleWriter<W> {
    fn write_lint(&mut self, result: &LintResult) -> anyhow::Result<()> {
        let mut by_file: BTreeMap<String, Vec<&Issue>> = BTreeMap::new();
        for issue in &result.issues {
            by_file
                .entry(super::display_path(&issue.file))
                .or_default()
                .push(issue);
        }

        writeln!(self.writer, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        writeln!(self.writer, "<checkstyle version=\"4.3\">")?;
        for (file, issues) in by_file {
            writeln!(
                self.writer,
                "  <file name=\"{}\">",
                encode_double_quoted_attribute(&file)
            )?;
            for issue in issues {
                writeln!(
                    self.writer,
                    "    <error line=\"{}\" severity=\"{}\" message=\"{}\" source=\"tempograph.{}\"/>",
                    issue.line,
                    severity_attr(issue.severity),
                    encode_double_quoted_attribute(&format!("{}: {}", issue.node_name, issue.message)),
                    encode_double_quoted_attribute(&issue.rule_id)
                )?;
            }
            writeln!(self.writer, "  </file>")?;
        }
        writeln!(self.writer, "</checkstyle>")?;
        Ok(())
    }
}
