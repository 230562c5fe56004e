use crate::io::output::LintWriter;
use crate::rules::{LintResult, Severity};
use std::io::Write;

/// GitHub Actions workflow commands, one annotation per issue.
pub struct GithubWriter<W: Write> {
    writer: W,
}

impl<W: Write> GithubWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

fn command_for(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "notice",
    }
}

fn escape_data(text: &str) -> String {
    text.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(text: &str) -> String {
    escape_data(text).replace(':', "%3A").replace(',', "%2C")
}

impl<W: Write> LintWriter for GithubWriter<W> {
    fn write_lint(&mut self, result: &LintResult) -> anyhow::Result<()> {
        for issue in &result.issues {
            writeln!(
                self.writer,
                "::{} file={},line={},title={}::{}",
                command_for(issue.severity),
                escape_property(&super::display_path(&issue.file)),
                issue.line,
                escape_property(&format!("{} {}", issue.rule_id, issue.rule_name)),
                escape_data(&format!("{}: {}", issue.node_name, issue.message))
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escaping() {
        assert_eq!(escape_data("50%\nnext"), "50%25%0Anext");
        assert_eq!(escape_property("a:b,c"), "a%3Ab%2Cc");
    }

    #[test]
    fn test_info_maps_to_notice() {
        assert_eq!(command_for(Severity::Info), "notice");
        assert_eq!(command_for(Severity::Error), "error");
    }
}
