use std::fs;
use std::path::{Path, PathBuf};

use super::TempographConfig;
use crate::errors::{Error, Result};

pub const CONFIG_FILE_NAME: &str = ".tempograph.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Parse and validate config from a TOML string
pub fn parse_config(contents: &str) -> Result<TempographConfig> {
    let config = toml::from_str::<TempographConfig>(contents)
        .map_err(|e| Error::config(format!("Failed to parse {}: {}", CONFIG_FILE_NAME, e)))?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &TempographConfig) -> Result<()> {
    let patterns = config
        .extraction
        .workflow_name_patterns
        .iter()
        .chain(&config.extraction.activity_name_patterns)
        .chain(&config.lint.long_running_patterns);
    for pattern in patterns {
        regex::Regex::new(pattern)
            .map_err(|e| Error::config(format!("invalid pattern '{}': {}", pattern, e)))?;
    }
    for pattern in &config.extraction.exclude {
        glob::Pattern::new(pattern)
            .map_err(|e| Error::config(format!("invalid exclude glob '{}': {}", pattern, e)))?;
    }
    let threshold = config.enhancement.confidence_threshold;
    if !(0.0..=1.0).contains(&threshold) {
        return Err(Error::config(format!(
            "confidence_threshold must be within 0.0..=1.0, got {}",
            threshold
        )));
    }
    Ok(())
}

/// Generate directory ancestors up to a depth limit
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Search `start` and its ancestors for a config file.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    directory_ancestors(start.to_path_buf(), MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|path| path.is_file())
}

/// Load configuration from an explicit path, or discover one starting at `start`.
///
/// A missing discovered file yields defaults; an explicit path that cannot be read,
/// or any file that fails to parse, is a configuration error.
pub fn load_config(explicit: Option<&Path>, start: &Path) -> Result<TempographConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match find_config_file(start) {
            Some(path) => path,
            None => {
                log::debug!(
                    "No {} found within {} directories of {}. Using default config.",
                    CONFIG_FILE_NAME,
                    MAX_TRAVERSAL_DEPTH,
                    start.display()
                );
                return Ok(TempographConfig::default());
            }
        },
    };

    let contents = fs::read_to_string(&path).map_err(|e| Error::io_at(&path, e))?;
    let config = parse_config(&contents)?;
    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Severity;
    use tempfile::TempDir;

    #[test]
    fn test_parse_partial_config() {
        let config = parse_config(
            r#"
[lint]
min_severity = "warning"
disable = ["TA011"]

[lint.thresholds]
max_fan_out = 8
"#,
        )
        .unwrap();
        assert_eq!(config.lint.min_severity, Severity::Warning);
        assert_eq!(config.lint.disable, vec!["TA011".to_string()]);
        assert_eq!(config.lint.thresholds.max_fan_out, 8);
        assert_eq!(config.lint.thresholds.max_call_depth, 10);
        assert!(config.extraction.parallel);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = parse_config(
            r#"
[extraction]
workflow_name_patterns = ["(unclosed"]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_invalid_confidence_rejected() {
        let err = parse_config("[enhancement]\nconfidence_threshold = 1.5\n").unwrap_err();
        assert!(err.to_string().contains("confidence_threshold"));
    }

    #[test]
    fn test_discovers_config_in_ancestor() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("services").join("billing");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[lint]\nmax_issues = 3\n",
        )
        .unwrap();

        let config = load_config(None, &nested).unwrap();
        assert_eq!(config.lint.max_issues, 3);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load_config(Some(&missing), dir.path()).is_err());
    }

    #[test]
    fn test_directory_ancestors_limit() {
        let ancestors: Vec<_> = directory_ancestors(PathBuf::from("/a/b/c/d"), 2).collect();
        assert_eq!(
            ancestors,
            vec![PathBuf::from("/a/b/c/d"), PathBuf::from("/a/b/c")]
        );
    }
}
