use crate::config::ExtractionConfig;
use crate::errors::{Error, Result};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

const SOURCE_EXTENSION: &str = "go";
const TEST_SUFFIX: &str = "_test.go";
const VENDOR_DIR: &str = "vendor";

pub struct FileWalker {
    root: PathBuf,
    include_tests: bool,
    include_vendor: bool,
    ignore_patterns: Vec<glob::Pattern>,
}

impl FileWalker {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            include_tests: false,
            include_vendor: false,
            ignore_patterns: vec![],
        }
    }

    pub fn from_config(root: PathBuf, config: &ExtractionConfig) -> Result<Self> {
        let patterns = config
            .exclude
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self::new(root)
            .with_tests(config.include_tests)
            .with_vendor(config.include_vendor)
            .with_ignore_patterns(patterns))
    }

    pub fn with_tests(mut self, include: bool) -> Self {
        self.include_tests = include;
        self
    }

    pub fn with_vendor(mut self, include: bool) -> Self {
        self.include_vendor = include;
        self
    }

    pub fn with_ignore_patterns(mut self, patterns: Vec<glob::Pattern>) -> Self {
        self.ignore_patterns = patterns;
        self
    }

    /// Every candidate source file, sorted so collisions resolve the same way on every run.
    pub fn walk(&self) -> Result<Vec<PathBuf>> {
        if !self.root.exists() {
            return Err(Error::file_system(
                format!("path does not exist: {}", self.root.display()),
                &self.root,
            ));
        }
        if self.root.is_file() {
            return Ok(vec![self.root.clone()]);
        }

        let mut files = Vec::new();
        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        for entry in walker {
            let entry = entry.map_err(|e| Error::file_system(e.to_string(), &self.root))?;
            let path = entry.path();

            if path.is_file() && self.should_process(path) {
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        Ok(files)
    }

    fn should_process(&self, path: &Path) -> bool {
        if path.extension().and_then(|e| e.to_str()) != Some(SOURCE_EXTENSION) {
            return false;
        }

        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if !self.include_tests && file_name.ends_with(TEST_SUFFIX) {
            return false;
        }
        if !self.include_vendor && relative.components().any(|c| c.as_os_str() == VENDOR_DIR) {
            return false;
        }

        let path_str = relative.to_string_lossy();
        !self
            .ignore_patterns
            .iter()
            .any(|pattern| pattern.matches(&path_str))
    }
}
