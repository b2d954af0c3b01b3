//! Run configuration: an optional TOML file, overridden by command-line flags.
//!
//! ```toml
//! sources = "src/main/java"
//! docs = "docs"
//! classpath = ["../api/src/main/java", "extra-types.txt"]
//! doc-extension = ".json"
//! skip-package-info = false
//! jobs = 4
//! ```
//!
//! Relative paths in the file are taken relative to the file's directory.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_DOC_EXTENSION: &str = ".json";

/// Contents of a config file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub sources: Option<PathBuf>,
    pub docs: Option<PathBuf>,
    #[serde(default)]
    pub classpath: Vec<PathBuf>,
    pub doc_extension: Option<String>,
    pub skip_package_info: Option<bool>,
    pub jobs: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mut config = Self::parse(&text, path)?;
        if let Some(base) = path.parent() {
            config.rebase(base);
        }
        Ok(config)
    }

    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if config.jobs == Some(0) {
            return Err(Error::Config {
                path: path.to_path_buf(),
                message: "jobs must be at least 1".to_string(),
            });
        }
        Ok(config)
    }

    fn rebase(&mut self, base: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        self.sources.iter_mut().for_each(join);
        self.docs.iter_mut().for_each(join);
        self.classpath.iter_mut().for_each(join);
    }
}

/// Settings of one extract/apply/covered run.
#[derive(Debug, Clone)]
pub struct Config {
    pub sources: PathBuf,
    pub docs: PathBuf,
    pub classpath: Vec<PathBuf>,
    /// Sidecar extension including the dot, e.g. `.json`.
    pub doc_extension: String,
    pub skip_package_info: bool,
    /// Clear the docs directory before extracting.
    pub clean: bool,
}

impl Config {
    pub fn new(sources: impl Into<PathBuf>, docs: impl Into<PathBuf>) -> Self {
        Self {
            sources: sources.into(),
            docs: docs.into(),
            classpath: Vec::new(),
            doc_extension: DEFAULT_DOC_EXTENSION.to_string(),
            skip_package_info: false,
            clean: true,
        }
    }

    pub fn with_doc_extension(mut self, extension: &str) -> Self {
        self.doc_extension = normalize_extension(extension);
        self
    }
}

/// `json` and `.json` both mean `.json`.
pub fn normalize_extension(extension: &str) -> String {
    if extension.starts_with('.') {
        extension.to_string()
    } else {
        format!(".{extension}")
    }
}
