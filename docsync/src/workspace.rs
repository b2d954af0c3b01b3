//! Runs the passes over a whole source root.
//!
//! Every `.java` file is one unit of work. Units run in parallel on the
//! rayon pool and share only the read-only [`TypeIndex`]. A failing unit is
//! logged and collected in the [`Report`]; it never stops its siblings.

use crate::apply::{apply, apply_package};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::extract::{extract, extract_package};
use crate::model::{self, DocInfo, PackageInfo};
use crate::resolve::{SourceResolver, TypeIndex};
use crate::strip::strip;
use crate::syntax::JavaSource;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const PACKAGE_INFO: &str = "package-info.java";

/// Result of one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Written,
    Unchanged,
    Skipped,
}

#[derive(Debug, Default)]
pub struct Report {
    pub written: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failures: Vec<Error>,
}

impl Report {
    pub fn total(&self) -> usize {
        self.written + self.unchanged + self.skipped + self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// All `.java` files under `root`, sorted.
pub fn java_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            Error::io(path, e.into())
        })?;
        if entry.file_type().is_file() && entry.path().extension().is_some_and(|ext| ext == "java") {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

pub fn is_package_info(path: &Path) -> bool {
    path.file_name().is_some_and(|name| name == PACKAGE_INFO)
}

/// Sidecar location of `source`: its path under the source root, mirrored
/// under the docs root with the doc extension.
pub fn sidecar_path(config: &Config, source: &Path) -> PathBuf {
    let relative = source.strip_prefix(&config.sources).unwrap_or(source);
    let mut path = config.docs.join(relative);
    let extension = config.doc_extension.trim_start_matches('.');
    path.set_extension(extension);
    path
}

/// JDK table + source root + classpath entries.
pub fn build_index(config: &Config) -> Result<TypeIndex> {
    let mut index = TypeIndex::with_jdk();
    index.scan_sources(&config.sources)?;
    for entry in &config.classpath {
        index.add_classpath_entry(entry)?;
    }
    tracing::debug!("type index holds {} types", index.len());
    Ok(index)
}

/// Write a sidecar for every documented source file.
pub fn extract_tree(config: &Config) -> Result<Report> {
    let files = java_files(&config.sources)?;
    if config.clean {
        clear_dir(config)?;
    }
    let index = build_index(config)?;
    Ok(run_units(&files, |file| extract_file(config, &index, file)))
}

/// Apply every existing sidecar to its source file.
pub fn apply_tree(config: &Config) -> Result<Report> {
    let files = java_files(&config.sources)?;
    let index = build_index(config)?;
    Ok(run_units(&files, |file| apply_file(config, &index, file)))
}

/// Remove javadoc comments from every file under `sources`.
pub fn strip_tree(sources: &Path, skip_package_info: bool) -> Result<Report> {
    let files = java_files(sources)?;
    Ok(run_units(&files, |file| {
        if skip_package_info && is_package_info(file) {
            return Ok(Outcome::Skipped);
        }
        let source = JavaSource::parse(read_source(file)?)?;
        match strip(&source) {
            Some(text) => {
                fs::write(file, text).map_err(|e| Error::io(file, e))?;
                Ok(Outcome::Written)
            }
            None => Ok(Outcome::Unchanged),
        }
    }))
}

/// Source files that have a sidecar.
pub fn covered_sources(config: &Config) -> Result<Vec<PathBuf>> {
    let files = java_files(&config.sources)?;
    Ok(files
        .into_iter()
        .filter(|file| sidecar_path(config, file).is_file())
        .collect())
}

fn extract_file(config: &Config, index: &TypeIndex, file: &Path) -> Result<Outcome> {
    let package_info = is_package_info(file);
    if package_info && config.skip_package_info {
        return Ok(Outcome::Skipped);
    }
    let source = JavaSource::parse(read_source(file)?)?;
    let out = sidecar_path(config, file);

    if package_info {
        let info = extract_package(&source);
        if info.is_empty() {
            return Ok(Outcome::Unchanged);
        }
        model::write(&out, &info)?;
    } else {
        let resolver = SourceResolver::new(index, &source);
        let doc = extract(&source, &resolver)?;
        if doc.is_empty() {
            return Ok(Outcome::Unchanged);
        }
        model::write(&out, &doc)?;
    }
    tracing::debug!("wrote {}", out.display());
    Ok(Outcome::Written)
}

fn apply_file(config: &Config, index: &TypeIndex, file: &Path) -> Result<Outcome> {
    let package_info = is_package_info(file);
    if package_info && config.skip_package_info {
        return Ok(Outcome::Skipped);
    }
    let sidecar = sidecar_path(config, file);
    if !sidecar.is_file() {
        tracing::debug!("no sidecar for {}", file.display());
        return Ok(Outcome::Skipped);
    }
    let source = JavaSource::parse(read_source(file)?)?;

    let text = if package_info {
        let info: PackageInfo = model::read(&sidecar)?;
        apply_package(&source, &info)
    } else {
        let doc: DocInfo = model::read(&sidecar)?;
        let resolver = SourceResolver::new(index, &source);
        apply(&source, &resolver, &doc)?
    };

    match text {
        Some(text) => {
            fs::write(file, text).map_err(|e| Error::io(file, e))?;
            tracing::debug!("updated {}", file.display());
            Ok(Outcome::Written)
        }
        None => Ok(Outcome::Unchanged),
    }
}

fn read_source(file: &Path) -> Result<String> {
    fs::read_to_string(file).map_err(|e| Error::io(file, e))
}

/// Empty the docs root. Paths are compared after resolving `.`, `..` and
/// symlinks; a docs root that is or contains the source root is refused.
fn clear_dir(config: &Config) -> Result<()> {
    let docs = &config.docs;
    if docs.exists() {
        let sources = canonical(&config.sources)?;
        if sources.starts_with(canonical(docs)?) {
            return Err(Error::Config {
                path: docs.clone(),
                message: "docs directory must not contain the source root".to_string(),
            });
        }
        fs::remove_dir_all(docs).map_err(|e| Error::io(docs, e))?;
    }
    fs::create_dir_all(docs).map_err(|e| Error::io(docs, e))
}

fn canonical(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).map_err(|e| Error::io(path, e))
}

fn run_units<F>(files: &[PathBuf], unit: F) -> Report
where
    F: Fn(&Path) -> Result<Outcome> + Sync,
{
    let outcomes: Vec<Result<Outcome>> = files
        .par_iter()
        .map(|file| unit(file.as_path()).map_err(|e| e.in_file(file)))
        .collect();

    let mut report = Report::default();
    for outcome in outcomes {
        match outcome {
            Ok(Outcome::Written) => report.written += 1,
            Ok(Outcome::Unchanged) => report.unchanged += 1,
            Ok(Outcome::Skipped) => report.skipped += 1,
            Err(e) => {
                tracing::error!("{e}");
                report.failures.push(e);
            }
        }
    }
    report
}
