//! Error taxonomy for extraction, application and sidecar I/O.
//!
//! Every failure is a deterministic function of the input, so nothing here
//! is retried. Errors raised inside a traversal do not know which file they
//! came from; the workspace runner wraps them with [`Error::in_file`].

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{}: {error}", path.display())]
    InFile { path: PathBuf, error: Box<Error> },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("syntax error at line {line}")]
    Syntax { line: usize },

    #[error("cannot resolve type `{name}` in {element}")]
    Resolution { element: String, name: String },

    #[error("malformed sidecar {}: {source}", path.display())]
    MalformedSidecar {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("duplicate key `{key}` in {class}: {first} and {second}")]
    DuplicateKey {
        class: String,
        key: String,
        first: String,
        second: String,
    },

    #[error("refusing to overwrite existing sidecar {}", path.display())]
    DestinationExists { path: PathBuf },

    #[error("invalid configuration {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("parser setup failed: {0}")]
    Parser(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Attach the source file a traversal error belongs to.
    pub fn in_file(self, path: &Path) -> Self {
        match self {
            // Already names its own path.
            Error::InFile { .. }
            | Error::Io { .. }
            | Error::MalformedSidecar { .. }
            | Error::DestinationExists { .. } => self,
            other => Error::InFile {
                path: path.to_path_buf(),
                error: Box::new(other),
            },
        }
    }
}
