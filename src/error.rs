//! Error types

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::content::QueryError;

/// Errors raised while fetching content, planning pages and rendering them
#[derive(Error, Debug)]
pub enum Error {
    #[error("Content query failed: {}", QueryErrors(.0))]
    Query(Vec<QueryError>),

    #[error("Two pages resolve to the same path: {path}")]
    DuplicatePath { path: String },

    #[error("Invalid page path {path:?} (template {template})")]
    InvalidPath { path: String, template: String },

    #[error("Template not found: {0}")]
    MissingTemplate(String),

    #[error("Render error in {template}: {message}")]
    Render { template: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

struct QueryErrors<'a>(&'a [QueryError]);

impl fmt::Display for QueryErrors<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}
