//! Error types for redirector

use std::io;
use std::path::PathBuf;

/// Main error type for the setup tooling
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to {action} '{}': {source}", path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Certificate error: {0}")]
    Certificate(String),

    #[error("error when parsing JSON while validating the {endpoint} server at {host}: {detail}")]
    SchemaMismatch {
        endpoint: String,
        host: String,
        detail: String,
    },

    #[error("no servers are running currently, please try again later")]
    NoServersAvailable,

    #[error("there is no file at {}", path.display())]
    MissingPrerequisite { path: PathBuf, hint: String },

    #[error("input closed before an answer was given")]
    InputClosed,
}

impl Error {
    pub fn filesystem(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }

    pub fn catalog(msg: impl Into<String>) -> Self {
        Error::Catalog(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    pub fn certificate(msg: impl Into<String>) -> Self {
        Error::Certificate(msg.into())
    }

    pub fn missing(path: impl Into<PathBuf>, hint: impl Into<String>) -> Self {
        Error::MissingPrerequisite {
            path: path.into(),
            hint: hint.into(),
        }
    }

    /// Operator guidance for errors that have a known remedy.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Error::MissingPrerequisite { hint, .. } => Some(hint),
            Error::SchemaMismatch { .. } => {
                Some("the server responded but is not a compatible deployment")
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
