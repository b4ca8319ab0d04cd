//! Error type shared by the profile store, the state resolver and the reporter.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Reading or writing the profile failed (permissions, missing directory, full disk).
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not valid YAML. Never treated as an empty profile,
    /// since rewriting it would lose whatever else the user keeps there.
    #[error("failed to parse {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The file exists but is not UTF-8 text.
    #[error("{path} is not valid UTF-8 text: {source}")]
    ConfigEncoding {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} must contain a mapping at the top level, found {found}")]
    ConfigNotMapping { path: PathBuf, found: &'static str },

    #[error("failed to serialize profile: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("telemetry request failed: {0}")]
    Transport(#[from] Box<ureq::Error>),

    #[error("metadata is not valid JSON: {0}")]
    InvalidMetadata(#[from] serde_json::Error),
}

impl TelemetryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TelemetryError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, TelemetryError>;
