use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while talking to the remote API.
///
/// "Not found" outcomes are deliberately absent: a missing bookmark or note
/// comes back as a value (`DeleteOutcome::NotFound`, `None`).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {method} failed: {source}")]
    Transport {
        method: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} returned HTTP {status}: {body}")]
    Status {
        method: String,
        status: u16,
        body: String,
    },

    #[error("could not decode {method} response: {source}")]
    Decode {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ApiError {
    /// HTTP status code, when the server answered with a non-success status.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failures raised while loading the configuration file. All are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Please edit {} and add the required configurations.", path.display())]
    Created { path: PathBuf },

    #[error("could not determine the home directory")]
    NoHomeDir,

    #[error("could not access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{} is missing the `{key}` setting", path.display())]
    MissingKey { key: &'static str, path: PathBuf },

    #[error("Please replace the placeholder `{key}` value in {}", path.display())]
    Placeholder { key: &'static str, path: PathBuf },
}
