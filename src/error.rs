//! Error types for rendering, configuration, output and whole runs.
//!
//! Per-container problems never show up here: the extraction chain recovers
//! from them locally. What remains are per-store render failures (recovered
//! by the runner), fatal setup failures, and I/O around config and output.

use std::path::PathBuf;
use thiserror::Error;

/// A store page could not be turned into a queryable document.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("timed out waiting for {url}")]
    Timeout { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("renderer unavailable: {0}")]
    Unavailable(String),
}

/// Failure of a run as a whole. Per-store failures are not errors.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("renderer could not be initialised: {0}")]
    Setup(#[source] RenderError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("no store URLs configured (pass URLs, --stores or a config file with `stores`)")]
    NoStores,

    #[error("invalid pacing range: min {min}s, max {max}s")]
    InvalidPacing { min: f64, max: f64 },
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("table is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
