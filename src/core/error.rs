use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("failed to read script {path}: {source}")]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch script {url}: {source}")]
    FetchSource {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("script source returned status {status}: {url}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("invalid script source {0}")]
    InvalidSource(String),

    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {what}: {source}")]
    Serialize {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read config {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ScoutError>;
