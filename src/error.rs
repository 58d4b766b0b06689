//! Error types shared across the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to reduce timing samples into a summary.
#[derive(Debug, Error, PartialEq)]
pub enum StatsError {
    /// Sample variance needs at least two samples.
    #[error("variance requires at least two samples, got {0}")]
    InsufficientSamples(usize),
}

/// Failure while reading the recipe dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to open dataset {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed list field `{field}`: {reason}")]
    ListField { field: &'static str, reason: String },
}

/// Failure reported by a database backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("clickhouse returned {status}: {body}")]
    ClickHouse { status: u16, body: String },
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("serde json error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("unexpected response: {0}")]
    Protocol(String),
}

/// Failure while persisting or loading results.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("serde json error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

/// Failure while rendering the comparison report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("chart rendering failed: {0}")]
    Chart(String),
    #[error(transparent)]
    Persist(#[from] PersistError),
}
