use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid arguments: {0}")]
    Usage(String),
    #[error("unknown dataset: {0}")]
    UnknownDataset(String),
    #[error("unknown day for this dataset: {0}")]
    UnknownDay(String),
    #[error("no tables available for day {day}")]
    EmptyCorpus { day: String },
    #[error("candidate window {first_id}+{num_cand} exceeds sequence length {len}")]
    WindowOutOfRange {
        first_id: usize,
        num_cand: usize,
        len: usize,
    },
    #[error("non-positive value for {flag}: {value}")]
    NonPositiveBound { flag: &'static str, value: f64 },
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("table artifact not found: {0}")]
    Missing(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt table artifact {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("document store error: {0}")]
    Store(#[from] rusqlite::Error),
    #[error("no document with id {0} in the snapshot store")]
    MissingDocument(String),
    #[error("table id {0} does not belong to this corpus")]
    WrongCorpus(String),
}
