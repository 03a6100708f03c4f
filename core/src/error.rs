use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("Cannot inject {spikes} spikes into a signal of length {length}")]
    SpikeCountExceedsLength { spikes: usize, length: usize },

    #[error("Rolling window must cover at least 2 samples, got {window}")]
    InvalidWindow { window: usize },

    #[error("Non-finite {column} for {customer_id} at timestamp {timestamp}")]
    NonFiniteSample {
        customer_id: String,
        column: &'static str,
        timestamp: usize,
    },

    #[error("Required table not found: {}", path.display())]
    MissingInput { path: PathBuf },

    #[error("Malformed table {}: {reason}", path.display())]
    MalformedTable { path: PathBuf, reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    pub fn config(reason: impl Into<String>) -> Self {
        SimError::Configuration { reason: reason.into() }
    }
}
