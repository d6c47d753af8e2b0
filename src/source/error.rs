use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Feed returned error status {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse records: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid {field} in record: {value:?}")]
    InvalidField { field: &'static str, value: String },
}
