use std::fmt;

use thiserror::Error;

use crate::backend::CryptoError;
use crate::source::FetchError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Encoding failed: {values} values exceed slot capacity {capacity}")]
    Encoding { values: usize, capacity: usize },

    #[error("Crypto operation failed: {0}")]
    CryptoOperation(#[from] CryptoError),

    #[error("Record fetch failed: {0}")]
    ExternalFetch(#[from] FetchError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl PipelineError {
    /// Stable name of the error class, for reports and exit messages.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InvalidInput(_) => "InvalidInputError",
            PipelineError::Encoding { .. } => "EncodingError",
            PipelineError::CryptoOperation(_) => "CryptoOperationError",
            PipelineError::ExternalFetch(_) => "ExternalFetchError",
            PipelineError::Config(_) => "ConfigError",
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Pipeline stage names, used to report where a run aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Configure,
    Fetch,
    Plan,
    Encrypt,
    Aggregate,
    Cluster,
    Decode,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Configure => "configure",
            Stage::Fetch => "fetch",
            Stage::Plan => "plan",
            Stage::Encrypt => "encrypt",
            Stage::Aggregate => "aggregate",
            Stage::Cluster => "cluster",
            Stage::Decode => "decode",
        };
        f.write_str(name)
    }
}

/// A whole-run failure: the stage that aborted and the underlying error.
#[derive(Error, Debug)]
#[error("{stage} stage failed ({}): {source}", .source.kind())]
pub struct RunError {
    pub stage: Stage,
    #[source]
    pub source: PipelineError,
}

pub(crate) trait AtStage<T> {
    fn at(self, stage: Stage) -> std::result::Result<T, RunError>;
}

impl<T> AtStage<T> for Result<T> {
    fn at(self, stage: Stage) -> std::result::Result<T, RunError> {
        self.map_err(|source| RunError { stage, source })
    }
}
