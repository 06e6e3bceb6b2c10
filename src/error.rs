use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CcfsError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("State error: {0}")]
    State(String),

    #[error("Evaluation error: {0}")]
    Evaluation(String),

    #[error("Data loading error: {0}")]
    DataLoading(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Config source error: {0}")]
    ConfigSource(#[from] config::ConfigError),
}

/// Coarse classification used when reporting why a run terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Configuration,
    State,
    Evaluation,
    Data,
}

impl CcfsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) | Self::ConfigSource(_) => ErrorKind::Configuration,
            Self::State(_) => ErrorKind::State,
            Self::Evaluation(_) => ErrorKind::Evaluation,
            Self::DataLoading(_) | Self::Io(_) | Self::Polars(_) | Self::Serde(_) => {
                ErrorKind::Data
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, CcfsError>;
