//! Error types for the scenario driver

use reef_core::StakerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Scenario error: {0}")]
    Scenario(String),

    #[error("Ledger error: {0}")]
    Ledger(#[from] StakerError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

pub type SimResult<T> = Result<T, SimError>;
