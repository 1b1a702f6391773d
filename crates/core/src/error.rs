use thiserror::Error;

pub type RewardsResult<T> = Result<T, RewardsError>;

#[derive(Error, Debug)]
pub enum RewardsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
