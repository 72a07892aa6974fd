use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeStatsError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache store error: {0}")]
    Store(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

pub type Result<T> = std::result::Result<T, TreeStatsError>;
