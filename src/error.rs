use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("FireCloud API error: {0}")]
    RemoteService(String),

    #[error("Missing metadata field: {0}")]
    MissingField(String),

    #[error("Cost estimation error: {0}")]
    CostEstimation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
