use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrmBotError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Table not found: {0}")]
    MissingTable(String),

    #[error("Invalid column reference: {0}")]
    InvalidColumn(String),

    #[error("No setup value found for attribute: {0}")]
    Lookup(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Notification transport error: {0}")]
    Transport(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CrmBotError>;
