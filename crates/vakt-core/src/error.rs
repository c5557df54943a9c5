use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Unknown consent value: {0}")]
    UnknownConsent(String),

    #[error("Unknown storage area: {0}")]
    UnknownArea(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to encode record: {0}")]
    Encoding(String),

    #[error("Failed to decode record {0}: {1}")]
    Decoding(u64, String),

    #[error("Database error: {0}")]
    Database(String),
}
