use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("BSON: {0}")]
    Bson(String),

    #[error("Encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("Decode error: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("WAL corrupt at offset {offset}: {reason}")]
    WalCorrupt { offset: u64, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Malformed filter set: {0}")]
    FilterSet(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Collection not found: {0}")]
    NoSuchCollection(String),
}

impl AppError {
    /// Short machine-friendly label used in error-log entries.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Json(_) => "json",
            Self::Bson(_) => "bson",
            Self::Encode(_) | Self::Decode(_) => "codec",
            Self::Csv(_) => "csv",
            Self::Storage(_) => "storage",
            Self::WalCorrupt { .. } => "wal",
            Self::InvalidInput(_) => "invalid_input",
            Self::FilterSet(_) => "filter_set",
            Self::Config(_) => "config",
            Self::NoSuchCollection(_) => "no_such_collection",
        }
    }
}
