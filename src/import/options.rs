use std::path::PathBuf;
use std::str::FromStr;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedFormat {
    Auto,
    Csv,
    /// One JSON array holding every record.
    Json,
    /// One JSON object per line.
    Ndjson,
}

impl FromStr for SeedFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "ndjson" | "jsonl" => Ok(Self::Ndjson),
            other => Err(AppError::InvalidInput(format!("unknown seed format: {other}"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SeedOptions {
    pub format: SeedFormat,
    /// Keep existing records instead of clearing the collection first.
    pub append: bool,
    pub batch_size: usize,
    pub skip_errors: bool,
    pub delimiter: u8,
    /// Skipped rows are written here as NDJSON.
    pub error_sidecar: Option<PathBuf>,
    pub progress_every: Option<u64>,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            format: SeedFormat::Auto,
            append: false,
            batch_size: 1000,
            skip_errors: true,
            delimiter: b',',
            error_sidecar: None,
            progress_every: Some(1000),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub cleared: u64,
    pub inserted: u64,
    pub skipped: u64,
}
