use crate::types::SerializableDateTime;
use serde::{Deserialize, Serialize};

/// Store-maintained timestamps carried alongside every record.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    pub created_at: SerializableDateTime,
    pub updated_at: SerializableDateTime,
}

impl Metadata {
    #[must_use]
    pub fn new() -> Self {
        let now = SerializableDateTime::now();
        Self { created_at: now, updated_at: now }
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self::new()
    }
}
