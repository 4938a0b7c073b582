use crate::document::json::bson_to_json;
use crate::document::types::Metadata;
use crate::types::RecordId;
use bson::{Bson, Document as BsonDocument};
use serde_json::{Map, Value};

/// Key under which the record identifier is rendered.
pub const ID_KEY: &str = "_id";

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: RecordId,
    pub data: BsonDocument,
    pub metadata: Metadata,
}

impl Document {
    /// Wraps `data` in a fresh record with a new identifier and current timestamps.
    /// A caller-supplied `_id` key is dropped; identifiers are assigned by the store.
    #[must_use]
    pub fn new(mut data: BsonDocument) -> Self {
        data.remove(ID_KEY);
        Self { id: RecordId::new(), data, metadata: Metadata::new() }
    }

    #[must_use]
    pub const fn from_parts(id: RecordId, data: BsonDocument, metadata: Metadata) -> Self {
        Self { id, data, metadata }
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Bson> {
        self.data.get(field)
    }

    /// Full record as JSON: `_id`, every stored field, then `createdAt` / `updatedAt`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut out = self.row_map();
        out.insert("createdAt".into(), Value::String(self.metadata.created_at.0.to_rfc3339()));
        out.insert("updatedAt".into(), Value::String(self.metadata.updated_at.0.to_rfc3339()));
        Value::Object(out)
    }

    /// Grid row: `_id` plus whatever fields survived projection.
    #[must_use]
    pub fn to_row_json(&self) -> Value {
        Value::Object(self.row_map())
    }

    fn row_map(&self) -> Map<String, Value> {
        let mut out = Map::new();
        out.insert(ID_KEY.into(), Value::String(self.id.to_string()));
        for (k, v) in &self.data {
            out.insert(k.clone(), bson_to_json(v));
        }
        out
    }
}
