use super::core::{Collection, State};
use crate::document::{Document, Metadata};
use crate::errors::AppError;
use crate::types::{RecordId, SerializableDateTime};
use crate::wal::{Wal, WalOp, WalRecord};
use bson::Bson;
use parking_lot::{Mutex, RwLock};
use std::path::Path;

impl Collection {
    /// Opens a durable collection, replaying the log at `wal_path` to rebuild its contents.
    pub fn open<P: AsRef<Path>>(name: &str, wal_path: P) -> Result<Self, AppError> {
        let wal_path = wal_path.as_ref();
        let mut state = State::default();
        let (wal, records) = Wal::recover(wal_path)?;
        let replayed = records.len();
        for rec in records {
            match rec.op {
                WalOp::Insert { id, created_ms, updated_ms, body_json } => {
                    let data = decode_body(&body_json)?;
                    let metadata = Metadata {
                        created_at: SerializableDateTime::from_millis(created_ms),
                        updated_at: SerializableDateTime::from_millis(updated_ms),
                    };
                    state.push(Document::from_parts(id, data, metadata));
                }
                WalOp::Delete { id } => {
                    state.docs.remove(&id);
                }
            }
        }
        state.compact_order();
        log::info!(
            "collection {name}: replayed {replayed} wal records, {} documents live",
            state.order.len()
        );
        Ok(Self { name: name.to_string(), state: RwLock::new(state), wal: Some(Mutex::new(wal)) })
    }

    pub fn insert(&self, doc: Document) -> Result<RecordId, AppError> {
        let id = doc.id;
        self.insert_many(vec![doc])?;
        Ok(id)
    }

    /// Inserts all documents or none: the log append happens before any document becomes visible.
    pub fn insert_many(&self, docs: Vec<Document>) -> Result<usize, AppError> {
        let mut state = self.state.write();
        if let Some(wal) = &self.wal {
            let recs = docs.iter().map(insert_record).collect::<Result<Vec<_>, _>>()?;
            wal.lock().append_batch(&recs)?;
        }
        let n = docs.len();
        for d in docs {
            state.push(d);
        }
        log::debug!("collection {}: inserted {n}", self.name);
        Ok(n)
    }

    #[must_use]
    pub fn find_by_id(&self, id: &RecordId) -> Option<Document> {
        self.state.read().docs.get(id).cloned()
    }

    pub fn delete_by_id(&self, id: &RecordId) -> Result<bool, AppError> {
        let mut state = self.state.write();
        if !state.docs.contains_key(id) {
            return Ok(false);
        }
        if let Some(wal) = &self.wal {
            wal.lock().append(&WalRecord::now(WalOp::Delete { id: *id }))?;
        }
        state.remove(id);
        Ok(true)
    }

    /// Deletes every document matching `pred`; returns how many were removed.
    pub fn delete_where<F>(&self, pred: F) -> Result<u64, AppError>
    where
        F: Fn(&Document) -> bool,
    {
        let mut state = self.state.write();
        let ids: Vec<RecordId> = state.iter().filter(|d| pred(d)).map(|d| d.id).collect();
        if ids.is_empty() {
            return Ok(0);
        }
        if let Some(wal) = &self.wal {
            let recs: Vec<WalRecord> =
                ids.iter().map(|id| WalRecord::now(WalOp::Delete { id: *id })).collect();
            wal.lock().append_batch(&recs)?;
        }
        Ok(state.remove_many(&ids) as u64)
    }

    /// Removes everything and resets the log.
    pub fn clear(&self) -> Result<u64, AppError> {
        let mut state = self.state.write();
        if let Some(wal) = &self.wal {
            wal.lock().truncate()?;
        }
        let n = state.order.len() as u64;
        *state = State::default();
        Ok(n)
    }

    /// Visits documents in natural order under a shared lock.
    pub fn scan<F>(&self, mut f: F)
    where
        F: FnMut(&Document),
    {
        let state = self.state.read();
        for d in state.iter() {
            f(d);
        }
    }

    /// Clones every document in natural order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Document> {
        self.state.read().iter().cloned().collect()
    }
}

fn insert_record(doc: &Document) -> Result<WalRecord, AppError> {
    let body = Bson::Document(doc.data.clone()).into_canonical_extjson();
    Ok(WalRecord::now(WalOp::Insert {
        id: doc.id,
        created_ms: doc.metadata.created_at.millis(),
        updated_ms: doc.metadata.updated_at.millis(),
        body_json: serde_json::to_vec(&body)?,
    }))
}

fn decode_body(bytes: &[u8]) -> Result<bson::Document, AppError> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    match Bson::try_from(value).map_err(|e| AppError::Bson(e.to_string()))? {
        Bson::Document(d) => Ok(d),
        other => Err(AppError::Bson(format!("expected document body, got {other:?}"))),
    }
}
