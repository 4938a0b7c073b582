use crate::document::Document;
use crate::types::RecordId;
use crate::wal::Wal;
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};

/// Documents keyed by id, plus the order they were inserted in.
/// Insertion order is the collection's natural order.
#[derive(Debug, Default)]
pub(crate) struct State {
    pub(crate) docs: HashMap<RecordId, Document>,
    pub(crate) order: Vec<RecordId>,
}

impl State {
    pub(crate) fn push(&mut self, doc: Document) {
        if self.docs.insert(doc.id, doc.clone()).is_none() {
            self.order.push(doc.id);
        }
    }

    pub(crate) fn remove(&mut self, id: &RecordId) -> Option<Document> {
        let removed = self.docs.remove(id)?;
        self.order.retain(|x| x != id);
        Some(removed)
    }

    /// Removes every listed id in one pass over the order; returns how many were present.
    pub(crate) fn remove_many(&mut self, ids: &[RecordId]) -> usize {
        let gone: HashSet<RecordId> =
            ids.iter().filter(|id| self.docs.remove(*id).is_some()).copied().collect();
        if !gone.is_empty() {
            self.order.retain(|id| !gone.contains(id));
        }
        gone.len()
    }

    /// Drops order entries whose document is gone.
    pub(crate) fn compact_order(&mut self) {
        let docs = &self.docs;
        self.order.retain(|id| docs.contains_key(id));
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Document> {
        self.order.iter().filter_map(|id| self.docs.get(id))
    }
}

pub struct Collection {
    pub(crate) name: String,
    pub(crate) state: RwLock<State>,
    pub(crate) wal: Option<Mutex<Wal>>,
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name)
            .field("len", &self.len())
            .field("durable", &self.wal.is_some())
            .finish()
    }
}

impl Collection {
    /// A collection that lives only as long as the process.
    #[must_use]
    pub fn in_memory(name: &str) -> Self {
        Self { name: name.to_string(), state: RwLock::new(State::default()), wal: None }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_durable(&self) -> bool {
        self.wal.is_some()
    }
}
