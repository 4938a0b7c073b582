//! The storage collaborator the service layer is written against.

use crate::collection::Collection;
use crate::document::Document;
use crate::errors::AppError;
use crate::query::{FindOptions, Predicate, count_docs, delete_docs, find_docs};
use crate::types::RecordId;

/// Record storage as seen by request handling. Every method may fail; callers convert failures
/// into error responses.
pub trait RecordStore: Send + Sync {
    fn count(&self, pred: &Predicate) -> Result<u64, AppError>;
    fn find(&self, pred: &Predicate, opts: &FindOptions) -> Result<Vec<Document>, AppError>;
    fn find_by_id(&self, id: &RecordId) -> Result<Option<Document>, AppError>;
    fn delete_by_id(&self, id: &RecordId) -> Result<bool, AppError>;
    fn delete_many(&self, pred: &Predicate) -> Result<u64, AppError>;
    fn insert_many(&self, docs: Vec<Document>) -> Result<usize, AppError>;
    /// Removes every record; returns how many were removed.
    fn clear(&self) -> Result<u64, AppError>;
}

impl RecordStore for Collection {
    fn count(&self, pred: &Predicate) -> Result<u64, AppError> {
        Ok(count_docs(self, pred))
    }

    fn find(&self, pred: &Predicate, opts: &FindOptions) -> Result<Vec<Document>, AppError> {
        Ok(find_docs(self, pred, opts))
    }

    fn find_by_id(&self, id: &RecordId) -> Result<Option<Document>, AppError> {
        Ok(Self::find_by_id(self, id))
    }

    fn delete_by_id(&self, id: &RecordId) -> Result<bool, AppError> {
        Self::delete_by_id(self, id)
    }

    fn delete_many(&self, pred: &Predicate) -> Result<u64, AppError> {
        delete_docs(self, pred)
    }

    fn insert_many(&self, docs: Vec<Document>) -> Result<usize, AppError> {
        Self::insert_many(self, docs)
    }

    fn clear(&self) -> Result<u64, AppError> {
        Self::clear(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{PageRequest, fetch_page};
    use bson::doc;

    #[test]
    fn collection_serves_pages_through_the_trait() {
        let col = Collection::in_memory("datas");
        let store: &dyn RecordStore = &col;
        store
            .insert_many((0..25).map(|i| Document::new(doc! {"Brand": format!("b{i}")})).collect())
            .unwrap();
        let page = PageRequest { page: 3, page_size: 10, sort: None };
        let res = fetch_page(store, &Predicate::True, &page, Some(&["Brand"][..])).unwrap();
        assert_eq!(res.rows.len(), 5);
        assert_eq!((res.total_count, res.total_pages), (25, 3));
    }

    #[test]
    fn empty_store_yields_zero_pages() {
        let col = Collection::in_memory("datas");
        let res = fetch_page(&col, &Predicate::True, &PageRequest::default(), None).unwrap();
        assert!(res.rows.is_empty());
        assert_eq!((res.total_count, res.total_pages), (0, 0));
    }
}
