//! In-process document store.
//!
//! Keeps documents in insertion order behind a mutex. Useful for tests and for running the
//! service without any persistent storage (`SPM_STORE=memory`); contents are lost on exit.

use super::{
    assign_internal_id, merge_fields, DeleteResult, Document, DocumentStore, Filter,
    InsertOneResult, Projection, UpdateResult,
};
use crate::constants::INTERNAL_ID_FIELD;
use crate::error::{StoreError, StoreResult};
use serde_json::Value;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Mutex<Vec<Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Vec<Document>>> {
        self.docs
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".into()))
    }
}

impl DocumentStore for MemoryStore {
    fn insert_one(&self, mut doc: Document) -> StoreResult<InsertOneResult> {
        let id = assign_internal_id(&mut doc)?.to_string();
        let mut docs = self.lock()?;
        if docs
            .iter()
            .any(|d| d.get(INTERNAL_ID_FIELD).and_then(Value::as_str) == Some(id.as_str()))
        {
            return Err(StoreError::DuplicateKey(id));
        }
        docs.push(doc);
        Ok(InsertOneResult { inserted_id: id })
    }

    fn find(&self, filter: &Filter, projection: Projection) -> StoreResult<Vec<Document>> {
        let docs = self.lock()?;
        Ok(docs
            .iter()
            .filter(|d| filter.matches(d))
            .map(|d| projection.apply(d.clone()))
            .collect())
    }

    fn find_one(&self, filter: &Filter, projection: Projection) -> StoreResult<Option<Document>> {
        let docs = self.lock()?;
        Ok(docs
            .iter()
            .find(|d| filter.matches(d))
            .map(|d| projection.apply(d.clone())))
    }

    fn update_one(&self, filter: &Filter, set: Document) -> StoreResult<UpdateResult> {
        let mut docs = self.lock()?;
        match docs.iter_mut().find(|d| filter.matches(d)) {
            Some(doc) => {
                merge_fields(doc, set)?;
                Ok(UpdateResult { matched_count: 1 })
            }
            None => Ok(UpdateResult { matched_count: 0 }),
        }
    }

    fn delete_one(&self, filter: &Filter) -> StoreResult<DeleteResult> {
        let mut docs = self.lock()?;
        match docs.iter().position(|d| filter.matches(d)) {
            Some(index) => {
                docs.remove(index);
                Ok(DeleteResult { deleted_count: 1 })
            }
            None => Ok(DeleteResult { deleted_count: 0 }),
        }
    }
}
