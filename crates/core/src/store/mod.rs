//! Document-store collaborator.
//!
//! The services never talk to a concrete database. They hold an `Arc<dyn DocumentStore>`
//! handed to them at construction time, which lets the process pick a backend at startup
//! and lets tests substitute an in-memory store.
//!
//! The contract mirrors a typical document database client:
//!
//! - every document carries a store-internal `_id`, assigned on insert when absent;
//! - [`Filter`] selects documents by exact equality on one top-level field;
//! - [`Projection`] controls whether `_id` is returned to the caller;
//! - [`DocumentStore::update_one`] merges fields into the first match (a `$set`), and
//!   reports how many documents matched rather than failing when none did.
//!
//! Any failure to reach or use the backing storage is reported as a [`StoreError`].

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::constants::INTERNAL_ID_FIELD;
use crate::error::{StoreError, StoreResult};
use serde_json::{Map, Value};
use spm_uuid::ShardableUuid;

/// A stored document, including any store-internal fields.
pub type Document = Map<String, Value>;

/// Selects documents by exact equality on a single top-level field.
#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    All,
    Eq(String, Value),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq(field, value) => doc.get(field) == Some(value),
        }
    }
}

/// Which fields a read returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Projection {
    Full,
    ExcludeInternalId,
}

impl Projection {
    pub fn apply(self, doc: Document) -> Document {
        match self {
            Projection::Full => doc,
            Projection::ExcludeInternalId => doc
                .into_iter()
                .filter(|(key, _)| key != INTERNAL_ID_FIELD)
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InsertOneResult {
    pub inserted_id: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdateResult {
    pub matched_count: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeleteResult {
    pub deleted_count: u64,
}

/// Single-document operations over one collection.
pub trait DocumentStore: Send + Sync {
    fn insert_one(&self, doc: Document) -> StoreResult<InsertOneResult>;

    /// Every document matching `filter`, in no particular order.
    fn find(&self, filter: &Filter, projection: Projection) -> StoreResult<Vec<Document>>;

    fn find_one(&self, filter: &Filter, projection: Projection) -> StoreResult<Option<Document>>;

    /// Merges `set` into the first document matching `filter`.
    fn update_one(&self, filter: &Filter, set: Document) -> StoreResult<UpdateResult>;

    fn delete_one(&self, filter: &Filter) -> StoreResult<DeleteResult>;
}

/// Returns the document's internal id, assigning a fresh one when absent.
pub(crate) fn assign_internal_id(doc: &mut Document) -> StoreResult<ShardableUuid> {
    match doc.get(INTERNAL_ID_FIELD) {
        None => {
            let id = ShardableUuid::new();
            doc.insert(INTERNAL_ID_FIELD.into(), Value::String(id.to_string()));
            Ok(id)
        }
        Some(Value::String(s)) => ShardableUuid::parse(s)
            .map_err(|e| StoreError::InvalidInternalId(e.to_string())),
        Some(other) => Err(StoreError::InvalidInternalId(other.to_string())),
    }
}

/// Applies a `$set` style merge: listed fields are overwritten or added, others untouched.
pub(crate) fn merge_fields(doc: &mut Document, set: Document) -> StoreResult<()> {
    if let Some(new_id) = set.get(INTERNAL_ID_FIELD) {
        if doc.get(INTERNAL_ID_FIELD) != Some(new_id) {
            return Err(StoreError::ImmutableField(INTERNAL_ID_FIELD.into()));
        }
    }
    for (key, value) in set {
        doc.insert(key, value);
    }
    Ok(())
}
