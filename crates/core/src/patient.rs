//! Patient record lifecycle.
//!
//! [`PatientService`] is the only way the rest of the system touches patient documents.
//! Each operation maps to exactly one document-store call:
//!
//! | Operation  | Store call    | Miss        |
//! |------------|---------------|-------------|
//! | `register` | `insert_one`  | n/a         |
//! | `list_all` | `find`        | n/a         |
//! | `get`      | `find_one`    | `NotFound`  |
//! | `update`   | `update_one`  | `NotFound`  |
//! | `delete`   | `delete_one`  | `NotFound`  |
//!
//! No field is validated, nothing is cached and nothing is retried. Concurrent writers to
//! the same record race at the store; the last write wins.

use crate::constants::PATIENT_ID_FIELD;
use crate::error::{PatientError, PatientResult};
use crate::record::{Fields, PatientRecord};
use crate::store::{DocumentStore, Filter, Projection};
use serde_json::Value;
use spm_uuid::PatientId;
use std::sync::Arc;

/// Pure patient data operations - no API concerns
#[derive(Clone)]
pub struct PatientService {
    store: Arc<dyn DocumentStore>,
}

impl PatientService {
    /// Creates a service over the given document store.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Registers a new patient.
    ///
    /// The record is the freshly generated `patient_id` followed by `fields` verbatim. A
    /// `patient_id` supplied in `fields` is ignored in favour of the generated one.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::StorageUnavailable`] if the document cannot be stored.
    pub fn register(&self, fields: Fields) -> PatientResult<PatientId> {
        let patient_id = PatientId::generate();

        let mut doc = Fields::new();
        doc.insert(
            PATIENT_ID_FIELD.into(),
            Value::String(patient_id.to_string()),
        );
        for (key, value) in fields {
            if key != PATIENT_ID_FIELD {
                doc.insert(key, value);
            }
        }

        self.store.insert_one(doc)?;
        tracing::info!("registered patient {}", patient_id);
        Ok(patient_id)
    }

    /// Returns every stored record, without store-internal fields, in no guaranteed order.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::StorageUnavailable`] if the store cannot be read.
    pub fn list_all(&self) -> PatientResult<Vec<PatientRecord>> {
        let docs = self
            .store
            .find(&Filter::All, Projection::ExcludeInternalId)?;
        Ok(docs.into_iter().map(PatientRecord::from_fields).collect())
    }

    /// Returns the record whose `patient_id` equals `patient_id` exactly.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::NotFound`] if no record matches, or
    /// [`PatientError::StorageUnavailable`] if the store cannot be read.
    pub fn get(&self, patient_id: &str) -> PatientResult<PatientRecord> {
        self.store
            .find_one(&by_id(patient_id), Projection::ExcludeInternalId)?
            .map(PatientRecord::from_fields)
            .ok_or_else(|| PatientError::NotFound(patient_id.to_string()))
    }

    /// Merges `fields` into the matching record. Fields not listed are left untouched;
    /// listed fields are overwritten or added, with no whitelist.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::NotFound`] if no record matches, or
    /// [`PatientError::StorageUnavailable`] if the store rejects or cannot apply the update.
    pub fn update(&self, patient_id: &str, fields: Fields) -> PatientResult<()> {
        let result = self.store.update_one(&by_id(patient_id), fields)?;
        if result.matched_count == 0 {
            return Err(PatientError::NotFound(patient_id.to_string()));
        }
        Ok(())
    }

    /// Removes the matching record. Deleting twice yields `NotFound` the second time.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::NotFound`] if no record matches, or
    /// [`PatientError::StorageUnavailable`] if the store cannot apply the delete.
    pub fn delete(&self, patient_id: &str) -> PatientResult<()> {
        let result = self.store.delete_one(&by_id(patient_id))?;
        if result.deleted_count == 0 {
            return Err(PatientError::NotFound(patient_id.to_string()));
        }
        tracing::info!("deleted patient {}", patient_id);
        Ok(())
    }
}

fn by_id(patient_id: &str) -> Filter {
    Filter::eq(PATIENT_ID_FIELD, patient_id)
}
