//! Error types for the core crate.
//!
//! Two layers exist:
//!
//! - [`StoreError`] is raised by a [`DocumentStore`](crate::store::DocumentStore)
//!   implementation and describes what went wrong inside the store.
//! - [`PatientError`] is what the services return. Callers only ever need to tell
//!   "the record does not exist" apart from "the store could not serve the request", so
//!   every store failure collapses into [`PatientError::StorageUnavailable`].

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document store unreachable: {0}")]
    Unavailable(String),
    #[error("failed to read document {path}: {source}", path = path.display())]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write document {path}: {source}", path = path.display())]
    Write {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize document: {0}")]
    Serialization(serde_json::Error),
    #[error("field '{0}' is immutable")]
    ImmutableField(String),
    #[error("invalid internal document id: {0}")]
    InvalidInternalId(String),
    #[error("duplicate internal document id: {0}")]
    DuplicateKey(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StoreError),
    #[error("patient not found: {0}")]
    NotFound(String),
}

pub type PatientResult<T> = std::result::Result<T, PatientError>;

impl PatientError {
    /// Raw text of the underlying failure, without the error kind prefix.
    pub fn details(&self) -> String {
        match self {
            PatientError::StorageUnavailable(source) => source.to_string(),
            PatientError::NotFound(patient_id) => patient_id.clone(),
        }
    }
}
