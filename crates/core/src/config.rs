//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then used to build the services.
//! Request handlers never read process-wide environment variables.

use crate::store::{DocumentStore, FileStore, MemoryStore};
use crate::StoreError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown store backend '{0}' (expected 'file' or 'memory')")]
    UnknownStoreBackend(String),
    #[error("failed to open document store: {0}")]
    StoreOpen(#[from] StoreError),
}

/// Which document store the process runs against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StoreBackend {
    /// JSON documents under the patient data directory.
    #[default]
    File,
    /// Process-local store; contents are lost on exit.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(StoreBackend::File),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::UnknownStoreBackend(other.to_string())),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::File => f.write_str("file"),
            StoreBackend::Memory => f.write_str("memory"),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    patient_data_dir: PathBuf,
    store_backend: StoreBackend,
}

impl CoreConfig {
    pub fn new(patient_data_dir: PathBuf, store_backend: StoreBackend) -> Self {
        Self {
            patient_data_dir,
            store_backend,
        }
    }

    pub fn patient_data_dir(&self) -> &Path {
        &self.patient_data_dir
    }

    pub fn store_backend(&self) -> StoreBackend {
        self.store_backend
    }

    /// Opens the configured store, verifying the file store's directory is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::StoreOpen`] if the patient data directory cannot be created
    /// or read.
    pub fn open_store(&self) -> Result<Arc<dyn DocumentStore>, ConfigError> {
        match self.store_backend {
            StoreBackend::File => Ok(Arc::new(FileStore::open(&self.patient_data_dir)?)),
            StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        }
    }
}

/// Parse the store backend from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`StoreBackend::File`].
pub fn store_backend_from_env_value(value: Option<String>) -> Result<StoreBackend, ConfigError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(|v| v.parse::<StoreBackend>())
        .transpose()
        .map(Option::unwrap_or_default)
}
