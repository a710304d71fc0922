//! Constants used throughout the SPM core crate.
//!
//! Field names, reserved status values and storage defaults live here so the services,
//! the stores and the API layer agree on them.

/// Default directory for patient data storage when no explicit directory is configured.
pub const DEFAULT_PATIENT_DATA_DIR: &str = "patient_data";

/// File extension for documents written by the file store.
pub const DOCUMENT_EXTENSION: &str = "json";

/// Public lookup key of a patient record.
pub const PATIENT_ID_FIELD: &str = "patient_id";

/// Store-internal document identifier. Never returned to callers.
pub const INTERNAL_ID_FIELD: &str = "_id";

pub const STATUS_FIELD: &str = "status";

pub const WARD_FIELD: &str = "ward";

/// Status value counted as an inpatient on the dashboard.
pub const INPATIENT_STATUS: &str = "inpatient";

/// Status value counted as an outpatient on the dashboard.
pub const OUTPATIENT_STATUS: &str = "outpatient";

/// Ward label used for records without a ward.
pub const UNASSIGNED_WARD: &str = "Unassigned";

/// Fields captured by the registration form, in the order they are stored.
pub const REGISTRATION_FIELDS: [&str; 6] = ["name", "aadhaar", "age", "gender", "status", "ward"];
