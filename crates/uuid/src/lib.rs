//! Identifier and sharded-path utilities.
//!
//! Two kinds of identifier exist in SPM:
//!
//! - **Patient ids** ([`PatientId`]): the public lookup key of a patient record. They are
//!   random (v4) UUIDs rendered in the familiar hyphenated form, e.g.
//!   `550e8400-e29b-41d4-a716-446655440000`. Callers treat them as opaque strings.
//! - **Storage keys** ([`ShardableUuid`]): the store-internal `_id` of a document. These use
//!   a *canonical* representation of **32 lowercase hexadecimal characters** (no hyphens)
//!   and determine where a document lives on disk.
//!
//! ## Sharded layout
//! For a canonical key `k`, the file store writes the document to:
//! `parent_dir/<k[0..2]>/<k[2..4]>/<k>.json`
//!
//! Example:
//! `patient_data/55/0e/550e8400e29b41d4a716446655440000.json`
//!
//! This keeps directory fan-out small as the number of patients grows.

mod service;

pub use service::{PatientId, ShardableUuid, Uuid};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
