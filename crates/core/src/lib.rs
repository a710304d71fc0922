//! # SPM Core
//!
//! Core business logic for the Smart Patient Management service.
//!
//! This crate contains pure data operations:
//! - The open patient record shape ([`PatientRecord`])
//! - The document-store collaborator ([`store::DocumentStore`]) with file-backed and
//!   in-memory implementations
//! - The patient record lifecycle ([`PatientService`])
//! - Dashboard aggregation ([`DashboardService`])
//!
//! **No API concerns**: HTTP routing, HTML rendering and response shapes belong in
//! `api-rest` and `api-shared`.

pub mod config;
pub mod constants;
pub mod dashboard;
pub mod error;
pub mod patient;
pub mod record;
pub mod store;

pub use config::{CoreConfig, StoreBackend};
pub use constants::DEFAULT_PATIENT_DATA_DIR;
pub use dashboard::{DashboardService, DashboardSummary, WardCounts};
pub use error::{PatientError, PatientResult, StoreError, StoreResult};
pub use patient::PatientService;
pub use record::{Fields, PatientRecord};
pub use spm_uuid::PatientId;
