//! # API Shared
//!
//! Shared response types for the SPM HTTP surface.
//!
//! Contains:
//! - JSON bodies returned by the CRUD endpoints (`MessageRes`, `ErrorRes`)
//! - A documentation-only schema of the nominal patient fields (`PatientRecordSchema`)
//! - The `HealthService` liveness check
//!
//! Every type derives `utoipa::ToSchema` so it can appear in the OpenAPI document.

pub mod health;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use health::HealthService;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Success body for register, update and delete.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageRes {
    pub message: String,
}

impl MessageRes {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failure body for the JSON endpoints.
///
/// `details` carries the raw text of the underlying failure and is omitted for plain
/// not-found responses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorRes {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// The fields a registered record conventionally carries.
///
/// Records are open mappings: updates may add any other field, and every value is stored
/// as submitted. This type exists only to document the usual shape.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PatientRecordSchema {
    pub patient_id: String,
    pub name: Option<String>,
    pub aadhaar: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    /// Conventionally `inpatient` or `outpatient`.
    pub status: Option<String>,
    pub ward: Option<String>,
}
