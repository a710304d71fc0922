//! Request handlers.
//!
//! Each handler extracts its input, makes one call into `spm-core` and maps the result
//! onto the HTTP surface:
//!
//! - JSON endpoints answer failures with `ErrorRes` (`404` for an unknown id, `500` for
//!   everything else, with the raw failure text in `details`).
//! - The dashboard answers failures with a plain-text message instead.

use crate::pages;
use crate::AppState;
use api_shared::{ErrorRes, HealthRes, HealthService, MessageRes};
use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        Form, Path, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use spm_core::constants::REGISTRATION_FIELDS;
use spm_core::{Fields, PatientError, PatientRecord};
use utoipa::ToSchema;

/// Failure of a JSON endpoint.
#[derive(Debug)]
pub(crate) enum ApiError {
    Patient(PatientError),
    InvalidBody(String),
}

impl From<PatientError> for ApiError {
    fn from(err: PatientError) -> Self {
        ApiError::Patient(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Patient(PatientError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, ErrorRes::new("Patient not found"))
            }
            ApiError::Patient(err @ PatientError::StorageUnavailable(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorRes::with_details("Failed to reach the patient store", err.details()),
            ),
            ApiError::InvalidBody(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorRes::with_details("Failed to read the request body", details),
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// Fields submitted by the registration form.
///
/// Every field is optional; a missing field is stored as `null`.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct RegisterForm {
    pub name: Option<String>,
    pub aadhaar: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub status: Option<String>,
    pub ward: Option<String>,
}

impl RegisterForm {
    /// The six registration fields, in storage order.
    pub fn into_fields(self) -> Fields {
        let values = [
            self.name,
            self.aadhaar,
            self.age,
            self.gender,
            self.status,
            self.ward,
        ];
        REGISTRATION_FIELDS
            .iter()
            .zip(values)
            .map(|(key, value)| (key.to_string(), value.map_or(Value::Null, Value::String)))
            .collect()
    }
}

/// Registration form page.
pub(crate) async fn home() -> Html<&'static str> {
    Html(pages::REGISTRATION_PAGE)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Reports process liveness only; the document store is not contacted.
#[axum::debug_handler]
pub(crate) async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/patients",
    responses(
        (status = 200, description = "Every stored patient record", body = [api_shared::PatientRecordSchema]),
        (status = 500, description = "Patient store unavailable", body = ErrorRes)
    )
)]
/// List all patients in the system
///
/// # Errors
/// Returns `500 Internal Server Error` if the patient store cannot be read.
#[axum::debug_handler]
pub(crate) async fn list_patients(
    State(state): State<AppState>,
) -> Result<Json<Vec<PatientRecord>>, ApiError> {
    match state.patient_service.list_all() {
        Ok(records) => Ok(Json(records)),
        Err(e) => {
            tracing::error!("List patients error: {:?}", e);
            Err(e.into())
        }
    }
}

#[utoipa::path(
    get,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient id returned at registration")),
    responses(
        (status = 200, description = "The patient record", body = api_shared::PatientRecordSchema),
        (status = 404, description = "No patient with this id", body = ErrorRes),
        (status = 500, description = "Patient store unavailable", body = ErrorRes)
    )
)]
/// Fetch a single patient record by id
#[axum::debug_handler]
pub(crate) async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PatientRecord>, ApiError> {
    state.patient_service.get(&id).map(Json).map_err(|e| {
        if !matches!(e, PatientError::NotFound(_)) {
            tracing::error!("Get patient error: {:?}", e);
        }
        e.into()
    })
}

#[utoipa::path(
    post,
    path = "/register",
    request_body(content = RegisterForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 201, description = "Patient registered; the message includes the new id", body = MessageRes),
        (status = 500, description = "Unreadable form body or patient store unavailable", body = ErrorRes)
    )
)]
/// Register a new patient from the registration form
///
/// The server generates the patient id; every form field is stored as submitted.
#[axum::debug_handler]
pub(crate) async fn register_patient(
    State(state): State<AppState>,
    form: Result<Form<RegisterForm>, FormRejection>,
) -> Result<(StatusCode, Json<MessageRes>), ApiError> {
    let Form(form) = form.map_err(|rejection| {
        tracing::error!("Register patient body rejected: {}", rejection.body_text());
        ApiError::InvalidBody(rejection.body_text())
    })?;

    match state.patient_service.register(form.into_fields()) {
        Ok(patient_id) => Ok((
            StatusCode::CREATED,
            Json(MessageRes::new(format!(
                "Patient Registered! Unique ID: {}",
                patient_id
            ))),
        )),
        Err(e) => {
            tracing::error!("Register patient error: {:?}", e);
            Err(e.into())
        }
    }
}

#[utoipa::path(
    put,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient id returned at registration")),
    request_body(
        content = api_shared::PatientRecordSchema,
        description = "JSON object of fields to merge; any field name is accepted"
    ),
    responses(
        (status = 200, description = "Record updated", body = MessageRes),
        (status = 404, description = "No patient with this id", body = ErrorRes),
        (status = 500, description = "Unreadable body or patient store unavailable", body = ErrorRes)
    )
)]
/// Merge the given fields into an existing patient record
///
/// Fields not present in the body are left untouched.
#[axum::debug_handler]
pub(crate) async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Fields>, JsonRejection>,
) -> Result<Json<MessageRes>, ApiError> {
    let Json(fields) = payload.map_err(|rejection| {
        tracing::error!("Update patient body rejected: {}", rejection.body_text());
        ApiError::InvalidBody(rejection.body_text())
    })?;

    match state.patient_service.update(&id, fields) {
        Ok(()) => Ok(Json(MessageRes::new("Patient record updated successfully"))),
        Err(e) => {
            if !matches!(e, PatientError::NotFound(_)) {
                tracing::error!("Update patient error: {:?}", e);
            }
            Err(e.into())
        }
    }
}

#[utoipa::path(
    delete,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient id returned at registration")),
    responses(
        (status = 200, description = "Record deleted", body = MessageRes),
        (status = 404, description = "No patient with this id", body = ErrorRes),
        (status = 500, description = "Patient store unavailable", body = ErrorRes)
    )
)]
/// Delete a patient record
#[axum::debug_handler]
pub(crate) async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageRes>, ApiError> {
    match state.patient_service.delete(&id) {
        Ok(()) => Ok(Json(MessageRes::new("Patient record deleted successfully"))),
        Err(e) => {
            if !matches!(e, PatientError::NotFound(_)) {
                tracing::error!("Delete patient error: {:?}", e);
            }
            Err(e.into())
        }
    }
}

/// Dashboard page with in/out-patient and per-ward counts.
///
/// Failures are reported as a plain-text body rather than `ErrorRes`.
pub(crate) async fn dashboard(State(state): State<AppState>) -> Response {
    match state.dashboard_service.summarize() {
        Ok(summary) => Html(pages::dashboard_page(&summary)).into_response(),
        Err(e) => {
            tracing::error!("Dashboard error: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error loading dashboard: {}", e),
            )
                .into_response()
        }
    }
}
