//! # API REST
//!
//! REST API implementation for SPM.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - The registration form and dashboard HTML pages
//! - OpenAPI documentation for the JSON endpoints
//! - REST-specific concerns (JSON/form extraction, error bodies, CORS)
//!
//! Uses `api-shared` for response types and `spm-core` for all data operations.

#![warn(rust_2018_idioms)]

mod handlers;
mod pages;

use axum::{routing::get, routing::post, Json, Router};
use spm_core::store::DocumentStore;
use spm_core::{DashboardService, PatientService};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;

pub use handlers::RegisterForm;

/// Application state shared across REST API handlers
///
/// Both services sit on the same injected document store.
#[derive(Clone)]
pub struct AppState {
    patient_service: PatientService,
    dashboard_service: DashboardService,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let patient_service = PatientService::new(store);
        Self {
            dashboard_service: DashboardService::new(patient_service.clone()),
            patient_service,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::list_patients,
        handlers::get_patient,
        handlers::register_patient,
        handlers::update_patient,
        handlers::delete_patient,
    ),
    components(schemas(
        api_shared::HealthRes,
        api_shared::MessageRes,
        api_shared::ErrorRes,
        api_shared::PatientRecordSchema,
        handlers::RegisterForm,
    ))
)]
pub struct ApiDoc;

/// Builds the full application router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/health", get(handlers::health))
        .route("/register", post(handlers::register_patient))
        .route("/patients", get(handlers::list_patients))
        .route(
            "/patients/:id",
            get(handlers::get_patient)
                .put(handlers::update_patient)
                .delete(handlers::delete_patient),
        )
        .route("/dashboard", get(handlers::dashboard))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
