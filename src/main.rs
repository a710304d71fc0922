use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use spm_core::{config::store_backend_from_env_value, CoreConfig, StoreBackend};

/// Main entry point for the SPM application
///
/// Resolves configuration once, opens the document store and serves the REST API and
/// HTML pages.
///
/// # Environment Variables
/// - `SPM_REST_ADDR`: server address (default: "0.0.0.0:3000")
/// - `SPM_STORE`: document store backend, `file` or `memory` (default: "file")
/// - `PATIENT_DATA_DIR`: root directory of the file store (default: "patient_data")
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the store backend is unknown or the patient data directory is unusable,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("spm_run=info".parse()?)
                .add_directive("spm_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("SPM_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let store_backend = store_backend_from_env_value(std::env::var("SPM_STORE").ok())?;
    let patient_data_dir = std::env::var("PATIENT_DATA_DIR")
        .unwrap_or_else(|_| spm_core::DEFAULT_PATIENT_DATA_DIR.into());

    let cfg = CoreConfig::new(PathBuf::from(patient_data_dir), store_backend);
    let store = match cfg.open_store() {
        Ok(store) => store,
        Err(e) => anyhow::bail!("Patient store is not usable: {}", e),
    };

    match cfg.store_backend() {
        StoreBackend::File => tracing::info!(
            "++ Patient store: file ({})",
            cfg.patient_data_dir().display()
        ),
        StoreBackend::Memory => tracing::info!("++ Patient store: memory (not persisted)"),
    }
    tracing::info!("++ Starting SPM REST on {}", rest_addr);

    let app = api_rest::router(AppState::new(store));

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
