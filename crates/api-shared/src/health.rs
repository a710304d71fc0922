use crate::HealthRes;

/// Simple health service shared by every SPM entry point.
///
/// Reports liveness of the process only; it does not touch the document store.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Check health without creating an instance.
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is alive.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "SPM is alive".into(),
        }
    }
}
