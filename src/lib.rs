pub mod config;
pub mod error;
pub mod inference;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod routes;
pub mod session;
pub mod test_util;

pub use config::Config;
pub use error::ApiError;
pub use inference::{
    BackendError, HealthTracker, InferenceGateway, InferenceOutput, ModelBackend, SidecarClient,
};
pub use metrics::Metrics;
pub use models::{
    ImuSample, ImuWindow, Motif, MotifsResponse, SessionStartResponse, SessionStopResponse,
    SynchronyResponse,
};
pub use session::{SessionSnapshot, SessionStore, StoreError};

use std::sync::Arc;
use std::time::Instant;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub sessions: Arc<SessionStore>,
    pub backend: Arc<dyn ModelBackend>,
    pub gateway: Arc<InferenceGateway>,
    pub metrics: Arc<Metrics>,
    pub started_at: Instant,
}

impl AppState {
    /// Wire the full component graph from configuration. Tests use this too,
    /// pointing `model_backend_url` at a mock server.
    pub fn from_config(config: Config) -> Arc<Self> {
        let sessions = Arc::new(SessionStore::new(config.default_max_samples));
        let backend: Arc<dyn ModelBackend> =
            Arc::new(SidecarClient::new(&config.model_backend_url));
        let metrics = Arc::new(Metrics::new());
        let gateway = Arc::new(InferenceGateway::new(
            backend.clone(),
            HealthTracker::new(config.health_check_interval()),
            metrics.clone(),
            config.use_real_model,
            config.backend_timeout(),
        ));

        Arc::new(Self {
            config,
            sessions,
            backend,
            gateway,
            metrics,
            started_at: Instant::now(),
        })
    }
}
