//! Resilient model inference.
//!
//! This module provides:
//! - The `ModelBackend` trait and the HTTP sidecar client behind it
//! - A health tracker that throttles recovery probes after failures
//! - The gateway that races real inference against a timeout and falls
//!   back to stub output whenever the real path cannot answer

mod gateway;
mod health;
mod sidecar;

pub use gateway::InferenceGateway;
pub use health::HealthTracker;
pub use sidecar::SidecarClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Latent vector length the model contract fixes.
pub const LATENT_LEN: usize = 64;
/// Number of motif classes scored per analysis.
pub const MOTIF_COUNT: usize = 12;

/// Output of one analysis pass, real or stub.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceOutput {
    pub latent: Vec<f32>,
    pub motif_scores: Vec<f32>,
}

/// Ways a real inference attempt can fail. Every variant maps to a stable
/// class label used in logs and failure counters.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("inference call timed out")]
    Timeout,
    #[error("sidecar returned status {0}")]
    Status(u16),
    #[error("malformed inference response: {0}")]
    MalformedResponse(String),
    #[error("failed to decode inference response: {0}")]
    Decode(String),
    #[error("inference request failed: {0}")]
    Request(String),
}

impl BackendError {
    /// Stable label for this failure; HTTP failures carry the status code
    /// (`http_503`).
    pub fn class(&self) -> String {
        match self {
            BackendError::Timeout => "timeout".to_string(),
            BackendError::Status(code) => format!("http_{}", code),
            BackendError::MalformedResponse(_) => "malformed_response".to_string(),
            BackendError::Decode(_) => "decode_error".to_string(),
            BackendError::Request(_) => "unknown_error".to_string(),
        }
    }
}

/// A model capable of scoring IMU windows.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Score one window of 9-axis feature rows.
    async fn infer(&self, window: &[[f32; 9]]) -> Result<InferenceOutput, BackendError>;

    /// Cheap liveness probe, bounded independently of inference calls.
    async fn health_check(&self) -> Result<(), BackendError>;
}
