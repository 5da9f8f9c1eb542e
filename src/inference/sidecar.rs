use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{BackendError, InferenceOutput, ModelBackend};

/// Probes get their own short bound so a wedged sidecar cannot stall the
/// health path.
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// HTTP client for the model sidecar.
///
/// Inference calls carry no client-side timeout; the gateway races them
/// against its own deadline and dropping the future cancels the request.
pub struct SidecarClient {
    http_client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct InferRequest<'a> {
    x: &'a [[f32; 9]],
}

impl SidecarClient {
    /// Accepts either the service base URL or a full `/infer` URL; both
    /// normalize to the same endpoint pair.
    pub fn new(base_url: &str) -> Self {
        let trimmed = base_url.trim_end_matches('/');
        let base = trimmed.strip_suffix("/infer").unwrap_or(trimmed);
        Self {
            http_client: Client::new(),
            base_url: base.to_string(),
        }
    }

    fn infer_url(&self) -> String {
        format!("{}/infer", self.base_url)
    }

    fn health_url(&self) -> String {
        format!("{}/healthz", self.base_url)
    }
}

#[async_trait]
impl ModelBackend for SidecarClient {
    async fn infer(&self, window: &[[f32; 9]]) -> Result<InferenceOutput, BackendError> {
        let url = self.infer_url();
        tracing::debug!("Posting {} rows to {}", window.len(), url);

        let response = self
            .http_client
            .post(&url)
            .json(&InferRequest { x: window })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout
                } else {
                    BackendError::Request(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }

        response
            .json::<InferenceOutput>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn health_check(&self) -> Result<(), BackendError> {
        let response = self
            .http_client
            .get(self.health_url())
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout
                } else {
                    BackendError::Request(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(BackendError::Status(status.as_u16()))
        }
    }
}
