use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use tokio::time::timeout;

use super::{BackendError, HealthTracker, InferenceOutput, ModelBackend, LATENT_LEN, MOTIF_COUNT};
use crate::metrics::Metrics;
use crate::models::ImuSample;

/// Front door for analysis requests.
///
/// `analyze` always answers with a full-shape output: the real model when it
/// is enabled, believed healthy and responds in time, stub output otherwise.
pub struct InferenceGateway {
    backend: Arc<dyn ModelBackend>,
    health: HealthTracker,
    metrics: Arc<Metrics>,
    use_real_model: bool,
    call_timeout: Duration,
}

impl InferenceGateway {
    pub fn new(
        backend: Arc<dyn ModelBackend>,
        health: HealthTracker,
        metrics: Arc<Metrics>,
        use_real_model: bool,
        call_timeout: Duration,
    ) -> Self {
        Self {
            backend,
            health,
            metrics,
            use_real_model,
            call_timeout,
        }
    }

    pub async fn analyze(&self, samples: &[ImuSample]) -> InferenceOutput {
        self.metrics.record_analyze();

        if !self.use_real_model {
            tracing::debug!("Real model disabled, serving stub analysis");
            return self.stub();
        }

        if !self.health.should_attempt(self.backend.as_ref()).await {
            tracing::warn!("Sidecar suspended, serving stub analysis");
            return self.stub();
        }

        let window: Vec<[f32; 9]> = samples.iter().map(ImuSample::as_row).collect();
        let start = Instant::now();

        let result = match timeout(self.call_timeout, self.backend.infer(&window)).await {
            Ok(result) => result.and_then(validate_shape),
            // Losing the race drops the call future, cancelling the
            // in-flight request.
            Err(_) => Err(BackendError::Timeout),
        };

        match result {
            Ok(output) => {
                self.metrics.record_real_success(start.elapsed());
                self.health.record(true).await;
                output
            }
            Err(err) => {
                let class = err.class();
                self.metrics.record_backend_failure(&class);
                self.health.record(false).await;
                tracing::error!("Real inference failed ({}): {}, falling back to stub", class, err);
                self.stub()
            }
        }
    }

    fn stub(&self) -> InferenceOutput {
        self.metrics.record_stub();
        stub_output()
    }
}

/// A response that decoded but carries the wrong vector lengths is treated
/// as a failure, never passed through.
fn validate_shape(output: InferenceOutput) -> Result<InferenceOutput, BackendError> {
    if output.latent.len() != LATENT_LEN || output.motif_scores.len() != MOTIF_COUNT {
        return Err(BackendError::MalformedResponse(format!(
            "expected {}+{} values, got {}+{}",
            LATENT_LEN,
            MOTIF_COUNT,
            output.latent.len(),
            output.motif_scores.len()
        )));
    }
    Ok(output)
}

/// Deterministic-shape random output: latent in [-1, 1], scores in
/// [0.1, 0.95].
fn stub_output() -> InferenceOutput {
    let mut rng = rand::thread_rng();
    InferenceOutput {
        latent: (0..LATENT_LEN).map(|_| rng.gen_range(-1.0..=1.0)).collect(),
        motif_scores: (0..MOTIF_COUNT).map(|_| rng.gen_range(0.1..=0.95)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{FakeBackend, FakeMode};

    fn gateway_with(
        backend: Arc<FakeBackend>,
        use_real_model: bool,
        check_interval: Duration,
        call_timeout: Duration,
    ) -> (InferenceGateway, Arc<Metrics>) {
        let metrics = Arc::new(Metrics::new());
        let gateway = InferenceGateway::new(
            backend,
            HealthTracker::new(check_interval),
            metrics.clone(),
            use_real_model,
            call_timeout,
        );
        (gateway, metrics)
    }

    fn assert_full_shape(output: &InferenceOutput) {
        assert_eq!(output.latent.len(), LATENT_LEN);
        assert_eq!(output.motif_scores.len(), MOTIF_COUNT);
    }

    #[test]
    fn test_stub_output_ranges() {
        let output = stub_output();
        assert_full_shape(&output);
        assert!(output.latent.iter().all(|v| (-1.0..=1.0).contains(v)));
        assert!(output.motif_scores.iter().all(|v| (0.1..=0.95).contains(v)));
    }

    #[tokio::test]
    async fn test_disabled_real_model_never_calls_backend() {
        let backend = Arc::new(FakeBackend::new(FakeMode::shaped(64, 12)));
        let (gateway, metrics) = gateway_with(
            backend.clone(),
            false,
            Duration::from_secs(30),
            Duration::from_millis(1500),
        );

        let output = gateway.analyze(&[]).await;
        assert_full_shape(&output);
        assert_eq!(backend.infer_calls(), 0);
        assert_eq!(backend.probe_calls(), 0);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.analyze_requests, 1);
        assert_eq!(snapshot.stub_results, 1);
        assert_eq!(snapshot.real_successes, 0);
    }

    #[tokio::test]
    async fn test_real_success_passes_backend_output_through() {
        let backend = Arc::new(FakeBackend::new(FakeMode::shaped(64, 12)));
        let (gateway, metrics) = gateway_with(
            backend.clone(),
            true,
            Duration::from_secs(30),
            Duration::from_millis(1500),
        );

        let output = gateway.analyze(&[]).await;
        let expected = FakeBackend::shaped_output(64, 12);
        assert_eq!(output.latent, expected.latent);
        assert_eq!(output.motif_scores, expected.motif_scores);
        assert_eq!(backend.infer_calls(), 1);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.real_successes, 1);
        assert_eq!(snapshot.stub_results, 0);
    }

    #[tokio::test]
    async fn test_wrong_shape_falls_back_to_stub() {
        let backend = Arc::new(FakeBackend::new(FakeMode::shaped(64, 11)));
        let (gateway, metrics) = gateway_with(
            backend.clone(),
            true,
            Duration::from_secs(30),
            Duration::from_millis(1500),
        );

        let output = gateway.analyze(&[]).await;
        assert_full_shape(&output);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.stub_results, 1);
        assert_eq!(snapshot.backend_failures.get("malformed_response"), Some(&1));
    }

    #[tokio::test]
    async fn test_failure_suspends_backend_until_interval() {
        let backend = Arc::new(FakeBackend::new(FakeMode::Status(500)));
        let (gateway, metrics) = gateway_with(
            backend.clone(),
            true,
            Duration::from_secs(30),
            Duration::from_millis(1500),
        );

        assert_full_shape(&gateway.analyze(&[]).await);
        assert_full_shape(&gateway.analyze(&[]).await);
        assert_full_shape(&gateway.analyze(&[]).await);

        // Only the first call reached the backend; the next two were gated
        // without probing inside the throttle window.
        assert_eq!(backend.infer_calls(), 1);
        assert_eq!(backend.probe_calls(), 0);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.analyze_requests, 3);
        assert_eq!(snapshot.stub_results, 3);
        assert_eq!(snapshot.backend_failures.get("http_500"), Some(&1));
    }

    #[tokio::test]
    async fn test_recovery_probe_restores_real_path() {
        let backend = Arc::new(FakeBackend::new(FakeMode::Status(500)));
        let (gateway, metrics) = gateway_with(
            backend.clone(),
            true,
            Duration::ZERO,
            Duration::from_millis(1500),
        );

        assert_full_shape(&gateway.analyze(&[]).await);
        assert_eq!(backend.infer_calls(), 1);

        backend.set_mode(FakeMode::shaped(64, 12));
        let output = gateway.analyze(&[]).await;
        assert_eq!(backend.probe_calls(), 1);
        assert_eq!(backend.infer_calls(), 2);
        assert_eq!(output.motif_scores, FakeBackend::shaped_output(64, 12).motif_scores);

        assert_eq!(metrics.snapshot().real_successes, 1);
    }

    #[tokio::test]
    async fn test_failed_probe_stays_on_stub() {
        let backend = Arc::new(FakeBackend::new(FakeMode::Status(500)));
        let (gateway, _metrics) = gateway_with(
            backend.clone(),
            true,
            Duration::ZERO,
            Duration::from_millis(1500),
        );

        assert_full_shape(&gateway.analyze(&[]).await);
        backend.set_healthy(false);
        backend.set_mode(FakeMode::shaped(64, 12));

        assert_full_shape(&gateway.analyze(&[]).await);
        assert_eq!(backend.probe_calls(), 1);
        assert_eq!(backend.infer_calls(), 1);
    }

    #[tokio::test]
    async fn test_hung_backend_respects_timeout() {
        let backend = Arc::new(FakeBackend::new(FakeMode::Hang));
        let (gateway, metrics) = gateway_with(
            backend.clone(),
            true,
            Duration::from_secs(30),
            Duration::from_millis(50),
        );

        let start = Instant::now();
        let output = gateway.analyze(&[]).await;
        assert!(start.elapsed() < Duration::from_secs(2));
        assert_full_shape(&output);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.backend_failures.get("timeout"), Some(&1));
        assert_eq!(snapshot.stub_results, 1);
    }

    #[tokio::test]
    async fn test_decode_failure_classified() {
        let backend = Arc::new(FakeBackend::new(FakeMode::Garbled));
        let (gateway, metrics) = gateway_with(
            backend.clone(),
            true,
            Duration::from_secs(30),
            Duration::from_millis(1500),
        );

        assert_full_shape(&gateway.analyze(&[]).await);
        assert_eq!(
            metrics.snapshot().backend_failures.get("decode_error"),
            Some(&1)
        );
    }
}
