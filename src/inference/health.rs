use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use super::ModelBackend;

#[derive(Debug)]
struct HealthState {
    healthy: bool,
    last_checked: Option<Instant>,
}

/// Tracks whether the sidecar is worth calling.
///
/// The backend starts healthy. After a failure, real calls stay suspended
/// until a probe succeeds, and probes fire at most once per
/// `check_interval`; in between, callers are told to stub without touching
/// the network.
pub struct HealthTracker {
    state: Mutex<HealthState>,
    check_interval: Duration,
}

impl HealthTracker {
    pub fn new(check_interval: Duration) -> Self {
        Self {
            state: Mutex::new(HealthState {
                healthy: true,
                last_checked: None,
            }),
            check_interval,
        }
    }

    /// Decide whether a real call should go out, probing the backend if the
    /// throttle window has lapsed. The lock is held across the probe so
    /// concurrent callers cannot stampede a struggling sidecar; the probe
    /// carries its own short bound.
    pub async fn should_attempt(&self, backend: &dyn ModelBackend) -> bool {
        let mut state = self.state.lock().await;
        if state.healthy {
            return true;
        }

        match state.last_checked {
            Some(at) if at.elapsed() < self.check_interval => false,
            _ => {
                state.last_checked = Some(Instant::now());
                state.healthy = backend.health_check().await.is_ok();
                if state.healthy {
                    tracing::info!("Sidecar recovered, resuming real inference");
                }
                state.healthy
            }
        }
    }

    /// Record the outcome of a real call. The outcome counts as a health
    /// observation, so a failure also restarts the probe throttle window.
    pub async fn record(&self, success: bool) {
        let mut state = self.state.lock().await;
        state.healthy = success;
        state.last_checked = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{FakeBackend, FakeMode};

    #[tokio::test]
    async fn test_healthy_backend_is_never_probed() {
        let backend = FakeBackend::new(FakeMode::shaped(64, 12));
        let tracker = HealthTracker::new(Duration::from_secs(30));

        for _ in 0..5 {
            assert!(tracker.should_attempt(&backend).await);
        }
        assert_eq!(backend.probe_calls(), 0);
    }

    #[tokio::test]
    async fn test_unhealthy_within_interval_skips_probe() {
        let backend = FakeBackend::new(FakeMode::shaped(64, 12));
        let tracker = HealthTracker::new(Duration::from_secs(30));

        tracker.record(false).await;
        for _ in 0..5 {
            assert!(!tracker.should_attempt(&backend).await);
        }
        assert_eq!(backend.probe_calls(), 0);
    }

    #[tokio::test]
    async fn test_probe_fires_after_interval_and_recovers() {
        let backend = FakeBackend::new(FakeMode::shaped(64, 12));
        let tracker = HealthTracker::new(Duration::ZERO);

        tracker.record(false).await;
        assert!(tracker.should_attempt(&backend).await);
        assert_eq!(backend.probe_calls(), 1);

        // Recovered; no further probes while healthy.
        assert!(tracker.should_attempt(&backend).await);
        assert_eq!(backend.probe_calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_probe_keeps_backend_suspended() {
        let backend = FakeBackend::new(FakeMode::shaped(64, 12));
        backend.set_healthy(false);
        let tracker = HealthTracker::new(Duration::ZERO);

        tracker.record(false).await;
        assert!(!tracker.should_attempt(&backend).await);
        assert!(!tracker.should_attempt(&backend).await);
        assert_eq!(backend.probe_calls(), 2);
    }
}
