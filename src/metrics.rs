//! Service counters and their Prometheus text rendering.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Process-wide counters. Cheap to bump from any task; the failure-class
/// map takes a short lock.
pub struct Metrics {
    analyze_requests: AtomicU64,
    stub_results: AtomicU64,
    real_successes: AtomicU64,
    real_duration_us: AtomicU64,
    backend_failures: Mutex<BTreeMap<String, u64>>,
}

/// Point-in-time copy for assertions and debugging.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub analyze_requests: u64,
    pub stub_results: u64,
    pub real_successes: u64,
    pub backend_failures: BTreeMap<String, u64>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            analyze_requests: AtomicU64::new(0),
            stub_results: AtomicU64::new(0),
            real_successes: AtomicU64::new(0),
            real_duration_us: AtomicU64::new(0),
            backend_failures: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn record_analyze(&self) {
        self.analyze_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stub(&self) {
        self.stub_results.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_real_success(&self, elapsed: Duration) {
        self.real_successes.fetch_add(1, Ordering::Relaxed);
        self.real_duration_us
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn record_backend_failure(&self, class: &str) {
        let mut failures = self
            .backend_failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *failures.entry(class.to_string()).or_insert(0) += 1;
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let failures = self
            .backend_failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        MetricsSnapshot {
            analyze_requests: self.analyze_requests.load(Ordering::Relaxed),
            stub_results: self.stub_results.load(Ordering::Relaxed),
            real_successes: self.real_successes.load(Ordering::Relaxed),
            backend_failures: failures.clone(),
        }
    }

    /// Prometheus text format. `active_sessions` comes from the registry at
    /// scrape time rather than being counted here.
    pub fn render(&self, active_sessions: usize) -> String {
        let snapshot = self.snapshot();
        let duration_s =
            self.real_duration_us.load(Ordering::Relaxed) as f64 / 1_000_000.0;

        let mut out = String::new();
        let _ = writeln!(out, "# HELP motif_gateway_up Whether the service is up");
        let _ = writeln!(out, "# TYPE motif_gateway_up gauge");
        let _ = writeln!(out, "motif_gateway_up 1");
        let _ = writeln!(out, "# HELP motif_gateway_info Service information");
        let _ = writeln!(out, "# TYPE motif_gateway_info gauge");
        let _ = writeln!(out, "motif_gateway_info{{version=\"{}\"}} 1", VERSION);
        let _ = writeln!(
            out,
            "# HELP motif_gateway_sessions_active Sessions currently buffered"
        );
        let _ = writeln!(out, "# TYPE motif_gateway_sessions_active gauge");
        let _ = writeln!(out, "motif_gateway_sessions_active {}", active_sessions);
        let _ = writeln!(
            out,
            "# HELP motif_gateway_analyze_total Analysis passes served"
        );
        let _ = writeln!(out, "# TYPE motif_gateway_analyze_total counter");
        let _ = writeln!(
            out,
            "motif_gateway_analyze_total {}",
            snapshot.analyze_requests
        );
        let _ = writeln!(
            out,
            "# HELP motif_gateway_stub_results_total Analyses answered with stub output"
        );
        let _ = writeln!(out, "# TYPE motif_gateway_stub_results_total counter");
        let _ = writeln!(
            out,
            "motif_gateway_stub_results_total {}",
            snapshot.stub_results
        );
        let _ = writeln!(
            out,
            "# HELP motif_gateway_backend_success_total Successful sidecar calls"
        );
        let _ = writeln!(out, "# TYPE motif_gateway_backend_success_total counter");
        let _ = writeln!(
            out,
            "motif_gateway_backend_success_total {}",
            snapshot.real_successes
        );
        let _ = writeln!(
            out,
            "# HELP motif_gateway_backend_failures_total Failed sidecar calls by class"
        );
        let _ = writeln!(out, "# TYPE motif_gateway_backend_failures_total counter");
        for (class, count) in &snapshot.backend_failures {
            let _ = writeln!(
                out,
                "motif_gateway_backend_failures_total{{class=\"{}\"}} {}",
                class, count
            );
        }
        let _ = writeln!(
            out,
            "# HELP motif_gateway_backend_duration_seconds Time spent in successful sidecar calls"
        );
        let _ = writeln!(
            out,
            "# TYPE motif_gateway_backend_duration_seconds summary"
        );
        let _ = writeln!(
            out,
            "motif_gateway_backend_duration_seconds_sum {:.6}",
            duration_s
        );
        let _ = writeln!(
            out,
            "motif_gateway_backend_duration_seconds_count {}",
            snapshot.real_successes
        );
        out
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = Metrics::new();
        metrics.record_analyze();
        metrics.record_analyze();
        metrics.record_stub();
        metrics.record_real_success(Duration::from_millis(120));
        metrics.record_backend_failure("timeout");
        metrics.record_backend_failure("timeout");
        metrics.record_backend_failure("http_503");

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.analyze_requests, 2);
        assert_eq!(snapshot.stub_results, 1);
        assert_eq!(snapshot.real_successes, 1);
        assert_eq!(snapshot.backend_failures.get("timeout"), Some(&2));
        assert_eq!(snapshot.backend_failures.get("http_503"), Some(&1));
    }

    #[test]
    fn test_render_exports_expected_series() {
        let metrics = Metrics::new();
        metrics.record_analyze();
        metrics.record_stub();
        metrics.record_backend_failure("timeout");

        let text = metrics.render(3);
        assert!(text.contains("motif_gateway_up 1"));
        assert!(text.contains("motif_gateway_sessions_active 3"));
        assert!(text.contains("motif_gateway_analyze_total 1"));
        assert!(text.contains("motif_gateway_stub_results_total 1"));
        assert!(text.contains("motif_gateway_backend_failures_total{class=\"timeout\"} 1"));
        assert!(text.contains("motif_gateway_backend_duration_seconds_count 0"));
    }
}
