use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::inference::{BackendError, InferenceOutput, ModelBackend};

/// What the fake returns from `infer`.
#[derive(Debug, Clone)]
pub enum FakeMode {
    /// Vectors of the given lengths with deterministic values.
    Shaped { latent: usize, motifs: usize },
    /// Fail with the given HTTP status.
    Status(u16),
    /// Fail as an unreadable response body.
    Garbled,
    /// Never resolve; callers must race a timeout.
    Hang,
}

impl FakeMode {
    pub fn shaped(latent: usize, motifs: usize) -> Self {
        FakeMode::Shaped { latent, motifs }
    }
}

/// Scriptable in-process `ModelBackend` with call counters. Probe outcome
/// is controlled separately from infer outcome so health-gating paths can
/// be driven precisely.
pub struct FakeBackend {
    mode: Mutex<FakeMode>,
    healthy: AtomicBool,
    infer_calls: AtomicUsize,
    probe_calls: AtomicUsize,
}

impl FakeBackend {
    pub fn new(mode: FakeMode) -> Self {
        Self {
            mode: Mutex::new(mode),
            healthy: AtomicBool::new(true),
            infer_calls: AtomicUsize::new(0),
            probe_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_mode(&self, mode: FakeMode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn infer_calls(&self) -> usize {
        self.infer_calls.load(Ordering::SeqCst)
    }

    pub fn probe_calls(&self) -> usize {
        self.probe_calls.load(Ordering::SeqCst)
    }

    /// The exact output `Shaped` mode produces: latent ramps up in
    /// hundredths, scores in 0.05 steps.
    pub fn shaped_output(latent: usize, motifs: usize) -> InferenceOutput {
        InferenceOutput {
            latent: (0..latent).map(|i| i as f32 / 100.0).collect(),
            motif_scores: (0..motifs).map(|i| 0.05 * (i + 1) as f32).collect(),
        }
    }
}

#[async_trait]
impl ModelBackend for FakeBackend {
    async fn infer(&self, _window: &[[f32; 9]]) -> Result<InferenceOutput, BackendError> {
        self.infer_calls.fetch_add(1, Ordering::SeqCst);
        let mode = self.mode.lock().unwrap().clone();
        match mode {
            FakeMode::Shaped { latent, motifs } => Ok(Self::shaped_output(latent, motifs)),
            FakeMode::Status(code) => Err(BackendError::Status(code)),
            FakeMode::Garbled => Err(BackendError::Decode("unreadable body".to_string())),
            FakeMode::Hang => std::future::pending().await,
        }
    }

    async fn health_check(&self) -> Result<(), BackendError> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BackendError::Status(503))
        }
    }
}
