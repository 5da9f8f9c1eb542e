use serde_json::{json, Value};

/// Sidecar response with the given vector lengths: latent ramps up in
/// hundredths, scores in 0.05 steps.
pub fn infer_json(latent_len: usize, motif_len: usize) -> Value {
    json!({
        "latent": (0..latent_len).map(|i| i as f32 / 100.0).collect::<Vec<_>>(),
        "motif_scores": (0..motif_len).map(|i| 0.05 * (i + 1) as f32).collect::<Vec<_>>(),
    })
}

/// Well-shaped sidecar response: 64 latent values, 12 motif scores.
pub fn valid_infer_json() -> Value {
    infer_json(64, 12)
}

/// Decodes fine but carries the wrong vector lengths.
pub fn short_infer_json() -> Value {
    json!({
        "latent": [0.1, 0.2, 0.3],
        "motif_scores": [0.9],
    })
}

pub fn healthz_json() -> Value {
    json!({
        "ok": true,
        "loaded": true,
    })
}
