//! Shared test helpers: a scriptable in-process model backend and canned
//! sidecar payloads for wire-level tests.

mod fake_backend;
pub mod payloads;

pub use fake_backend::{FakeBackend, FakeMode};
