//! In-memory session registry.
//!
//! Each session owns a bounded ring buffer of IMU samples; the newest
//! samples win once the cap is hit. A background sweeper reaps sessions
//! whose start time has aged past the configured limit.

mod store;
mod sweeper;

pub use store::{SessionSnapshot, SessionStore, StoreError};
pub use sweeper::run_sweeper;
