//! Wire types for the analysis API.
//!
//! Field naming follows the mobile client contract: camelCase keys except
//! where an explicit snake_case name is part of the published format
//! (`duration_s`, `lag_ms`, `window_ms`, `duration_ms`).

mod analysis;
mod imu;

pub use analysis::{
    Motif, MotifsResponse, SessionStartResponse, SessionStopResponse, SynchronyResponse,
};
pub use imu::{ImuSample, ImuWindow};
