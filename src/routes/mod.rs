//! HTTP routes.

pub mod analysis;
pub mod health;
