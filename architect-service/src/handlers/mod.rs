//! HTTP handlers for the architect service.

pub mod analyze;
pub mod health;

pub use analyze::analyze;
pub use health::{health_check, readiness_check};
