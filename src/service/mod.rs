//! Service layer
//!
//! Ladder operations, application wiring and health checks.

pub mod app;
pub mod health;
pub mod ladder;

pub use app::{AppState, ServiceError};
pub use health::{ComponentCheck, HealthCheck, HealthStatus, ServiceStats};
pub use ladder::{LadderService, LadderStats, ServiceResult};
