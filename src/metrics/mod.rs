//! Metrics and monitoring for the ladder service
//!
//! Prometheus metrics for player and match registration. The `/metrics`
//! endpoint that exposes them lives in [`crate::api`].

pub mod collector;

pub use collector::{LadderMetrics, MetricsCollector, PerformanceMetrics, ServiceMetrics};
