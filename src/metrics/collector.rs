//! Metrics collection using Prometheus
//!
//! This module provides metrics collection for the ladder service using
//! Prometheus metrics.

use crate::types::{MatchFormat, MatchInput};
use anyhow::Result;
use prometheus::{
    Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the ladder service
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Service-level metrics
    service_metrics: ServiceMetrics,

    /// Player and match metrics
    ladder_metrics: LadderMetrics,

    /// Performance metrics
    performance_metrics: PerformanceMetrics,
}

/// Service-level metrics
#[derive(Clone)]
pub struct ServiceMetrics {
    /// Service uptime in seconds
    pub uptime_seconds: IntGauge,

    /// Health check status (0=unhealthy, 1=healthy)
    pub health_status: IntGauge,
}

/// Player and match metrics
#[derive(Clone)]
pub struct LadderMetrics {
    /// Total players registered since start
    pub players_registered_total: IntCounter,

    /// Total matches registered, by format and input kind
    pub matches_registered_total: IntCounterVec,

    /// Rejected match registrations by reason
    pub match_rejections_total: IntCounterVec,

    /// Players currently on the ladder
    pub players: IntGauge,

    /// Matches currently recorded
    pub matches: IntGauge,

    /// Absolute rating change of the match winner
    pub rating_change: Histogram,
}

/// Performance metrics
#[derive(Clone)]
pub struct PerformanceMetrics {
    /// Match registration processing time
    pub registration_duration: Histogram,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let service_metrics = ServiceMetrics::new(&registry)?;
        let ladder_metrics = LadderMetrics::new(&registry)?;
        let performance_metrics = PerformanceMetrics::new(&registry)?;

        Ok(Self {
            registry,
            service_metrics,
            ladder_metrics,
            performance_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Get service metrics
    pub fn service(&self) -> &ServiceMetrics {
        &self.service_metrics
    }

    /// Get ladder metrics
    pub fn ladder(&self) -> &LadderMetrics {
        &self.ladder_metrics
    }

    /// Get performance metrics
    pub fn performance(&self) -> &PerformanceMetrics {
        &self.performance_metrics
    }

    /// Record a newly registered player
    pub fn record_player_registered(&self) {
        self.ladder_metrics.players_registered_total.inc();
        self.ladder_metrics.players.inc();
    }

    /// Record a successfully registered match
    pub fn record_match_registered(
        &self,
        format: MatchFormat,
        input: &MatchInput,
        winner_rating_change: i64,
        duration: Duration,
    ) {
        let format_str = match format {
            MatchFormat::BestOf1 => "bo1",
            MatchFormat::BestOf3 => "bo3",
            MatchFormat::BestOf5 => "bo5",
        };

        let input_str = match input {
            MatchInput::PerSetScores { .. } => "per_set",
            MatchInput::AggregateCounts { .. } => "aggregate",
        };

        self.ladder_metrics
            .matches_registered_total
            .with_label_values(&[format_str, input_str])
            .inc();

        self.ladder_metrics.matches.inc();

        self.ladder_metrics
            .rating_change
            .observe(winner_rating_change.unsigned_abs() as f64);

        self.performance_metrics
            .registration_duration
            .observe(duration.as_secs_f64());
    }

    /// Record a rejected match registration
    pub fn record_match_rejected(&self, reason: &str) {
        self.ladder_metrics
            .match_rejections_total
            .with_label_values(&[reason])
            .inc();
    }

    /// Set the ladder size gauges from storage counts
    pub fn update_totals(&self, players: usize, matches: usize) {
        self.ladder_metrics.players.set(players as i64);
        self.ladder_metrics.matches.set(matches as i64);
    }

    /// Update health status
    pub fn update_health_status(&self, status: u8) {
        self.service_metrics.health_status.set(status as i64);
    }

    /// Update uptime
    pub fn update_uptime(&self, uptime: Duration) {
        self.service_metrics
            .uptime_seconds
            .set(uptime.as_secs() as i64);
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl ServiceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let uptime_seconds =
            IntGauge::new("pingpong_ladder_uptime_seconds", "Service uptime in seconds")?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        let health_status = IntGauge::new(
            "pingpong_ladder_health_status",
            "Health status (0=unhealthy, 1=healthy)",
        )?;
        registry.register(Box::new(health_status.clone()))?;

        Ok(Self {
            uptime_seconds,
            health_status,
        })
    }
}

impl LadderMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let players_registered_total = IntCounter::new(
            "pingpong_ladder_players_registered_total",
            "Total players registered",
        )?;
        registry.register(Box::new(players_registered_total.clone()))?;

        let matches_registered_total = IntCounterVec::new(
            Opts::new(
                "pingpong_ladder_matches_registered_total",
                "Total matches registered",
            ),
            &["format", "input"],
        )?;
        registry.register(Box::new(matches_registered_total.clone()))?;

        let match_rejections_total = IntCounterVec::new(
            Opts::new(
                "pingpong_ladder_match_rejections_total",
                "Total rejected match registrations",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(match_rejections_total.clone()))?;

        let players = IntGauge::new("pingpong_ladder_players", "Players on the ladder")?;
        registry.register(Box::new(players.clone()))?;

        let matches = IntGauge::new("pingpong_ladder_matches", "Matches recorded")?;
        registry.register(Box::new(matches.clone()))?;

        let rating_change = Histogram::with_opts(
            HistogramOpts::new(
                "pingpong_ladder_rating_change",
                "Rating points gained by match winners",
            )
            .buckets(vec![1.0, 2.0, 4.0, 8.0, 12.0, 16.0, 20.0, 24.0, 28.0, 32.0]),
        )?;
        registry.register(Box::new(rating_change.clone()))?;

        Ok(Self {
            players_registered_total,
            matches_registered_total,
            match_rejections_total,
            players,
            matches,
            rating_change,
        })
    }
}

impl PerformanceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let registration_duration = Histogram::with_opts(
            HistogramOpts::new(
                "pingpong_ladder_registration_duration_seconds",
                "Match registration processing time",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1]),
        )?;
        registry.register(Box::new(registration_duration.clone()))?;

        Ok(Self {
            registration_duration,
        })
    }
}
