//! Main application state and service coordination
//!
//! This module contains the production AppState that wires storage, the
//! rating calculator, metrics and the ladder service together, and runs the
//! background maintenance tasks.

use crate::config::AppConfig;
use crate::metrics::MetricsCollector;
use crate::rating::{EloRatingCalculator, RatingCalculator};
use crate::service::ladder::LadderService;
use crate::storage::{InMemoryStorage, JsonFileStorage, LadderStorage};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Interval of the metrics refresh task
const METRICS_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Service initialization error: {message}")]
    Initialization { message: String },

    #[error("Background task error: {message}")]
    BackgroundTask { message: String },
}

/// Main application state containing all service components
pub struct AppState {
    /// Application configuration
    config: AppConfig,

    /// Player registry and match registration
    ladder: Arc<LadderService>,

    /// Prometheus metrics
    metrics_collector: Arc<MetricsCollector>,

    /// Background task handles
    background_tasks: Mutex<Vec<JoinHandle<()>>>,

    /// Service status
    is_running: Arc<RwLock<bool>>,

    started_at: Instant,
}

impl AppState {
    /// Initialize the application, choosing storage from the configuration
    pub async fn new(config: AppConfig) -> Result<Self, ServiceError> {
        info!("Initializing pingpong-ladder service");

        let storage = Self::initialize_storage(&config)?;

        let calculator = EloRatingCalculator::new(config.rating.clone()).map_err(|e| {
            ServiceError::Configuration {
                message: format!("Failed to initialize rating calculator: {}", e),
            }
        })?;

        Self::with_components(config, storage, Arc::new(calculator))
    }

    /// Build the application from explicit storage and rating components
    pub fn with_components(
        config: AppConfig,
        storage: Arc<dyn LadderStorage>,
        calculator: Arc<dyn RatingCalculator>,
    ) -> Result<Self, ServiceError> {
        let metrics_collector =
            Arc::new(
                MetricsCollector::new().map_err(|e| ServiceError::Initialization {
                    message: format!("Failed to create metrics collector: {}", e),
                })?,
            );

        let ladder = LadderService::new(storage, calculator, metrics_collector.clone())
            .with_recent_matches_limit(config.storage.recent_matches_limit);

        let stats = ladder.stats().map_err(|e| ServiceError::Storage {
            message: format!("Failed to read ladder: {}", e),
        })?;
        metrics_collector.update_totals(stats.players, stats.matches);

        info!(
            "Ladder loaded: {} players, {} matches (k-factor {}, initial rating {})",
            stats.players, stats.matches, config.rating.k_factor, config.rating.initial_rating
        );

        Ok(Self {
            config,
            ladder: Arc::new(ladder),
            metrics_collector,
            background_tasks: Mutex::new(Vec::new()),
            is_running: Arc::new(RwLock::new(false)),
            started_at: Instant::now(),
        })
    }

    /// Start background tasks and mark the service as running
    pub async fn start(&self) -> Result<(), ServiceError> {
        info!("Starting pingpong-ladder service");

        *self.is_running.write().await = true;

        self.start_background_tasks().await?;

        info!("✅ Pingpong-ladder service started successfully");
        Ok(())
    }

    /// Perform graceful shutdown
    pub async fn shutdown(&self) -> Result<(), ServiceError> {
        info!("Starting graceful shutdown of pingpong-ladder service");

        *self.is_running.write().await = false;

        self.stop_background_tasks().await;

        let final_stats = self
            .ladder
            .stats()
            .map_err(|e| ServiceError::BackgroundTask {
                message: format!("Failed to get final stats: {}", e),
            })?;

        info!(
            "Final ladder statistics: {} players, {} matches",
            final_stats.players, final_stats.matches
        );
        info!("✅ Pingpong-ladder service shutdown completed");

        Ok(())
    }

    /// Get service configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Check if service is running
    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    /// Get the ladder service
    pub fn ladder(&self) -> Arc<LadderService> {
        self.ladder.clone()
    }

    /// Get the metrics collector
    pub fn metrics_collector(&self) -> Arc<MetricsCollector> {
        self.metrics_collector.clone()
    }

    /// Time since the application state was created
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    fn initialize_storage(config: &AppConfig) -> Result<Arc<dyn LadderStorage>, ServiceError> {
        match &config.storage.data_file {
            Some(path) => {
                info!("Using JSON file storage: {}", path.display());
                let storage = JsonFileStorage::open(path).map_err(|e| ServiceError::Storage {
                    message: format!("Failed to open {}: {:#}", path.display(), e),
                })?;
                Ok(Arc::new(storage))
            }
            None => {
                warn!("No data file configured - ladder is kept in memory only");
                Ok(Arc::new(InMemoryStorage::new()))
            }
        }
    }

    /// Start background maintenance tasks
    async fn start_background_tasks(&self) -> Result<(), ServiceError> {
        info!(
            "Starting metrics refresh task ({}s interval)...",
            METRICS_REFRESH_INTERVAL.as_secs()
        );

        let metrics_task = {
            let ladder = self.ladder.clone();
            let metrics_collector = self.metrics_collector.clone();
            let is_running = self.is_running.clone();
            let started_at = self.started_at;

            tokio::spawn(async move {
                let mut interval = tokio::time::interval(METRICS_REFRESH_INTERVAL);
                debug!("Metrics refresh task started");

                while *is_running.read().await {
                    interval.tick().await;

                    metrics_collector.update_uptime(started_at.elapsed());

                    match ladder.stats() {
                        Ok(stats) => {
                            debug!(
                                "Updating metrics - players: {}, matches: {}",
                                stats.players, stats.matches
                            );
                            metrics_collector.update_totals(stats.players, stats.matches);
                            metrics_collector.update_health_status(1);
                        }
                        Err(e) => {
                            warn!("Failed to read ladder stats for metrics update: {}", e);
                            metrics_collector.update_health_status(0);
                        }
                    }
                }

                debug!("Metrics refresh task stopped");
            })
        };

        self.background_tasks.lock().await.push(metrics_task);
        Ok(())
    }

    async fn stop_background_tasks(&self) {
        let mut tasks = self.background_tasks.lock().await;
        info!("Stopping {} background tasks...", tasks.len());

        for task in tasks.drain(..) {
            task.abort();
        }
    }
}
