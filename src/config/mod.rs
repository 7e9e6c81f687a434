//! Configuration management for the pingpong-ladder service
//!
//! This module handles all configuration loading from environment variables
//! and TOML files, validation, and default values for the ladder service.

pub mod app;
pub mod rating;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, ServiceSettings, StorageSettings};
pub use rating::RatingConfig;
