//! Configuration management for the match lifecycle layer
//!
//! This module handles all configuration loading from environment variables,
//! validation, and default values.

pub mod app;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, PaginationSettings, RatingSettings};
