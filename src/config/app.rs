//! Main application configuration
//!
//! This module defines the configuration structures for the match lifecycle
//! layer, including environment variable loading and validation.

use crate::error::{MatchdayError, Result};
use serde::{Deserialize, Serialize};
use std::env;

fn config_error(message: impl Into<String>) -> anyhow::Error {
    MatchdayError::ConfigurationError {
        message: message.into(),
    }
    .into()
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub pagination: PaginationSettings,
    pub rating: RatingSettings,
}

/// Pagination and fetch-size settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationSettings {
    /// Page size used when the caller does not specify one
    pub default_page_size: usize,
    /// Hard upper bound on a single page fetch
    pub max_page_size: usize,
    /// Size of the one ordered page the filter engine fetches and scans
    pub filter_fetch_limit: usize,
    /// Page size used when sweeping the finished-matches index
    pub finished_sweep_page_size: usize,
}

/// Rating submission settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingSettings {
    /// Lowest accepted score per dimension
    pub min_score: u8,
    /// Highest accepted score per dimension
    pub max_score: u8,
    /// Score assumed when a rater omits a dimension
    pub default_score: u8,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 50,
            filter_fetch_limit: 100,
            finished_sweep_page_size: 50,
        }
    }
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            min_score: 1,
            max_score: 5,
            default_score: 4,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(size) = env::var("MATCHDAY_DEFAULT_PAGE_SIZE") {
            config.pagination.default_page_size = size.parse().map_err(|_| {
                config_error(format!("Invalid MATCHDAY_DEFAULT_PAGE_SIZE value: {size}"))
            })?;
        }
        if let Ok(size) = env::var("MATCHDAY_MAX_PAGE_SIZE") {
            config.pagination.max_page_size = size.parse().map_err(|_| {
                config_error(format!("Invalid MATCHDAY_MAX_PAGE_SIZE value: {size}"))
            })?;
        }
        if let Ok(limit) = env::var("MATCHDAY_FILTER_FETCH_LIMIT") {
            config.pagination.filter_fetch_limit = limit.parse().map_err(|_| {
                config_error(format!("Invalid MATCHDAY_FILTER_FETCH_LIMIT value: {limit}"))
            })?;
        }
        if let Ok(size) = env::var("MATCHDAY_FINISHED_SWEEP_PAGE_SIZE") {
            config.pagination.finished_sweep_page_size = size.parse().map_err(|_| {
                config_error(format!("Invalid MATCHDAY_FINISHED_SWEEP_PAGE_SIZE value: {size}"))
            })?;
        }
        if let Ok(score) = env::var("MATCHDAY_DEFAULT_RATING_SCORE") {
            config.rating.default_score = score.parse().map_err(|_| {
                config_error(format!("Invalid MATCHDAY_DEFAULT_RATING_SCORE value: {score}"))
            })?;
        }

        validate_config(&config)?;
        Ok(config)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    if config.pagination.default_page_size == 0 {
        return Err(config_error("Default page size must be greater than 0"));
    }
    if config.pagination.max_page_size < config.pagination.default_page_size {
        return Err(config_error(
            "Max page size cannot be smaller than the default page size",
        ));
    }
    if config.pagination.filter_fetch_limit == 0 {
        return Err(config_error("Filter fetch limit must be greater than 0"));
    }
    if config.pagination.finished_sweep_page_size == 0 {
        return Err(config_error("Finished sweep page size must be greater than 0"));
    }

    if config.rating.min_score == 0 || config.rating.min_score > config.rating.max_score {
        return Err(config_error("Rating score range is invalid"));
    }
    if config.rating.default_score < config.rating.min_score
        || config.rating.default_score > config.rating.max_score
    {
        return Err(config_error(
            "Default rating score must fall within the accepted range",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.pagination.default_page_size, 10);
        assert_eq!(config.rating.default_score, 4);
    }

    #[test]
    fn test_invalid_page_sizes_rejected() {
        let mut config = AppConfig::default();
        config.pagination.default_page_size = 0;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.pagination.max_page_size = 5;
        config.pagination.default_page_size = 10;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_default_score_must_be_in_range() {
        let mut config = AppConfig::default();
        config.rating.default_score = 6;
        assert!(validate_config(&config).is_err());
    }
}
