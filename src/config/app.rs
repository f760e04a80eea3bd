//! Main application configuration
//!
//! This module defines the primary configuration structures for the
//! quiz-ladder engine, including environment variable loading, TOML files
//! and validation.

use crate::config::rating::RatingSettings;
use crate::config::selection::SelectionSettings;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub rating: RatingSettings,
    pub selection: SelectionSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "quiz-ladder".to_string(),
            log_level: "info".to_string(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| anyhow!("Invalid {} value: {}", name, value))
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;

        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file; environment variables still win
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml(&contents)?;
        config.apply_env()?;

        validate_config(&config)?;
        Ok(config)
    }

    /// Parse TOML; missing sections and keys keep their defaults
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("Invalid configuration TOML")?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("QUIZ_SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("QUIZ_LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // Rating settings
        if let Ok(value) = env::var("QUIZ_DEFAULT_RATING") {
            self.rating.default_rating = parse_var("QUIZ_DEFAULT_RATING", &value)?;
        }
        if let Ok(value) = env::var("QUIZ_PLAYER_K") {
            self.rating.player_k = parse_var("QUIZ_PLAYER_K", &value)?;
        }
        if let Ok(value) = env::var("QUIZ_QUESTION_K") {
            self.rating.question_k = parse_var("QUIZ_QUESTION_K", &value)?;
        }
        if let Ok(value) = env::var("QUIZ_RATING_CAP") {
            self.rating.rating_cap = parse_var("QUIZ_RATING_CAP", &value)?;
        }

        // Selection settings
        if let Ok(value) = env::var("QUIZ_REPEAT_WINDOW") {
            self.selection.repeat_window = parse_var("QUIZ_REPEAT_WINDOW", &value)?;
        }
        if let Ok(value) = env::var("QUIZ_VIRTUAL_WINDOW") {
            self.selection.virtual_window = parse_var("QUIZ_VIRTUAL_WINDOW", &value)?;
        }
        if let Ok(value) = env::var("QUIZ_VIRTUAL_K") {
            self.selection.virtual_k = parse_var("QUIZ_VIRTUAL_K", &value)?;
        }
        if let Ok(value) = env::var("QUIZ_REPORTABLE_AMOUNT") {
            self.selection.reportable_amount = parse_var("QUIZ_REPORTABLE_AMOUNT", &value)?;
        }

        Ok(())
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }

    // Validate rating settings
    let rating = &config.rating;
    if !rating.default_rating.is_finite() || rating.default_rating <= 0.0 {
        return Err(anyhow!("Default rating must be a positive number"));
    }
    if !rating.player_k.is_finite() || rating.player_k <= 0.0 {
        return Err(anyhow!("Player K factor must be positive"));
    }
    if !rating.question_k.is_finite() || rating.question_k <= 0.0 {
        return Err(anyhow!("Question K factor must be positive"));
    }
    if rating.rating_cap.is_nan() || rating.rating_cap <= 0.0 {
        return Err(anyhow!("Rating cap must be positive"));
    }

    // Validate selection settings
    let selection = &config.selection;
    if selection.repeat_window == 0 {
        return Err(anyhow!("Repeat window must be greater than 0"));
    }
    if selection.virtual_window == 0 {
        return Err(anyhow!("Virtual rating window must be greater than 0"));
    }
    if !selection.virtual_k.is_finite() || selection.virtual_k < 0.0 {
        return Err(anyhow!("Virtual rating step must be non-negative"));
    }
    if selection.reportable_amount == 0 {
        return Err(anyhow!("Reportable amount must be greater than 0"));
    }

    Ok(())
}
