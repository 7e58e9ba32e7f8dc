//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use study_content_core::CompletionOptions;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    /// Absent keys are allowed at startup; generation then falls back until one is set.
    pub openai_api_key: Option<String>,
    pub openai_api_base: Option<String>,
    pub completion_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub generation_timeout: Duration,
    pub cors_origin: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server Settings ---
        let bind_address = parse_or(&lookup, "BIND_ADDRESS", "0.0.0.0:3000".parse::<SocketAddr>())?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());

        // --- Completion Provider Settings ---
        let openai_api_key = lookup("OPENAI_API_KEY").filter(|key| !key.trim().is_empty());
        let openai_api_base = lookup("OPENAI_API_BASE").filter(|base| !base.trim().is_empty());
        let completion_model =
            lookup("COMPLETION_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string());

        let defaults = CompletionOptions::default();
        let temperature = parse_or(&lookup, "COMPLETION_TEMPERATURE", Ok(defaults.temperature))?;
        let max_tokens = parse_or(&lookup, "COMPLETION_MAX_TOKENS", Ok(defaults.max_tokens))?;
        let timeout_secs: u64 = parse_or(&lookup, "GENERATION_TIMEOUT_SECS", Ok(30))?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "GENERATION_TIMEOUT_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            bind_address,
            log_level,
            openai_api_key,
            openai_api_base,
            completion_model,
            temperature,
            max_tokens,
            generation_timeout: Duration::from_secs(timeout_secs),
            cors_origin,
        })
    }

    /// The sampling options every generation request is sent with.
    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            model: Some(self.completion_model.clone()),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            ..CompletionOptions::default()
        }
    }
}

/// Parses `name` when it is set, otherwise uses `default`.
fn parse_or<F, T>(lookup: &F, name: &str, default: Result<T, T::Err>) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        None => default.map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
    }
}
