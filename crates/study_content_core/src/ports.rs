//! crates/study_content_core/src/ports.rs
//!
//! Defines the service contract (trait) for the remote completion endpoint.
//! This trait forms the boundary of the hexagonal architecture, allowing the core
//! to be independent of any specific LLM provider or HTTP client.

use async_trait::async_trait;
use std::time::Duration;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// The error type for all port operations and for the generation pipeline behind them.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// A required setting, such as the provider credential, is missing.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// Transport failure or non-success response from the completion provider.
    #[error("Provider error: {0}")]
    Provider(String),
    /// The completion text held no usable JSON object, or one of the wrong shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Completion request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Completion request was cancelled")]
    Cancelled,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Completion Options
//=========================================================================================

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    /// Overrides the adapter's default model when set.
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            model: None,
            temperature: 0.7,
            max_tokens: 8000,
            top_p: 0.95,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Sends `prompt` as a single user message and returns the raw text of the first choice.
    ///
    /// Returns an empty string when the provider answers without choices. Implementations
    /// make exactly one request and never retry.
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> PortResult<String>;
}
