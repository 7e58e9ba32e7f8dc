//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::Arc;
use study_content_core::ContentGenerator;
use tokio_util::sync::CancellationToken;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub generator: Arc<ContentGenerator>,
    /// Whether a provider credential was configured at startup.
    pub completion_configured: bool,
    /// Cancelled on shutdown so in-flight generations resolve to fallbacks.
    pub shutdown: CancellationToken,
}
