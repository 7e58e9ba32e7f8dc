//! services/api/src/bin/api.rs

use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use content_api::{
    adapters::OpenAiCompletionAdapter,
    config::Config,
    error::ApiError,
    web::{
        generate_handler, health_handler, mind_map_handler, notes_handler, quiz_handler,
        rest::ApiDoc, slides_handler, state::AppState,
    },
};
use std::sync::Arc;
use study_content_core::ContentGenerator;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize the Completion Adapter & Generator ---
    let completion_adapter = Arc::new(OpenAiCompletionAdapter::new(
        config.openai_api_key.as_deref(),
        config.openai_api_base.as_deref(),
        config.completion_model.clone(),
    ));
    let completion_configured = completion_adapter.is_configured();
    if !completion_configured {
        warn!("OPENAI_API_KEY is not set; every generation will return fallback content");
    }

    let generator = ContentGenerator::new(completion_adapter)
        .with_options(config.completion_options())
        .with_timeout(config.generation_timeout);
    info!(
        model = %config.completion_model,
        timeout_secs = config.generation_timeout.as_secs(),
        "Content generator ready"
    );

    // --- 3. Build the Shared AppState ---
    let shutdown = CancellationToken::new();
    let app_state = Arc::new(AppState {
        config: config.clone(),
        generator: Arc::new(generator),
        completion_configured,
        shutdown: shutdown.clone(),
    });

    let cors_origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!("Invalid CORS origin '{}': {}", config.cors_origin, e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    let api_router = Router::new()
        .route("/health", get(health_handler))
        .route("/generate", post(generate_handler))
        .route("/generate/notes", post(notes_handler))
        .route("/generate/slides", post(slides_handler))
        .route("/generate/mindmap", post(mind_map_handler))
        .route("/generate/quiz", post(quiz_handler))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Waits for Ctrl-C, then cancels in-flight generations so the server can drain.
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for the shutdown signal: {}", e);
        // Without a signal handler there is nothing to wait for; keep serving.
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested, cancelling in-flight generations");
    shutdown.cancel();
}
