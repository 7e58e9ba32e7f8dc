//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.
//!
//! Generation endpoints always answer `200` once the payload is valid. Failed generations
//! come back as fallback content with `isFallback: true`.

use crate::web::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use study_content_core::{
    Branch, Difficulty, GeneratedContent, GenerationRequest, LectureNotes, MindMap, Question,
    QuestionType, Quiz, Slide, SlideDeck, Subtopic,
};
use tracing::{info, warn};
use utoipa::{OpenApi, ToSchema};

/// Largest quiz a single request may ask for.
pub const MAX_QUESTIONS: u32 = 50;

type HandlerError = (StatusCode, String);

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        notes_handler,
        slides_handler,
        mind_map_handler,
        quiz_handler,
        generate_handler,
    ),
    components(
        schemas(
            HealthResponse, NotesPayload, SlidesPayload, MindMapPayload, QuizPayload,
            GenerationRequest, GeneratedContent, Difficulty,
            LectureNotes, SlideDeck, Slide, MindMap, Branch, Subtopic, Quiz, Question, QuestionType
        )
    ),
    tags(
        (name = "Study Content API", description = "AI-generated lecture notes, slides, mind maps and quizzes.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: String,
    /// False means every generation will fall back until an API key is configured.
    completion_configured: bool,
    model: String,
    timeout_secs: u64,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotesPayload {
    file_name: String,
    #[serde(default)]
    transcript: String,
}

#[derive(Deserialize, ToSchema)]
pub struct SlidesPayload {
    content: String,
}

#[derive(Deserialize, ToSchema)]
pub struct MindMapPayload {
    outline: String,
}

#[derive(Deserialize, ToSchema)]
pub struct QuizPayload {
    material: String,
    /// One of `easy`, `medium` or `hard`.
    difficulty: String,
    count: u32,
}

//=========================================================================================
// Validation
//=========================================================================================

fn bad_request(message: impl Into<String>) -> HandlerError {
    (StatusCode::BAD_REQUEST, message.into())
}

fn require_text(value: &str, field: &str) -> Result<(), HandlerError> {
    if value.trim().is_empty() {
        return Err(bad_request(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Form-level checks only; content quality is the generator's concern.
fn validate(request: &GenerationRequest) -> Result<(), HandlerError> {
    match request {
        // An empty transcript is allowed; the file name alone still names the lecture.
        GenerationRequest::Notes { file_name, .. } => require_text(file_name, "fileName"),
        GenerationRequest::Slides { content } => require_text(content, "content"),
        GenerationRequest::MindMap { outline } => require_text(outline, "outline"),
        GenerationRequest::Quiz {
            material, count, ..
        } => {
            require_text(material, "material")?;
            if !(1..=MAX_QUESTIONS).contains(count) {
                return Err(bad_request(format!(
                    "count must be between 1 and {MAX_QUESTIONS}"
                )));
            }
            Ok(())
        }
    }
}

fn log_outcome(content: &GeneratedContent) {
    if content.is_fallback() {
        warn!(kind = %content.kind(), "Serving fallback content");
    } else {
        info!(kind = %content.kind(), "Serving generated content");
    }
}

/// Validates and runs one generation, observing the server's shutdown token.
async fn run(
    state: &AppState,
    request: GenerationRequest,
) -> Result<GeneratedContent, HandlerError> {
    validate(&request)?;
    let content = state
        .generator
        .generate_cancellable(&request, &state.shutdown)
        .await;
    log_outcome(&content);
    Ok(content)
}

/// Raised when `run` hands back a different kind than the request asked for.
fn kind_mismatch() -> HandlerError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Generator returned an unexpected content kind".to_string(),
    )
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Reports liveness, whether the completion provider is configured, and the model in use.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    )
)]
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        completion_configured: state.completion_configured,
        model: state.config.completion_model.clone(),
        timeout_secs: state.generator.timeout().as_secs(),
    })
}

/// Generate lecture notes from a recording's file name and transcript.
#[utoipa::path(
    post,
    path = "/generate/notes",
    request_body = NotesPayload,
    responses(
        (status = 200, description = "Lecture notes; `isFallback` marks placeholder content", body = LectureNotes),
        (status = 400, description = "Missing file name")
    )
)]
pub async fn notes_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NotesPayload>,
) -> Result<Json<LectureNotes>, HandlerError> {
    let request = GenerationRequest::Notes {
        file_name: payload.file_name,
        transcript: payload.transcript,
    };
    match run(&state, request).await? {
        GeneratedContent::Notes(notes) => Ok(Json(notes)),
        _ => Err(kind_mismatch()),
    }
}

/// Generate a slide deck from course content.
#[utoipa::path(
    post,
    path = "/generate/slides",
    request_body = SlidesPayload,
    responses(
        (status = 200, description = "Slide deck; `isFallback` marks placeholder content", body = SlideDeck),
        (status = 400, description = "Empty course content")
    )
)]
pub async fn slides_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SlidesPayload>,
) -> Result<Json<SlideDeck>, HandlerError> {
    let request = GenerationRequest::Slides {
        content: payload.content,
    };
    match run(&state, request).await? {
        GeneratedContent::Slides(deck) => Ok(Json(deck)),
        _ => Err(kind_mismatch()),
    }
}

/// Generate a mind map from a course outline.
#[utoipa::path(
    post,
    path = "/generate/mindmap",
    request_body = MindMapPayload,
    responses(
        (status = 200, description = "Mind map; `isFallback` marks placeholder content", body = MindMap),
        (status = 400, description = "Empty course outline")
    )
)]
pub async fn mind_map_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<MindMapPayload>,
) -> Result<Json<MindMap>, HandlerError> {
    let request = GenerationRequest::MindMap {
        outline: payload.outline,
    };
    match run(&state, request).await? {
        GeneratedContent::MindMap(map) => Ok(Json(map)),
        _ => Err(kind_mismatch()),
    }
}

/// Generate a multiple-choice quiz from study material.
#[utoipa::path(
    post,
    path = "/generate/quiz",
    request_body = QuizPayload,
    responses(
        (status = 200, description = "Quiz; fallback quizzes are titled \"Quiz (Fallback Mode)\"", body = Quiz),
        (status = 400, description = "Empty material, unknown difficulty or count outside 1..=50")
    )
)]
pub async fn quiz_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QuizPayload>,
) -> Result<Json<Quiz>, HandlerError> {
    let difficulty = payload
        .difficulty
        .parse::<Difficulty>()
        .map_err(|e| bad_request(e.to_string()))?;
    let request = GenerationRequest::Quiz {
        material: payload.material,
        difficulty,
        count: payload.count,
    };
    match run(&state, request).await? {
        GeneratedContent::Quiz(quiz) => Ok(Json(quiz)),
        _ => Err(kind_mismatch()),
    }
}

/// Generic entry point taking a `kind`-tagged request and answering with tagged content.
///
/// Body rejections (malformed JSON, unknown kind or difficulty) are answered with `400`.
#[utoipa::path(
    post,
    path = "/generate",
    request_body = GenerationRequest,
    responses(
        (status = 200, description = "Content tagged with its kind; `isFallback` marks placeholder content", body = GeneratedContent),
        (status = 400, description = "Malformed request, unknown difficulty, blank subject or count outside 1..=50")
    )
)]
pub async fn generate_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Json<GeneratedContent>, HandlerError> {
    let Json(request) = payload.map_err(|rejection| bad_request(rejection.body_text()))?;
    run(&state, request).await.map(Json)
}
