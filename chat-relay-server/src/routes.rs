use std::sync::Arc;

use axum::{
    extract::State,
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use chat_relay_shared::ChatMessage;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::error::RelayError;
use crate::llm::{with_system_prompt, CompletionBackend};
use crate::relay;

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn CompletionBackend>,
    pub api_key: Option<Arc<str>>,
}

impl AppState {
    pub fn new(backend: Arc<dyn CompletionBackend>, api_key: Option<String>) -> Self {
        Self {
            backend,
            api_key: api_key.map(Arc::from),
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

/// Relays the completion for a JSON array of messages as a plain-text stream.
async fn chat(State(state): State<AppState>, body: Bytes) -> Result<Response, RelayError> {
    // Parsed from raw bytes so that every malformed body is a 400, whatever its content type.
    let messages: Vec<ChatMessage> =
        serde_json::from_slice(&body).map_err(RelayError::InvalidJson)?;

    let api_key = state.api_key.as_deref().ok_or(RelayError::MissingApiKey)?;

    info!("Chat request with {} messages", messages.len());

    let chunks = state
        .backend
        .stream_completion(api_key, with_system_prompt(messages))
        .await?;
    let chunks = relay::open(chunks).await?;

    Ok((
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        relay::relay_body(chunks),
    )
        .into_response())
}
