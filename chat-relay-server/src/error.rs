use async_openai::error::OpenAIError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chat_relay_shared::ErrorBody;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Invalid JSON")]
    InvalidJson(#[source] serde_json::Error),

    #[error("API key not found")]
    MissingApiKey,

    #[error("Upstream completion failed: {0}")]
    Upstream(#[from] OpenAIError),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            RelayError::MissingApiKey | RelayError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            RelayError::InvalidJson(e) => error!("Failed to parse chat request: {}", e),
            RelayError::MissingApiKey => error!("Chat request rejected: OPENAI_API_KEY is not set"),
            RelayError::Upstream(e) => error!("Upstream completion failed: {:?}", e),
        }
        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}
