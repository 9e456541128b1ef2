use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PollError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Voter {voter_id} already voted")]
    DuplicateVoter { voter_id: String },

    #[error("Not found: {path}")]
    NotFound { path: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PollError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            PollError::InvalidInput { .. } | PollError::Serialization(_) => StatusCode::BAD_REQUEST,
            PollError::DuplicateVoter { .. } => StatusCode::CONFLICT,
            PollError::NotFound { .. } => StatusCode::NOT_FOUND,
            PollError::InvalidConfigValue { .. } | PollError::Io(_) | PollError::Http(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short message safe to hand back to a browser.
    pub fn client_message(&self) -> &'static str {
        match self {
            PollError::InvalidInput { .. } | PollError::Serialization(_) => "Bad request",
            PollError::DuplicateVoter { .. } => "Already voted",
            PollError::NotFound { .. } => "Not found",
            _ => "Internal error",
        }
    }
}

impl IntoResponse for PollError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if let PollError::NotFound { .. } = self {
            return (status, self.client_message()).into_response();
        }

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        (status, Json(json!({ "error": self.client_message() }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, PollError>;
