use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application error types
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Internal(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "{}", msg),
            AppError::Internal(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(ref msg) => {
                tracing::error!("Web form request failed: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // The page reads the same envelope for every failure
        let body = json!({ "status": "error", "message": self.to_string() });
        (status, Json(body)).into_response()
    }
}
