//! Error handling for the shelf HTTP layer

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::html::escape;

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("not found: {message}")]
    NotFound { message: String, code: String },

    #[error("bad request: {message}")]
    BadRequest { message: String, code: String },

    #[error("request timed out")]
    Timeout,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            code: "not_found".to_string(),
        }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            code: "bad_request".to_string(),
        }
    }

    fn parts(self) -> (StatusCode, String, String) {
        match self {
            AppError::NotFound { message, code } => (StatusCode::NOT_FOUND, code, message),
            AppError::BadRequest { message, code } => (StatusCode::BAD_REQUEST, code, message),
            AppError::Timeout => (
                StatusCode::REQUEST_TIMEOUT,
                "timeout".to_string(),
                "The request took too long; try again.".to_string(),
            ),
            AppError::Internal(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error".to_string(),
                e.to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let timestamp = OffsetDateTime::now_utc();

        let (status, error_code, message) = self.parts();

        tracing::error!(
            error_id = %error_id,
            error_code = %error_code,
            status_code = %status.as_u16(),
            %message,
            "Request error"
        );

        let message = if cfg!(not(debug_assertions)) && status == StatusCode::INTERNAL_SERVER_ERROR
        {
            "An internal server error occurred".to_string()
        } else {
            message
        };

        let body = format!(
            concat!(
                "<!doctype html>\n",
                "<html><head><meta charset=\"utf-8\"><title>{status}</title></head>\n",
                "<body>\n",
                "<h1>{status}</h1>\n",
                "<p class=\"error-message\">{message}</p>\n",
                "<p><small>code {code} · trace {trace} · {timestamp}</small></p>\n",
                "<p><a href=\"/\">Back to the book list</a></p>\n",
                "</body></html>\n",
            ),
            status = status,
            message = escape(&message),
            code = error_code,
            trace = error_id,
            timestamp = timestamp,
        );

        (status, Html(body)).into_response()
    }
}
