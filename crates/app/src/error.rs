use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pdf_chat_core::{ChatError, IngestError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(&'static str),

    #[error("{0}")]
    InvalidUpload(String),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Chat(#[from] ChatError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            ApiError::Ingest(_) | ApiError::Chat(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "rejected request");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downstream_failures_are_server_errors() {
        let error = ApiError::from(IngestError::EmptyText);
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            error.to_string(),
            "no text could be extracted from the uploaded PDF(s)"
        );
    }

    #[test]
    fn input_errors_are_bad_requests() {
        assert_eq!(
            ApiError::BadRequest("No files uploaded").status(),
            StatusCode::BAD_REQUEST
        );
    }
}
