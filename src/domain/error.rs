use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum KanbanError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("gateway error: {0}")]
    Gateway(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl KanbanError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, KanbanError::Gateway(_) | KanbanError::Parse(_))
    }
}

impl IntoResponse for KanbanError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            KanbanError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            KanbanError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            KanbanError::Gateway(msg) | KanbanError::Parse(msg) => {
                tracing::warn!(error = %self, "AI gateway call failed");
                (StatusCode::BAD_GATEWAY, msg.clone())
            }
            KanbanError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            KanbanError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            KanbanError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            KanbanError::Database(err) => {
                tracing::error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
            KanbanError::Serialization(err) => {
                tracing::error!("Serialization error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
        };

        let mut body = json!({
            "error": message,
            "status": status.as_u16(),
        });
        if self.is_retryable() {
            body["retryable"] = json!(true);
        }

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_and_parse_errors_are_retryable() {
        assert!(KanbanError::Gateway("timeout".into()).is_retryable());
        assert!(KanbanError::Parse("bad json".into()).is_retryable());
        assert!(!KanbanError::Validation("empty".into()).is_retryable());
        assert!(!KanbanError::NotFound("col-9".into()).is_retryable());
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (KanbanError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (KanbanError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (KanbanError::Gateway("x".into()), StatusCode::BAD_GATEWAY),
            (KanbanError::Parse("x".into()), StatusCode::BAD_GATEWAY),
            (KanbanError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (KanbanError::Conflict("x".into()), StatusCode::CONFLICT),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
