use axum::{
    Json,
    extract::{multipart::MultipartRejection, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::utils::validation::FieldErrors;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    Internal(String),

    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// A body that is not valid JSON for the request type is reported like any
/// other field error, under the `body` key.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        body_error(rejection.body_text())
    }
}

/// Same for an upload that is not `multipart/form-data` at all.
impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        body_error(rejection.body_text())
    }
}

fn body_error(message: String) -> AppError {
    let mut errors = FieldErrors::new();
    errors.add("body", message);
    AppError::Validation(errors)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "message": "Validation errors", "errors": errors }),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "message": msg })),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "message": msg })),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, json!({ "message": msg }))
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                failure(e.to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                failure(msg)
            }
            AppError::Anyhow(e) => {
                tracing::error!("Anyhow error: {:?}", e);
                failure(format!("{:#}", e))
            }
        };

        (status, Json(body)).into_response()
    }
}

fn failure(detail: String) -> (StatusCode, serde_json::Value) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "message": "Something went wrong", "error": detail }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    async fn render(error: AppError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_error_shape() {
        let mut errors = FieldErrors::new();
        errors.add("category_en", "The category en has already been taken.");

        let (status, body) = render(AppError::Validation(errors)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], "Validation errors");
        assert_eq!(
            body["errors"]["category_en"][0],
            "The category en has already been taken."
        );
    }

    #[tokio::test]
    async fn test_not_found_shape() {
        let (status, body) = render(AppError::NotFound("Category not found".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Category not found");
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn test_internal_error_carries_detail() {
        let (status, body) = render(AppError::Internal("disk full".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Something went wrong");
        assert_eq!(body["error"], "disk full");
    }
}
