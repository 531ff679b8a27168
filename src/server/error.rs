//! Error types for the HTTP layer

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Body missing, malformed, or not matching the input schema
    #[error("Invalid request: {0}")]
    Validation(#[from] JsonRejection),

    /// A model failed on an otherwise valid request
    #[error("Inference error: {0:#}")]
    Inference(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(rejection) => {
                let status = rejection.status();
                let body = Json(json!({
                    "detail": [{ "msg": rejection.body_text() }],
                }));
                (status, body).into_response()
            }
            ApiError::Inference(e) => {
                tracing::error!(detail = %format!("{:#}", e), "Prediction failed");
                let body = Json(json!({
                    "error": true,
                    "message": "Prediction failed",
                }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
