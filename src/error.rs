// src/error.rs
//! Error taxonomy for the service.
//!
//! Four families, each with a distinct propagation policy:
//! - `Validation`: bad request input, surfaces as 400.
//! - `Config`: missing environment configuration, surfaces as 500.
//! - `Upstream`: news API / SMTP failures, surface as 502. Never retried.
//! - `Storage`: document-store failures. Fatal on the primary ingestion
//!   write; logged and suppressed on best-effort side writes (polarity
//!   persistence during analyze, CSV cache append).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Config(String),

    #[error("upstream failure: {0}")]
    Upstream(String),

    #[error("storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}
