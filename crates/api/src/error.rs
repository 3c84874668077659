use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use downgrader_core::error::CoreError;
use serde_json::json;

/// Generic message returned for any failed generation; details stay in logs.
const GENERATION_FAILED_MESSAGE: &str = "An error occurred while downgrading the title";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `downgrader_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A request body that could not be read as JSON.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map a domain error to an HTTP status, error code, and client-facing message.
///
/// Generation failures (backend and parse) get distinct codes but the same
/// generic message; their causes are logged, not returned.
fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, .. } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Unprocessable(msg) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "UNPROCESSABLE",
            msg.clone(),
        ),
        CoreError::PaymentRequired(msg) => (
            StatusCode::PAYMENT_REQUIRED,
            "PAYMENT_REQUIRED",
            msg.clone(),
        ),
        CoreError::Backend(cause) => {
            tracing::error!(error = %cause, "Generation backend failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "GENERATION_FAILED",
                GENERATION_FAILED_MESSAGE.to_string(),
            )
        }
        CoreError::Parse(parse_err) => {
            tracing::error!(excerpt = %parse_err.excerpt, "Unparseable model response");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "PARSE_FAILED",
                GENERATION_FAILED_MESSAGE.to_string(),
            )
        }
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal_error()
        }
    }
}

fn internal_error() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
