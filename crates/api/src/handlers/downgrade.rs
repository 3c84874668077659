//! Handler for `POST /api/downgrade`.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use downgrader_core::downgrade::{DowngradeRequest, DowngradeResponse, Downgrader};
use downgrader_core::error::CoreError;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Rewrite a title, charging one unit of the caller's token or free trial.
///
/// Validation, authorization, generation and parsing are sequenced by
/// [`Downgrader`]; its errors map onto 400 / 402 / 422 / 500 via `AppError`.
pub async fn downgrade_title(
    State(state): State<AppState>,
    payload: Result<Json<DowngradeRequest>, JsonRejection>,
) -> AppResult<Json<DowngradeResponse>> {
    let Json(body) = payload.map_err(reject_body)?;
    let response = Downgrader::new(state.ledger.as_ref(), state.backend.as_ref())
        .run(&body)
        .await?;
    Ok(Json(response))
}

/// Well-formed JSON with missing or mistyped fields is 422, anything else
/// (syntax errors, wrong content type) is 400.
fn reject_body(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::JsonDataError(err) => CoreError::Unprocessable(err.body_text()).into(),
        other => AppError::BadRequest(other.body_text()),
    }
}
