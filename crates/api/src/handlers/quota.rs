//! Read-only quota endpoints: free-trial status and token balance.

use axum::extract::{Path, State};
use axum::Json;
use downgrader_core::error::CoreError;
use downgrader_core::quota::{TokenBalance, TrialStatus};

use crate::error::AppResult;
use crate::state::AppState;

/// GET /api/trial-status/{device_id}
pub async fn get_trial_status(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> AppResult<Json<TrialStatus>> {
    let status = state.ledger.trial_status(&device_id).await?;
    Ok(Json(status))
}

/// GET /api/tokens/{token}
///
/// Unknown tokens are 404; exhausted or expired ones are returned with
/// `valid: false`.
pub async fn get_token_balance(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<TokenBalance>> {
    let balance = state
        .ledger
        .token_balance(&token)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Token",
            id: token,
        })?;
    Ok(Json(balance))
}
