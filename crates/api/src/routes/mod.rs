pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /downgrade                   rewrite a title (POST)
/// /trial-status/{device_id}    free-trial balance of a device (GET)
/// /tokens/{token}              balance of a generation token (GET)
/// /products                    purchasable generation packs (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/downgrade", post(handlers::downgrade::downgrade_title))
        .route(
            "/trial-status/{device_id}",
            get(handlers::quota::get_trial_status),
        )
        .route("/tokens/{token}", get(handlers::quota::get_token_balance))
        .route("/products", get(handlers::products::list_products))
}
