use axum::extract::State;
use axum::Json;
use downgrader_core::products::Product;

use crate::state::AppState;

/// GET /api/products -- the configured generation packs, ordered by id.
pub async fn list_products(State(state): State<AppState>) -> Json<Vec<Product>> {
    Json(state.config.products.list())
}
