use std::sync::Arc;

use downgrader_core::backend::CompletionBackend;
use downgrader_core::quota::QuotaLedger;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (health checks).
    pub pool: downgrader_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Free-trial and generation-token accounting.
    pub ledger: Arc<dyn QuotaLedger>,
    /// Text-completion service used to rewrite titles.
    pub backend: Arc<dyn CompletionBackend>,
}
