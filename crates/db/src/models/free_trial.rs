//! Free-trial tracking model.

use downgrader_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `free_trial_tracking` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FreeTrialTracking {
    pub id: DbId,
    pub device_id: String,
    pub uses_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
