//! Repository for the `free_trial_tracking` table.

use sqlx::PgPool;

use crate::models::free_trial::FreeTrialTracking;

const COLUMNS: &str = "id, device_id, uses_count, created_at, updated_at";

/// Provides lookup and atomic consumption of per-device free-trial uses.
pub struct FreeTrialRepo;

impl FreeTrialRepo {
    /// Find the tracking row of a device.
    pub async fn find_by_device(
        pool: &PgPool,
        device_id: &str,
    ) -> Result<Option<FreeTrialTracking>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM free_trial_tracking WHERE device_id = $1");
        sqlx::query_as::<_, FreeTrialTracking>(&query)
            .bind(device_id)
            .fetch_optional(pool)
            .await
    }

    /// Record one free-trial use for a device if its allowance permits.
    ///
    /// Upsert-with-check in one statement: an unseen device is inserted with
    /// `uses_count = 1`; an existing row is incremented only while
    /// `uses_count < limit`. Concurrent first contacts serialize on the
    /// unique `device_id` key, so the losers take the conflict branch and see
    /// the winner's count. Returns the updated row, or `None` when the
    /// allowance is exhausted (the row is left untouched).
    pub async fn consume_use(
        pool: &PgPool,
        device_id: &str,
        limit: i32,
    ) -> Result<Option<FreeTrialTracking>, sqlx::Error> {
        let query = format!(
            "INSERT INTO free_trial_tracking (device_id, uses_count) \
             VALUES ($1, 1) \
             ON CONFLICT (device_id) DO UPDATE SET \
                uses_count = free_trial_tracking.uses_count + 1, \
                updated_at = NOW() \
             WHERE free_trial_tracking.uses_count < $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FreeTrialTracking>(&query)
            .bind(device_id)
            .bind(limit)
            .fetch_optional(pool)
            .await
    }
}
