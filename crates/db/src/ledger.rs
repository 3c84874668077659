//! PostgreSQL-backed [`QuotaLedger`].

use async_trait::async_trait;
use chrono::Utc;
use downgrader_core::error::CoreError;
use downgrader_core::quota::{QuotaLedger, TokenBalance, TrialStatus};

use crate::repositories::{FreeTrialRepo, GenerationTokenRepo};
use crate::DbPool;

/// Quota ledger whose consume operations are single conditional statements,
/// safe across any number of server instances sharing the database.
#[derive(Clone)]
pub struct PgQuotaLedger {
    pool: DbPool,
    free_trial_limit: i32,
}

impl PgQuotaLedger {
    pub fn new(pool: DbPool, free_trial_limit: i32) -> Self {
        Self {
            pool,
            free_trial_limit,
        }
    }
}

/// Log a database failure and surface it as an internal error.
fn storage_error(operation: &'static str, err: sqlx::Error) -> CoreError {
    tracing::error!(operation, error = %err, "Quota ledger query failed");
    CoreError::Internal(format!("quota ledger {operation} failed: {err}"))
}

#[async_trait]
impl QuotaLedger for PgQuotaLedger {
    async fn consume_token(&self, token: &str) -> Result<bool, CoreError> {
        let updated = GenerationTokenRepo::consume_one(&self.pool, token)
            .await
            .map_err(|e| storage_error("consume_token", e))?;

        match updated {
            Some(row) => {
                tracing::info!(
                    token_id = row.id,
                    generations_remaining = row.generations_remaining,
                    "Generation token consumed"
                );
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn consume_trial(&self, device_id: &str) -> Result<bool, CoreError> {
        let updated = FreeTrialRepo::consume_use(&self.pool, device_id, self.free_trial_limit)
            .await
            .map_err(|e| storage_error("consume_trial", e))?;

        match updated {
            Some(row) => {
                tracing::info!(
                    device_id,
                    uses_count = row.uses_count,
                    limit = self.free_trial_limit,
                    "Free trial use consumed"
                );
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn trial_status(&self, device_id: &str) -> Result<TrialStatus, CoreError> {
        let row = FreeTrialRepo::find_by_device(&self.pool, device_id)
            .await
            .map_err(|e| storage_error("trial_status", e))?;

        Ok(TrialStatus::from_uses(
            row.map(|r| r.uses_count),
            self.free_trial_limit,
        ))
    }

    async fn token_balance(&self, token: &str) -> Result<Option<TokenBalance>, CoreError> {
        let row = GenerationTokenRepo::find_by_token(&self.pool, token)
            .await
            .map_err(|e| storage_error("token_balance", e))?;

        Ok(row.map(|r| {
            TokenBalance::new(
                r.total_generations,
                r.generations_remaining,
                r.expires_at,
                Utc::now(),
            )
        }))
    }
}
