//! Repository for the `generation_tokens` table.

use sqlx::PgPool;

use crate::models::generation_token::{GenerationToken, IssueGenerationToken};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, token, product_id, total_generations, generations_remaining, \
                        expires_at, created_at, updated_at";

/// Provides issuance, lookup and atomic consumption of generation tokens.
pub struct GenerationTokenRepo;

impl GenerationTokenRepo {
    /// Insert a new token with its full generation allowance.
    pub async fn issue(
        pool: &PgPool,
        input: &IssueGenerationToken,
    ) -> Result<GenerationToken, sqlx::Error> {
        let query = format!(
            "INSERT INTO generation_tokens \
                (token, product_id, total_generations, generations_remaining, expires_at) \
             VALUES ($1, $2, $3, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GenerationToken>(&query)
            .bind(&input.token)
            .bind(&input.product_id)
            .bind(input.generations)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find a token by its credential string, regardless of balance or expiry.
    pub async fn find_by_token(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<GenerationToken>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM generation_tokens WHERE token = $1");
        sqlx::query_as::<_, GenerationToken>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// Decrement the balance of a live token by one.
    ///
    /// A single conditional `UPDATE`: the row lock serializes concurrent
    /// callers and the `generations_remaining > 0` predicate is re-checked
    /// against the latest row version, so the last unit is handed out once.
    /// Returns the updated row, or `None` when the token is unknown, expired
    /// or exhausted.
    pub async fn consume_one(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<GenerationToken>, sqlx::Error> {
        let query = format!(
            "UPDATE generation_tokens \
             SET generations_remaining = generations_remaining - 1, updated_at = NOW() \
             WHERE token = $1 \
               AND generations_remaining > 0 \
               AND (expires_at IS NULL OR expires_at > NOW()) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GenerationToken>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }
}
