//! Generation token model and DTOs.

use downgrader_core::error::CoreError;
use downgrader_core::products::ProductCatalog;
use downgrader_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `generation_tokens` table.
///
/// **Note:** `token` is the bearer credential and is never serialized.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GenerationToken {
    pub id: DbId,
    #[serde(skip_serializing)]
    pub token: String,
    pub product_id: Option<String>,
    pub total_generations: i32,
    pub generations_remaining: i32,
    pub expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for issuing a new token after a successful payment.
#[derive(Debug, Clone)]
pub struct IssueGenerationToken {
    pub token: String,
    pub product_id: Option<String>,
    pub generations: i32,
    pub expires_at: Option<Timestamp>,
}

impl IssueGenerationToken {
    /// Build the issuance for a purchased pack, taking the generation count
    /// from the catalog. Unknown products are `NotFound`.
    pub fn for_product(
        catalog: &ProductCatalog,
        product_id: &str,
        token: String,
        expires_at: Option<Timestamp>,
    ) -> Result<Self, CoreError> {
        let generations = catalog.generations_for(product_id)?;
        Ok(Self {
            token,
            product_id: Some(product_id.to_string()),
            generations,
            expires_at,
        })
    }
}
