use crate::parser::ResponseParseError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} {id}")]
    NotFound { entity: &'static str, id: String },

    /// Client input that is present but unusable (blank title, no credential).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A field outside its closed set of accepted values.
    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    #[error("Payment required: {0}")]
    PaymentRequired(String),

    /// The completion backend failed (transport, timeout, status, envelope).
    #[error("Generation backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Parse(#[from] ResponseParseError),

    #[error("Internal error: {0}")]
    Internal(String),
}
