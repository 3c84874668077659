//! Request orchestration for a single title downgrade.
//!
//! A request moves through
//! `Received -> Authorizing -> Generating -> Parsing -> Completed`.
//! Validation and authorization failures end in `Rejected`; backend and
//! parse failures end in `Failed`. Each request makes at most one
//! authorization attempt and at most one backend call, and quota consumed
//! before a failed generation is not refunded.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::backend::CompletionBackend;
use crate::error::CoreError;
use crate::generation::{clamp_hype_score, Intensity, Language};
use crate::parser::parse_response;
use crate::prompt::build_prompt;
use crate::quota::{Credential, QuotaLedger};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Inbound body of `POST /api/downgrade`.
///
/// `intensity` and `language` stay as raw strings here so that unknown values
/// are rejected by [`validate_request`] rather than by the deserializer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DowngradeRequest {
    pub title: String,
    pub intensity: Option<String>,
    pub language: Option<String>,
    #[serde(alias = "device_id")]
    pub device_id: Option<String>,
    pub token: Option<String>,
}

/// Outbound body of a successful downgrade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DowngradeResponse {
    pub original: String,
    pub downgraded: String,
    /// Always within `[1, 10]`.
    pub hype_score: i64,
    pub intensity: Intensity,
    pub language: Language,
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DowngradeStage {
    Received,
    Authorizing,
    Generating,
    Parsing,
    Completed,
    Rejected,
    Failed,
}

impl fmt::Display for DowngradeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DowngradeStage::Received => "received",
            DowngradeStage::Authorizing => "authorizing",
            DowngradeStage::Generating => "generating",
            DowngradeStage::Parsing => "parsing",
            DowngradeStage::Completed => "completed",
            DowngradeStage::Rejected => "rejected",
            DowngradeStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A request that passed the `Received` checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    /// The title with surrounding whitespace removed.
    pub title: String,
    pub intensity: Intensity,
    pub language: Language,
    pub credential: Credential,
}

/// Validate an inbound request.
///
/// Checks run in a fixed order: blank title (400) first, then the closed-set
/// `intensity` / `language` values (422), then credential presence (400).
pub fn validate_request(request: &DowngradeRequest) -> Result<ValidatedRequest, CoreError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(CoreError::Validation("Title must not be empty".to_string()));
    }

    let intensity = match request.intensity.as_deref() {
        Some(raw) => raw.parse()?,
        None => Intensity::default(),
    };
    let language = match request.language.as_deref() {
        Some(raw) => raw.parse()?,
        None => Language::default(),
    };

    let credential = Credential::select(request.token.as_deref(), request.device_id.as_deref())
        .ok_or_else(|| {
            CoreError::Validation(
                "Either deviceId (for free trial) or token (for paid use) is required".to_string(),
            )
        })?;

    Ok(ValidatedRequest {
        title: title.to_string(),
        intensity,
        language,
        credential,
    })
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Runs one downgrade request against a quota ledger and completion backend.
pub struct Downgrader<'a> {
    ledger: &'a dyn QuotaLedger,
    backend: &'a dyn CompletionBackend,
}

impl<'a> Downgrader<'a> {
    pub fn new(ledger: &'a dyn QuotaLedger, backend: &'a dyn CompletionBackend) -> Self {
        Self { ledger, backend }
    }

    pub async fn run(&self, request: &DowngradeRequest) -> Result<DowngradeResponse, CoreError> {
        tracing::debug!(stage = %DowngradeStage::Received, "Downgrade request received");
        let validated = validate_request(request).map_err(|e| reject(DowngradeStage::Received, e))?;

        tracing::debug!(
            stage = %DowngradeStage::Authorizing,
            path = validated.credential.kind(),
            "Authorizing downgrade"
        );
        self.authorize(&validated.credential)
            .await
            .map_err(|e| reject(DowngradeStage::Authorizing, e))?;

        tracing::debug!(stage = %DowngradeStage::Generating, "Calling completion backend");
        let prompt = build_prompt(&validated.title, validated.intensity, validated.language);
        let raw = self
            .backend
            .complete(&prompt)
            .await
            .map_err(|e| fail(DowngradeStage::Generating, e))?;

        tracing::debug!(stage = %DowngradeStage::Parsing, "Parsing backend response");
        let parsed = parse_response(&raw).map_err(|e| fail(DowngradeStage::Parsing, e.into()))?;

        let hype_score = clamp_hype_score(parsed.hype_score);
        tracing::info!(
            stage = %DowngradeStage::Completed,
            path = validated.credential.kind(),
            raw_hype_score = parsed.hype_score,
            hype_score,
            "Downgrade completed"
        );

        Ok(DowngradeResponse {
            original: validated.title,
            downgraded: parsed.downgraded,
            hype_score,
            intensity: validated.intensity,
            language: validated.language,
        })
    }

    async fn authorize(&self, credential: &Credential) -> Result<(), CoreError> {
        if self.ledger.consume(credential).await? {
            return Ok(());
        }
        let message = match credential {
            Credential::Token(_) => {
                "Token is invalid, expired, or has no remaining generations"
            }
            Credential::Device(_) => "Free trial exhausted. Please purchase credits to continue.",
        };
        Err(CoreError::PaymentRequired(message.to_string()))
    }
}

/// Log a transition into `Rejected` and pass the error through.
fn reject(from: DowngradeStage, err: CoreError) -> CoreError {
    tracing::info!(
        from = %from,
        stage = %DowngradeStage::Rejected,
        error = %err,
        "Downgrade rejected"
    );
    err
}

/// Log a transition into `Failed` with the full cause and pass the error through.
fn fail(from: DowngradeStage, err: CoreError) -> CoreError {
    tracing::error!(
        from = %from,
        stage = %DowngradeStage::Failed,
        error = %err,
        "Downgrade failed"
    );
    err
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
