//! Quota ledger interface: free-trial and generation-token accounting.
//!
//! The ledger is the only shared mutable state in the service. Implementations
//! must make each consume operation a single atomic conditional update in the
//! backing store; in-process locking is not enough because several server
//! instances may share one database.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Free generations granted per device when not configured otherwise.
pub const DEFAULT_FREE_TRIAL_LIMIT: i32 = 1;

// ---------------------------------------------------------------------------
// Credential selection
// ---------------------------------------------------------------------------

/// The authorization path a request is accounted against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// A purchased generation token.
    Token(String),
    /// A device identifier using its free-trial allowance.
    Device(String),
}

impl Credential {
    /// Select the authorization path for a request.
    ///
    /// Priority rule: a token, when present, is the only path tried. A device
    /// identifier sent alongside it is ignored, and a failed token never falls
    /// back to the free trial. Empty strings count as absent. Returns `None`
    /// when neither credential is usable.
    pub fn select(token: Option<&str>, device_id: Option<&str>) -> Option<Self> {
        let non_empty = |s: Option<&str>| s.filter(|s| !s.is_empty()).map(str::to_string);

        non_empty(token)
            .map(Credential::Token)
            .or_else(|| non_empty(device_id).map(Credential::Device))
    }

    /// Short label for logging, never the credential itself.
    pub fn kind(&self) -> &'static str {
        match self {
            Credential::Token(_) => "token",
            Credential::Device(_) => "free_trial",
        }
    }
}

// ---------------------------------------------------------------------------
// Read models
// ---------------------------------------------------------------------------

/// Free-trial status of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialStatus {
    pub has_free_trial: bool,
    pub uses_remaining: i32,
}

impl TrialStatus {
    /// Compute status from the recorded use count (`None` = device never seen).
    ///
    /// First contact is always granted, so an unseen device has at least one
    /// use left even when `limit` is 0.
    pub fn from_uses(uses_count: Option<i32>, limit: i32) -> Self {
        let remaining = match uses_count {
            None => limit.max(1),
            Some(used) => limit.saturating_sub(used).max(0),
        };
        Self {
            has_free_trial: remaining > 0,
            uses_remaining: remaining,
        }
    }
}

/// Balance of a generation token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    /// Whether the token can still be redeemed right now.
    pub valid: bool,
    pub total_generations: i32,
    pub generations_remaining: i32,
    pub expires_at: Option<Timestamp>,
}

impl TokenBalance {
    pub fn new(
        total_generations: i32,
        generations_remaining: i32,
        expires_at: Option<Timestamp>,
        now: Timestamp,
    ) -> Self {
        let expired = expires_at.is_some_and(|at| at <= now);
        Self {
            valid: generations_remaining > 0 && !expired,
            total_generations,
            generations_remaining,
            expires_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Authorizes requests and atomically consumes one unit of allowance.
#[async_trait]
pub trait QuotaLedger: Send + Sync {
    /// Consume one generation from `token`.
    ///
    /// Returns `true` iff the token exists, is unexpired, and had at least one
    /// generation left that this call decremented.
    async fn consume_token(&self, token: &str) -> Result<bool, CoreError>;

    /// Consume one free-trial use for `device_id`.
    ///
    /// An unseen device is recorded with one use and granted. A known device is
    /// granted only while its use count is below the configured limit.
    async fn consume_trial(&self, device_id: &str) -> Result<bool, CoreError>;

    /// Read-only free-trial status for `device_id`.
    async fn trial_status(&self, device_id: &str) -> Result<TrialStatus, CoreError>;

    /// Read-only balance of `token`, `None` if the token does not exist.
    async fn token_balance(&self, token: &str) -> Result<Option<TokenBalance>, CoreError>;

    /// Try to consume one unit through the given credential.
    async fn consume(&self, credential: &Credential) -> Result<bool, CoreError> {
        match credential {
            Credential::Token(token) => self.consume_token(token).await,
            Credential::Device(device_id) => self.consume_trial(device_id).await,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    #[test]
    fn token_takes_priority_over_device() {
        assert_eq!(
            Credential::select(Some("tok"), Some("dev")),
            Some(Credential::Token("tok".into()))
        );
    }

    #[test]
    fn device_used_when_no_token() {
        assert_eq!(
            Credential::select(None, Some("dev")),
            Some(Credential::Device("dev".into()))
        );
    }

    #[test]
    fn empty_strings_count_as_absent() {
        assert_eq!(
            Credential::select(Some(""), Some("dev")),
            Some(Credential::Device("dev".into()))
        );
        assert_eq!(Credential::select(Some(""), Some("")), None);
        assert_eq!(Credential::select(None, None), None);
    }

    #[test]
    fn unseen_device_has_full_allowance() {
        let status = TrialStatus::from_uses(None, 3);
        assert!(status.has_free_trial);
        assert_eq!(status.uses_remaining, 3);
    }

    #[test]
    fn zero_limit_still_offers_first_contact() {
        let unseen = TrialStatus::from_uses(None, 0);
        assert!(unseen.has_free_trial);
        assert_eq!(unseen.uses_remaining, 1);

        let after_first = TrialStatus::from_uses(Some(1), 0);
        assert!(!after_first.has_free_trial);
        assert_eq!(after_first.uses_remaining, 0);
    }

    #[test]
    fn remaining_uses_never_negative() {
        assert_eq!(TrialStatus::from_uses(Some(1), 1).uses_remaining, 0);
        assert_eq!(TrialStatus::from_uses(Some(5), 1).uses_remaining, 0);
        assert!(!TrialStatus::from_uses(Some(5), 1).has_free_trial);
        assert_eq!(TrialStatus::from_uses(Some(1), 3).uses_remaining, 2);
    }

    #[test]
    fn trial_status_serializes_camel_case() {
        let json = serde_json::to_value(TrialStatus::from_uses(None, 1)).unwrap();
        assert_eq!(json["hasFreeTrial"], true);
        assert_eq!(json["usesRemaining"], 1);
    }

    #[test]
    fn token_balance_validity() {
        let now = Utc::now();
        assert!(TokenBalance::new(3, 1, None, now).valid);
        assert!(!TokenBalance::new(3, 0, None, now).valid);
        assert!(!TokenBalance::new(3, 2, Some(now - Duration::hours(1)), now).valid);
        assert!(TokenBalance::new(3, 2, Some(now + Duration::hours(1)), now).valid);
    }
}
