//! Closed-set request parameters and output bounds for title generation.
//!
//! `intensity` and `language` arrive as free-form strings on the wire and are
//! validated here, at the request-parsing boundary, before any quota is
//! touched.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Lowest hype score a response may carry.
pub const MIN_HYPE_SCORE: i64 = 1;

/// Highest hype score a response may carry.
pub const MAX_HYPE_SCORE: i64 = 10;

/// Clamp a model-reported hype score into `[MIN_HYPE_SCORE, MAX_HYPE_SCORE]`.
pub fn clamp_hype_score(raw: i64) -> i64 {
    raw.clamp(MIN_HYPE_SCORE, MAX_HYPE_SCORE)
}

// ---------------------------------------------------------------------------
// Intensity
// ---------------------------------------------------------------------------

/// How deflated the rewritten title should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Mild,
    #[default]
    Normal,
    Brutal,
}

impl Intensity {
    pub const ALL: [Intensity; 3] = [Intensity::Mild, Intensity::Normal, Intensity::Brutal];

    pub fn as_str(self) -> &'static str {
        match self {
            Intensity::Mild => "mild",
            Intensity::Normal => "normal",
            Intensity::Brutal => "brutal",
        }
    }
}

impl FromStr for Intensity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Intensity::ALL
            .into_iter()
            .find(|i| i.as_str() == s)
            .ok_or_else(|| {
                CoreError::Unprocessable(format!(
                    "Invalid intensity '{s}'. Must be one of: mild, normal, brutal"
                ))
            })
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// Output language of the rewritten title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
    Ja,
    De,
    Fr,
    Ko,
    Es,
}

impl Language {
    pub const ALL: [Language; 7] = [
        Language::En,
        Language::Zh,
        Language::Ja,
        Language::De,
        Language::Fr,
        Language::Ko,
        Language::Es,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Zh => "zh",
            Language::Ja => "ja",
            Language::De => "de",
            Language::Fr => "fr",
            Language::Ko => "ko",
            Language::Es => "es",
        }
    }
}

impl FromStr for Language {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| {
                CoreError::Unprocessable(format!(
                    "Invalid language '{s}'. Must be one of: en, zh, ja, de, fr, ko, es"
                ))
            })
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
