//! Extraction of the structured downgrade result from raw model output.
//!
//! Models are asked for bare JSON but regularly wrap it in code fences,
//! surround it with prose, or emit trailing commas. Parsing is an ordered
//! fallback: strict JSON first, then independent regex extraction of each
//! field.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum number of characters of offending text kept in a parse error.
pub const MAX_EXCERPT_CHARS: usize = 200;

static LEADING_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```(?:json)?\s*").expect("valid regex"));

static TRAILING_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*```$").expect("valid regex"));

static DOWNGRADED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""downgraded"\s*:\s*"((?:[^"\\]|\\.)*)""#).expect("valid regex")
});

static HYPE_SCORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""hype_score"\s*:\s*(-?\d+)"#).expect("valid regex"));

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The two fields the model is asked to produce. `hype_score` is unclamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDowngrade {
    pub downgraded: String,
    pub hype_score: i64,
}

/// Model output from which neither strategy could recover both fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unable to parse model response: {excerpt}")]
pub struct ResponseParseError {
    /// At most [`MAX_EXCERPT_CHARS`] characters of the cleaned text.
    pub excerpt: String,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse raw model text into a [`ParsedDowngrade`].
pub fn parse_response(text: &str) -> Result<ParsedDowngrade, ResponseParseError> {
    let cleaned = strip_code_fences(text);

    if let Some(parsed) = parse_strict(cleaned) {
        return Ok(parsed);
    }

    if let Some(parsed) = parse_lenient(cleaned) {
        return Ok(parsed);
    }

    Err(ResponseParseError {
        excerpt: cleaned.chars().take(MAX_EXCERPT_CHARS).collect(),
    })
}

/// Trim the text and remove a leading (optionally `json`-tagged) and a
/// trailing markdown code fence.
fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let text = match LEADING_FENCE_RE.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    };
    let text = match TRAILING_FENCE_RE.find(text) {
        Some(m) => &text[..m.start()],
        None => text,
    };
    text.trim()
}

fn parse_strict(text: &str) -> Option<ParsedDowngrade> {
    let value: Value = serde_json::from_str(text).ok()?;
    let object = value.as_object()?;
    let downgraded = object.get("downgraded")?.as_str()?;
    let hype_score = score_from_number(object.get("hype_score")?)?;
    Some(ParsedDowngrade {
        downgraded: downgraded.to_string(),
        hype_score,
    })
}

fn parse_lenient(text: &str) -> Option<ParsedDowngrade> {
    let raw = DOWNGRADED_RE.captures(text)?.get(1)?.as_str();
    let digits = HYPE_SCORE_RE.captures(text)?.get(1)?.as_str();
    let hype_score = saturating_parse(digits);
    Some(ParsedDowngrade {
        downgraded: unescape_json_string(raw),
        hype_score,
    })
}

/// Read a JSON number as an integer score. Fractions are truncated toward
/// zero and magnitudes beyond `i64` saturate.
fn score_from_number(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    if value.is_u64() {
        return Some(i64::MAX);
    }
    let f = value.as_f64()?;
    // `as` saturates at the i64 bounds.
    f.is_finite().then_some(f as i64)
}

/// Parse a `-?\d+` capture, saturating on overflow.
fn saturating_parse(digits: &str) -> i64 {
    digits.parse::<i64>().unwrap_or(if digits.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Decode JSON string escapes in a captured value. Falls back to unescaping
/// quotes only when the capture is not a valid JSON string body.
fn unescape_json_string(raw: &str) -> String {
    serde_json::from_str::<String>(&format!("\"{raw}\""))
        .unwrap_or_else(|_| raw.replace("\\\"", "\""))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json() {
        let r = parse_response(r#"{"downgraded": "ok", "hype_score": 5}"#).unwrap();
        assert_eq!(r.downgraded, "ok");
        assert_eq!(r.hype_score, 5);
    }

    #[test]
    fn parses_json_inside_tagged_code_fence() {
        let text = "```json\n{\"downgraded\": \"ok\", \"hype_score\": 5}\n```";
        let r = parse_response(text).unwrap();
        assert_eq!(r.downgraded, "ok");
        assert_eq!(r.hype_score, 5);
    }

    #[test]
    fn parses_json_inside_untagged_code_fence() {
        let r = parse_response("  ```\n{\"downgraded\": \"ok\", \"hype_score\": 2}```  ").unwrap();
        assert_eq!(r, ParsedDowngrade { downgraded: "ok".into(), hype_score: 2 });
    }

    #[test]
    fn encoded_pair_survives_fencing() {
        let value = serde_json::json!({
            "downgraded": "A \"fine\" product\nthat exists",
            "hype_score": 9,
        });
        let encoded = value.to_string();
        let bare = parse_response(&encoded).unwrap();
        let fenced = parse_response(&format!("```json\n{encoded}\n```")).unwrap();
        assert_eq!(bare.downgraded, "A \"fine\" product\nthat exists");
        assert_eq!(bare.hype_score, 9);
        assert_eq!(bare, fenced);
    }

    #[test]
    fn trailing_comma_falls_back_to_regex() {
        let r = parse_response(r#"{"downgraded": "ok", "hype_score": 5,}"#).unwrap();
        assert_eq!(r.downgraded, "ok");
        assert_eq!(r.hype_score, 5);
    }

    #[test]
    fn json_wrapped_in_prose_is_extracted() {
        let text = concat!(
            r#"Sure! Here you go: {"downgraded": "Man buys shoes", "hype_score": 8}"#,
            " Hope that helps."
        );
        let r = parse_response(text).unwrap();
        assert_eq!(r.downgraded, "Man buys shoes");
        assert_eq!(r.hype_score, 8);
    }

    #[test]
    fn regex_fallback_unescapes_quotes() {
        let text = r#"{"downgraded": "It is \"fine\"", "hype_score": 3,}"#;
        let r = parse_response(text).unwrap();
        assert_eq!(r.downgraded, "It is \"fine\"");
    }

    #[test]
    fn out_of_range_scores_are_returned_unclamped() {
        let r = parse_response(r#"{"downgraded": "meh", "hype_score": 15}"#).unwrap();
        assert_eq!(r.hype_score, 15);
        let r = parse_response(r#"{"downgraded": "meh", "hype_score": -2,}"#).unwrap();
        assert_eq!(r.hype_score, -2);
    }

    #[test]
    fn oversized_scores_saturate() {
        let r = parse_response(r#"{"downgraded": "meh", "hype_score": 99999999999999999999}"#)
            .unwrap();
        assert_eq!(r.hype_score, i64::MAX);
        let r = parse_response(r#"{"downgraded": "meh", "hype_score": 99999999999999999999,}"#)
            .unwrap();
        assert_eq!(r.hype_score, i64::MAX);
        let r = parse_response(r#"{"downgraded": "meh", "hype_score": -99999999999999999999,}"#)
            .unwrap();
        assert_eq!(r.hype_score, i64::MIN);
    }

    #[test]
    fn fractional_score_is_truncated() {
        let r = parse_response(r#"{"downgraded": "meh", "hype_score": 7.8}"#).unwrap();
        assert_eq!(r.hype_score, 7);
    }

    #[test]
    fn missing_field_is_an_error() {
        let err = parse_response(r#"{"downgraded": "ok"}"#).unwrap_err();
        assert_eq!(err.excerpt, r#"{"downgraded": "ok"}"#);
    }

    #[test]
    fn wrong_field_types_are_an_error() {
        assert!(parse_response(r#"{"downgraded": 3, "hype_score": "high"}"#).is_err());
    }

    #[test]
    fn garbage_is_an_error_with_excerpt() {
        let err = parse_response("not json").unwrap_err();
        assert_eq!(err.excerpt, "not json");
        assert!(err.to_string().contains("not json"));
    }

    #[test]
    fn excerpt_is_truncated_by_characters() {
        let long = "标".repeat(MAX_EXCERPT_CHARS + 50);
        let err = parse_response(&long).unwrap_err();
        assert_eq!(err.excerpt.chars().count(), MAX_EXCERPT_CHARS);
    }
}
