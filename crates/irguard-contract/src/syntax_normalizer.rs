//! Pre-parse rewrite of known non-JSON spellings for special floats.
//!
//! Producers regularly emit `float('nan')` or bare `Infinity` tokens. Those are
//! folded into the codec's sentinel strings; everything else, including any
//! text inside JSON string literals, is left byte-for-byte unchanged.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde_json::Value as JsonValue;

use crate::error::ParseError;
use crate::value_codec::{SENTINEL_NAN, SENTINEL_NEG_INFINITY, SENTINEL_POS_INFINITY};

/// Normalized IR text plus whether any rewrite happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub text: String,
    pub altered: bool,
}

fn non_conforming_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?P<string>"(?:[^"\\]|\\.)*")|(?P<call>float\(\s*['"](?P<arg>[+-]?(?i:nan|infinity|inf))['"]\s*\))|(?P<bare>-?\b(?:NaN|Infinity)\b)"#,
        )
        .expect("non-conforming token regex")
    })
}

/// Rewrites the enumerated non-conforming spellings into canonical sentinels.
pub fn normalize_syntax(raw: &str) -> NormalizedText {
    let mut altered = false;
    let text = non_conforming_token_regex()
        .replace_all(raw, |captures: &Captures<'_>| {
            if let Some(literal) = captures.name("string") {
                return literal.as_str().to_string();
            }
            let token = captures
                .name("arg")
                .or_else(|| captures.name("bare"))
                .map(|matched| matched.as_str())
                .unwrap_or_default();
            altered = true;
            format!("\"{}\"", canonical_sentinel(token))
        })
        .into_owned();
    NormalizedText { text, altered }
}

/// Normalizes and parses IR text into a raw JSON tree.
pub fn parse_normalized_json(raw: &str) -> Result<JsonValue, ParseError> {
    let normalized = normalize_syntax(raw);
    if normalized.altered {
        tracing::info!("normalized non-conforming float spellings into IR sentinels");
    }
    serde_json::from_str::<JsonValue>(&normalized.text).map_err(|error| {
        let line = error.line();
        let excerpt = normalized
            .text
            .lines()
            .nth(line.saturating_sub(1))
            .unwrap_or_default()
            .to_string();
        ParseError {
            line,
            column: error.column(),
            excerpt,
            message: strip_position_suffix(&error.to_string()),
            normalized: normalized.altered,
        }
    })
}

fn canonical_sentinel(token: &str) -> &'static str {
    let lowered = token.to_ascii_lowercase();
    if lowered.ends_with("nan") {
        SENTINEL_NAN
    } else if lowered.starts_with('-') {
        SENTINEL_NEG_INFINITY
    } else {
        SENTINEL_POS_INFINITY
    }
}

fn strip_position_suffix(message: &str) -> String {
    match message.rfind(" at line ") {
        Some(index) => message[..index].to_string(),
        None => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_syntax, parse_normalized_json};
    use serde_json::json;

    #[test]
    fn unit_normalize_syntax_rewrites_python_float_calls() {
        let normalized =
            normalize_syntax(r#"{"args": [float('nan'), float("inf"), float('-inf')]}"#);
        assert!(normalized.altered);
        assert_eq!(
            normalized.text,
            r#"{"args": ["NaN", "Infinity", "-Infinity"]}"#
        );
    }

    #[test]
    fn unit_normalize_syntax_accepts_signed_and_mixed_case_float_arguments() {
        for (raw, expected) in [
            ("float('+inf')", "\"Infinity\""),
            ("float('infinity')", "\"Infinity\""),
            ("float(\"+Infinity\")", "\"Infinity\""),
            ("float('-infinity')", "\"-Infinity\""),
            ("float('-INF')", "\"-Infinity\""),
            ("float('NaN')", "\"NaN\""),
            ("float(\"nAn\")", "\"NaN\""),
            ("float( '-nan' )", "\"NaN\""),
        ] {
            let normalized = normalize_syntax(raw);
            assert!(normalized.altered, "{raw} should be rewritten");
            assert_eq!(normalized.text, expected, "{raw}");
        }
    }

    #[test]
    fn unit_normalize_syntax_rewrites_bare_tokens() {
        let normalized = normalize_syntax("[NaN, Infinity, -Infinity, 1]");
        assert!(normalized.altered);
        assert_eq!(normalized.text, r#"["NaN", "Infinity", "-Infinity", 1]"#);
    }

    #[test]
    fn functional_normalize_syntax_leaves_string_literals_untouched() {
        let raw = r#"{"id": "float('nan') NaN case", "args": ["NaN", "Infinity"]}"#;
        let normalized = normalize_syntax(raw);
        assert!(!normalized.altered);
        assert_eq!(normalized.text, raw);
    }

    #[test]
    fn functional_normalize_syntax_handles_escaped_quotes_in_strings() {
        let raw = r#"{"id": "say \"NaN\" twice", "value": NaN}"#;
        let normalized = normalize_syntax(raw);
        assert!(normalized.altered);
        assert_eq!(
            normalized.text,
            r#"{"id": "say \"NaN\" twice", "value": "NaN"}"#
        );
    }

    #[test]
    fn integration_parse_normalized_json_accepts_fixed_document() {
        let parsed =
            parse_normalized_json(r#"{"target": "division:divide", "args": [float('nan'), 1]}"#)
                .expect("should parse after normalization");
        assert_eq!(parsed["args"], json!(["NaN", 1]));
    }

    #[test]
    fn regression_parse_normalized_json_reports_line_and_excerpt() {
        let error = parse_normalized_json("{\n  \"target\": \"division:divide\"\n  \"cases\": []\n}")
            .expect_err("missing comma should fail");
        assert_eq!(error.line, 3);
        assert!(error.excerpt.contains("\"cases\""));
        assert!(!error.normalized);
        assert!(error.to_string().contains("line 3"));
    }

    #[test]
    fn regression_parse_normalized_json_flags_errors_remaining_after_rewrite() {
        let error = parse_normalized_json("[float('nan'), oops]").expect_err("should fail");
        assert!(error.normalized);
        assert!(error
            .to_string()
            .contains("JSON syntax errors remain after normalization"));
    }
}
