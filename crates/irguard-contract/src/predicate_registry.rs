//! Single name→evaluator table behind the `predicate` expectation.
//!
//! The schema validator whitelists names from this table and the semantic
//! validator evaluates through it, so a predicate cannot be accepted by one
//! and unknown to the other.

use std::fmt;

use crate::value_codec::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Enumerates supported `PredicateName` values.
pub enum PredicateName {
    IsNotANumber,
    IsInfinite,
    IsFinite,
}

struct PredicateEntry {
    name: PredicateName,
    canonical: &'static str,
    aliases: &'static [&'static str],
    evaluate: fn(&Value) -> bool,
}

const PREDICATE_REGISTRY: &[PredicateEntry] = &[
    PredicateEntry {
        name: PredicateName::IsNotANumber,
        canonical: "is-not-a-number",
        aliases: &["math.isnan", "is_nan", "isnan"],
        evaluate: evaluate_is_not_a_number,
    },
    PredicateEntry {
        name: PredicateName::IsInfinite,
        canonical: "is-infinite",
        aliases: &["math.isinf", "is_infinite", "isinf"],
        evaluate: evaluate_is_infinite,
    },
    PredicateEntry {
        name: PredicateName::IsFinite,
        canonical: "is-finite",
        aliases: &["math.isfinite", "is_finite", "isfinite"],
        evaluate: evaluate_is_finite,
    },
];

impl PredicateName {
    pub fn as_str(self) -> &'static str {
        registry_entry(self).canonical
    }

    /// Applies the predicate. Non-numeric values never satisfy a predicate.
    pub fn evaluate(self, value: &Value) -> bool {
        (registry_entry(self).evaluate)(value)
    }
}

impl fmt::Display for PredicateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves a canonical predicate name or one of its accepted aliases.
pub fn lookup_predicate(raw: &str) -> Option<PredicateName> {
    let trimmed = raw.trim();
    PREDICATE_REGISTRY
        .iter()
        .find(|entry| entry.canonical == trimmed || entry.aliases.contains(&trimmed))
        .map(|entry| entry.name)
}

pub fn supported_predicate_names() -> Vec<&'static str> {
    PREDICATE_REGISTRY
        .iter()
        .map(|entry| entry.canonical)
        .collect()
}

fn registry_entry(name: PredicateName) -> &'static PredicateEntry {
    PREDICATE_REGISTRY
        .iter()
        .find(|entry| entry.name == name)
        .unwrap_or(&PREDICATE_REGISTRY[0])
}

fn evaluate_is_not_a_number(value: &Value) -> bool {
    match value {
        Value::Float(number) => number.is_nan(),
        Value::Complex { re, im } => re.is_nan() || im.is_nan(),
        _ => false,
    }
}

fn evaluate_is_infinite(value: &Value) -> bool {
    match value {
        Value::Float(number) => number.is_infinite(),
        Value::Complex { re, im } => re.is_infinite() || im.is_infinite(),
        _ => false,
    }
}

fn evaluate_is_finite(value: &Value) -> bool {
    match value {
        Value::Int(_) => true,
        Value::Float(number) => number.is_finite(),
        Value::Complex { re, im } => re.is_finite() && im.is_finite(),
        _ => false,
    }
}
