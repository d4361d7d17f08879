//! Single-pass rewrite of failing expectations to match observed behavior.
//!
//! Only whitelisted expectation forms are ever written. Observations that none
//! of them can express are reported per case and the case is left as-is.

use irguard_contract::{encode_value, Expectation, PredicateName, SpecDocument, Value};
use serde_json::{json, Value as JsonValue};
use thiserror::Error;

use crate::semantic_validator::{Mismatch, Observation};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("case '{case_id}' observed {type_name} result {rendered} that no IR expectation can express; manual review needed")]
pub struct UncorrectableValue {
    pub case_id: String,
    pub type_name: &'static str,
    pub rendered: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrectedCase {
    pub case_id: String,
    pub previous: Expectation,
    pub corrected: Expectation,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrectionSummary {
    pub corrected: Vec<CorrectedCase>,
    pub uncorrectable: Vec<UncorrectableValue>,
}

impl CorrectionSummary {
    pub fn to_json(&self) -> JsonValue {
        json!({
            "corrected": self.corrected.iter().map(|case| json!({
                "case_id": case.case_id,
                "previous": case.previous.to_json(),
                "corrected": case.corrected.to_json(),
                "reason": case.reason,
            })).collect::<Vec<_>>(),
            "uncorrectable": self.uncorrectable.iter().map(|failure| json!({
                "case_id": failure.case_id,
                "type": failure.type_name,
                "observed": failure.rendered,
                "error": failure.to_string(),
            })).collect::<Vec<_>>(),
        })
    }
}

/// Maps an observation onto the whitelisted expectation that describes it.
pub fn expectation_for_observation(
    case_id: &str,
    observation: &Observation,
) -> Result<Expectation, UncorrectableValue> {
    let value = match observation {
        Observation::Raised(raised) => {
            return Ok(Expectation::Raises {
                types: vec![raised.kind.clone()],
            })
        }
        Observation::Returned(value) => value,
    };

    match value {
        Value::Float(number) if number.is_nan() => Ok(Expectation::Predicate {
            name: PredicateName::IsNotANumber,
        }),
        Value::Float(number) if number.is_infinite() => Ok(Expectation::Predicate {
            name: PredicateName::IsInfinite,
        }),
        Value::Complex { re, im } if re.is_nan() || im.is_nan() => Ok(Expectation::Predicate {
            name: PredicateName::IsNotANumber,
        }),
        other => encode_value(other)
            .map(|encoded| Expectation::Equals {
                value: encoded,
                tolerance: None,
            })
            .map_err(|_| UncorrectableValue {
                case_id: case_id.to_string(),
                type_name: other.type_name(),
                rendered: other.to_string(),
            }),
    }
}

/// Rewrites the expectation of every mismatched case in place.
///
/// Callers own the at-most-once bound; `ValidationCycle` enforces it.
pub fn apply_corrections(document: &mut SpecDocument, mismatches: &[Mismatch]) -> CorrectionSummary {
    let mut summary = CorrectionSummary::default();
    for mismatch in mismatches {
        let Some(case) = document.case_mut(&mismatch.case_id) else {
            tracing::warn!(case_id = %mismatch.case_id, "mismatch refers to unknown case; skipping");
            continue;
        };
        match expectation_for_observation(&mismatch.case_id, &mismatch.actual) {
            Ok(corrected) => {
                tracing::info!(
                    case_id = %mismatch.case_id,
                    from = case.expectation.kind(),
                    to = corrected.kind(),
                    "corrected expectation"
                );
                let previous = std::mem::replace(&mut case.expectation, corrected.clone());
                summary.corrected.push(CorrectedCase {
                    case_id: mismatch.case_id.clone(),
                    previous,
                    corrected,
                    reason: mismatch.reason.clone(),
                });
            }
            Err(failure) => {
                tracing::warn!(case_id = %failure.case_id, "{failure}");
                summary.uncorrectable.push(failure);
            }
        }
    }
    summary
}
