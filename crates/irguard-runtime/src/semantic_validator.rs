//! Ground-truth check of declared expectations against observed behavior.
//!
//! `evaluate_case` is the one invocation-and-comparison routine in the crate;
//! the check harness runs collected checks through it as well.

use std::panic::{catch_unwind, AssertUnwindSafe};

use irguard_contract::{
    decode_value, observed_json, CallSpec, Expectation, SpecCase, SpecDocument, Value,
};
use serde_json::{json, Value as JsonValue};

use crate::target_registry::{Invocation, Raised, ResolvedTarget};

pub const PANIC_EXCEPTION_KIND: &str = "Panic";

/// What a single target invocation produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    Returned(Value),
    Raised(Raised),
}

impl Observation {
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Returned(value) => observed_json(value),
            Self::Raised(raised) => json!({
                "exception": raised.kind,
                "message": raised.message,
            }),
        }
    }
}

/// Outcome of invoking one case and comparing it to its expectation.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseVerdict {
    pub observation: Observation,
    pub failure: Option<String>,
}

impl CaseVerdict {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// A case whose declared expectation disagrees with observed behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    pub case_id: String,
    pub actual: Observation,
    pub expected: Expectation,
    pub reason: String,
}

impl Mismatch {
    pub fn to_json(&self) -> JsonValue {
        json!({
            "case_id": self.case_id,
            "actual": self.actual.to_json(),
            "expected": self.expected.to_json(),
            "reason": self.reason,
        })
    }
}

/// Decodes the call, invokes the target inside a panic trap, and records the result.
pub fn invoke_call(target: &ResolvedTarget, call: &CallSpec) -> Observation {
    let invocation = Invocation {
        args: call.args.iter().map(decode_value).collect(),
        kwargs: call
            .kwargs
            .iter()
            .map(|(name, value)| (name.clone(), decode_value(value)))
            .collect(),
    };
    match catch_unwind(AssertUnwindSafe(|| target.invoke(&invocation))) {
        Ok(Ok(value)) => Observation::Returned(value),
        Ok(Err(raised)) => Observation::Raised(raised),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|text| (*text).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "target panicked".to_string());
            tracing::warn!(
                target_ref = %target.reference(),
                %message,
                "target panicked; recording as exception"
            );
            Observation::Raised(Raised::new(PANIC_EXCEPTION_KIND, message))
        }
    }
}

pub fn evaluate_case(
    target: &ResolvedTarget,
    call: &CallSpec,
    expectation: &Expectation,
    default_tolerance: f64,
) -> CaseVerdict {
    let observation = invoke_call(target, call);
    let failure = check_expectation(&observation, expectation, default_tolerance).err();
    CaseVerdict {
        observation,
        failure,
    }
}

/// Returns `Err(reason)` when `observation` does not satisfy `expectation`.
pub fn check_expectation(
    observation: &Observation,
    expectation: &Expectation,
    default_tolerance: f64,
) -> Result<(), String> {
    match (observation, expectation) {
        (Observation::Raised(raised), Expectation::Raises { types }) => {
            if types.iter().any(|kind| kind == &raised.kind) {
                Ok(())
            } else {
                Err(format!(
                    "exception kind not expected: expected [{}], got {}",
                    types.join(", "),
                    raised
                ))
            }
        }
        (Observation::Raised(raised), Expectation::Equals { .. }) => {
            Err(format!("expected value, got exception {raised}"))
        }
        (Observation::Raised(raised), Expectation::Predicate { name }) => Err(format!(
            "unexpected exception {raised} (expected predicate {name})"
        )),
        (Observation::Returned(value), Expectation::Raises { types }) => Err(format!(
            "expected exception [{}], none raised (returned {value})",
            types.join(", ")
        )),
        (Observation::Returned(value), Expectation::Equals { value: expected, tolerance }) => {
            let tolerance = tolerance.unwrap_or(default_tolerance);
            let expected = decode_value(expected);
            if values_match(value, &expected, tolerance) {
                Ok(())
            } else {
                Err(format!(
                    "values differ: actual {value} != expected {expected} (tolerance {tolerance:e})"
                ))
            }
        }
        (Observation::Returned(value), Expectation::Predicate { name }) => {
            if name.evaluate(value) {
                Ok(())
            } else {
                Err(format!("predicate {name} failed for value {value}"))
            }
        }
    }
}

/// Checks every case in declared order and collects the disagreements.
pub fn validate_semantics(
    document: &SpecDocument,
    target: &ResolvedTarget,
    default_tolerance: f64,
) -> Vec<Mismatch> {
    let mut mismatches = Vec::new();
    for case in &document.cases {
        if let Some(mismatch) = validate_case(case, target, default_tolerance) {
            tracing::debug!(
                case_id = %mismatch.case_id,
                reason = %mismatch.reason,
                "expectation mismatch"
            );
            mismatches.push(mismatch);
        }
    }
    tracing::info!(
        target_ref = %target.reference(),
        cases = document.cases.len(),
        mismatches = mismatches.len(),
        "semantic validation finished"
    );
    mismatches
}

fn validate_case(
    case: &SpecCase,
    target: &ResolvedTarget,
    default_tolerance: f64,
) -> Option<Mismatch> {
    let verdict = evaluate_case(target, &case.call, &case.expectation, default_tolerance);
    let reason = verdict.failure?;
    Some(Mismatch {
        case_id: case.id.clone(),
        actual: verdict.observation,
        expected: case.expectation.clone(),
        reason,
    })
}

/// Numbers compare within an absolute tolerance at any depth; the NaN sentinel matches NaN.
fn values_match(actual: &Value, expected: &Value, tolerance: f64) -> bool {
    match (actual, expected) {
        (Value::Int(a), Value::Int(b)) => (i128::from(*a) - i128::from(*b)).abs() as f64 <= tolerance,
        (a, b) if a.is_numeric() && b.is_numeric() => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => floats_close(a, b, tolerance),
            _ => false,
        },
        (Value::Complex { re: ar, im: ai }, Value::Complex { re: br, im: bi }) => {
            floats_close(*ar, *br, tolerance) && floats_close(*ai, *bi, tolerance)
        }
        (Value::List(a), Value::List(b)) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b)
                    .all(|(left, right)| values_match(left, right, tolerance))
        }
        (Value::Map(a), Value::Map(b)) => {
            a.len() == b.len()
                && a.iter().zip(b).all(|((ka, va), (kb, vb))| {
                    ka == kb && values_match(va, vb, tolerance)
                })
        }
        _ => actual == expected,
    }
}

fn floats_close(actual: f64, expected: f64, tolerance: f64) -> bool {
    if actual.is_nan() || expected.is_nan() {
        return actual.is_nan() && expected.is_nan();
    }
    if actual == expected {
        return true;
    }
    if actual.is_infinite() || expected.is_infinite() {
        return false;
    }
    (actual - expected).abs() <= tolerance
}
