use irguard_contract::{CallSpec, Expectation, SpecCase, SpecDocument};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::semantic_validator::evaluate_case;
use crate::target_registry::ResolvedTarget;

/// Independently executable check derived from one validated case.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseCheck {
    pub case_id: String,
    pub call: CallSpec,
    pub expectation: Expectation,
}

impl CaseCheck {
    pub fn from_case(case: &SpecCase) -> Self {
        Self {
            case_id: case.id.clone(),
            call: case.call.clone(),
            expectation: case.expectation.clone(),
        }
    }

    pub fn run(&self, target: &ResolvedTarget, default_tolerance: f64) -> CaseRunRecord {
        let verdict = evaluate_case(target, &self.call, &self.expectation, default_tolerance);
        CaseRunRecord {
            case_id: self.case_id.clone(),
            passed: verdict.passed(),
            observed: verdict.observation.to_json(),
            reason: verdict.failure,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRunRecord {
    pub case_id: String,
    pub passed: bool,
    pub observed: JsonValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounts {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub target: String,
    pub executed: bool,
    pub correction_passes: u32,
    pub cases: Vec<CaseRunRecord>,
    pub counts: RunCounts,
}

impl RunReport {
    pub fn failing_case_ids(&self) -> Vec<&str> {
        self.cases
            .iter()
            .filter(|record| !record.passed)
            .map(|record| record.case_id.as_str())
            .collect()
    }
}

/// Ordered set of checks collected from a validated document.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckSuite {
    target: String,
    checks: Vec<CaseCheck>,
}

impl CheckSuite {
    pub fn collect(document: &SpecDocument) -> Self {
        Self {
            target: document.target.clone(),
            checks: document.cases.iter().map(CaseCheck::from_case).collect(),
        }
    }

    /// Runs every check in declared order.
    pub fn run(
        &self,
        target: &ResolvedTarget,
        default_tolerance: f64,
        correction_passes: u32,
    ) -> RunReport {
        let mut counts = RunCounts {
            total: self.checks.len(),
            ..RunCounts::default()
        };
        let mut cases = Vec::with_capacity(self.checks.len());
        for check in &self.checks {
            let record = check.run(target, default_tolerance);
            if record.passed {
                counts.passed = counts.passed.saturating_add(1);
            } else {
                counts.failed = counts.failed.saturating_add(1);
            }
            cases.push(record);
        }
        tracing::info!(
            target_ref = %self.target,
            total = counts.total,
            passed = counts.passed,
            failed = counts.failed,
            "check suite finished"
        );
        RunReport {
            target: self.target.clone(),
            executed: true,
            correction_passes,
            cases,
            counts,
        }
    }

    /// Report for a suite that was collected but not executed.
    pub fn unexecuted_report(&self, correction_passes: u32) -> RunReport {
        RunReport {
            target: self.target.clone(),
            executed: false,
            correction_passes,
            cases: Vec::new(),
            counts: RunCounts {
                total: self.checks.len(),
                ..RunCounts::default()
            },
        }
    }
}
