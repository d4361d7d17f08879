use std::fmt;

use serde::{Deserialize, Serialize};

use crate::check_harness::RunCounts;

pub const DEFAULT_MISMATCH_RATIO: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
/// Enumerates supported `Outcome` values.
pub enum Outcome {
    Pass,
    IrInvalid,
    IrMismatch,
    CodeBug,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::IrInvalid => "IR_INVALID",
            Self::IrMismatch => "IR_MISMATCH",
            Self::CodeBug => "CODE_BUG",
        }
    }

    pub fn diagnosis(self) -> &'static str {
        match self {
            Self::Pass => "every check passed",
            Self::IrInvalid => "every check failed; the IR does not describe the target",
            Self::IrMismatch => "most checks failed; the IR is likely wrong",
            Self::CodeBug => "a minority of checks failed; the target likely has a defect",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeThresholds {
    /// Failed share above which the IR is blamed instead of the code.
    pub mismatch_ratio: f64,
}

impl Default for OutcomeThresholds {
    fn default() -> Self {
        Self {
            mismatch_ratio: DEFAULT_MISMATCH_RATIO,
        }
    }
}

impl OutcomeThresholds {
    pub fn validate(&self) -> Result<(), String> {
        if !self.mismatch_ratio.is_finite()
            || self.mismatch_ratio <= 0.0
            || self.mismatch_ratio >= 1.0
        {
            return Err(format!(
                "mismatch_ratio must be within (0, 1), got {}",
                self.mismatch_ratio
            ));
        }
        Ok(())
    }
}

pub fn classify_counts(counts: RunCounts, thresholds: OutcomeThresholds) -> Outcome {
    let outcome = if counts.failed == 0 {
        Outcome::Pass
    } else if counts.failed >= counts.total {
        Outcome::IrInvalid
    } else if counts.failed as f64 > thresholds.mismatch_ratio * counts.total as f64 {
        Outcome::IrMismatch
    } else {
        Outcome::CodeBug
    };
    tracing::info!(
        total = counts.total,
        failed = counts.failed,
        outcome = outcome.as_str(),
        "classified run"
    );
    outcome
}
