//! One validate, correct-once, run, classify cycle over a single IR document.
//!
//! The cycle owns the correction flag. A second `correct` call on the same
//! cycle is refused, and the number of passes is echoed in the run report.

use irguard_contract::{parse_spec_document_with_schema, ContractError, SpecDocument};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::check_harness::{CheckSuite, RunReport};
use crate::config::IrGuardConfig;
use crate::corrector::{apply_corrections, CorrectionSummary};
use crate::outcome_classifier::{classify_counts, Outcome};
use crate::semantic_validator::{validate_semantics, Mismatch};
use crate::target_registry::{ResolutionError, ResolvedTarget, TargetRegistry};

#[derive(Debug, Error)]
/// Enumerates supported `CycleError` values.
pub enum CycleError {
    #[error(transparent)]
    Contract(#[from] ContractError),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error("correction pass already applied to '{target}' in this cycle")]
    CorrectionAlreadyApplied { target: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleOptions {
    pub correct: bool,
    pub run_checks: bool,
}

impl Default for CycleOptions {
    fn default() -> Self {
        Self {
            correct: true,
            run_checks: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub document: SpecDocument,
    pub initial_mismatches: Vec<Mismatch>,
    pub correction: Option<CorrectionSummary>,
    pub report: RunReport,
    pub outcome: Option<Outcome>,
}

pub struct ValidationCycle<'a> {
    registry: &'a TargetRegistry,
    config: &'a IrGuardConfig,
    qualifier_override: Option<String>,
    json_schema: Option<JsonValue>,
    correction_applied: bool,
}

impl<'a> ValidationCycle<'a> {
    pub fn new(registry: &'a TargetRegistry, config: &'a IrGuardConfig) -> Self {
        Self {
            registry,
            config,
            qualifier_override: None,
            json_schema: None,
            correction_applied: false,
        }
    }

    pub fn with_qualifier_override(mut self, qualifier: Option<&str>) -> Self {
        self.qualifier_override = qualifier.map(str::to_string);
        self
    }

    pub fn with_json_schema(mut self, schema: Option<JsonValue>) -> Self {
        self.json_schema = schema;
        self
    }

    pub fn correction_passes(&self) -> u32 {
        u32::from(self.correction_applied)
    }

    pub fn load(&self, raw: &str) -> Result<SpecDocument, CycleError> {
        Ok(parse_spec_document_with_schema(
            raw,
            self.json_schema.as_ref(),
        )?)
    }

    pub fn resolve(&self, document: &SpecDocument) -> Result<ResolvedTarget, CycleError> {
        Ok(self
            .registry
            .resolve(&document.target, self.qualifier_override.as_deref())?)
    }

    pub fn validate(&self, document: &SpecDocument, target: &ResolvedTarget) -> Vec<Mismatch> {
        validate_semantics(document, target, self.config.default_tolerance)
    }

    /// Applies the cycle's only correction pass.
    pub fn correct(
        &mut self,
        document: &mut SpecDocument,
        mismatches: &[Mismatch],
    ) -> Result<CorrectionSummary, CycleError> {
        if self.correction_applied {
            return Err(CycleError::CorrectionAlreadyApplied {
                target: document.target.clone(),
            });
        }
        self.correction_applied = true;
        let summary = apply_corrections(document, mismatches);
        tracing::info!(
            target_ref = %document.target,
            corrected = summary.corrected.len(),
            uncorrectable = summary.uncorrectable.len(),
            "correction pass applied"
        );
        Ok(summary)
    }

    pub fn run_checks(&self, document: &SpecDocument, target: &ResolvedTarget) -> RunReport {
        CheckSuite::collect(document).run(
            target,
            self.config.default_tolerance,
            self.correction_passes(),
        )
    }

    pub fn classify(&self, report: &RunReport) -> Outcome {
        classify_counts(report.counts, self.config.thresholds())
    }

    pub fn execute(&mut self, raw: &str, options: CycleOptions) -> Result<CycleOutcome, CycleError> {
        let mut document = self.load(raw)?;
        let target = self.resolve(&document)?;
        let initial_mismatches = self.validate(&document, &target);

        let correction = if options.correct && !initial_mismatches.is_empty() {
            Some(self.correct(&mut document, &initial_mismatches)?)
        } else {
            None
        };

        let (report, outcome) = if options.run_checks {
            let report = self.run_checks(&document, &target);
            let outcome = self.classify(&report);
            (report, Some(outcome))
        } else {
            let report = CheckSuite::collect(&document).unexecuted_report(self.correction_passes());
            (report, None)
        };

        Ok(CycleOutcome {
            document,
            initial_mismatches,
            correction,
            report,
            outcome,
        })
    }
}
