//! Execution side of the IR validation cycle.
//!
//! Resolves targets from a startup-built registry, checks every case against
//! observed behavior, applies the single bounded correction pass, runs the
//! collected checks, and classifies the run.

pub mod builtin_targets;
pub mod check_harness;
pub mod config;
pub mod corrector;
pub mod outcome_classifier;
pub mod run_manifest;
pub mod semantic_validator;
pub mod target_registry;
pub mod validation_cycle;

pub use builtin_targets::default_registry;
pub use check_harness::{CaseCheck, CaseRunRecord, CheckSuite, RunCounts, RunReport};
pub use config::{load_config, parse_config, IrGuardConfig};
pub use corrector::{
    apply_corrections, expectation_for_observation, CorrectedCase, CorrectionSummary,
    UncorrectableValue,
};
pub use outcome_classifier::{classify_counts, Outcome, OutcomeThresholds};
pub use run_manifest::{build_run_manifest, sha256_file, PlatformInfo, RunManifest};
pub use semantic_validator::{
    check_expectation, evaluate_case, invoke_call, validate_semantics, CaseVerdict, Mismatch,
    Observation,
};
pub use target_registry::{
    Invocation, Raised, ResolutionError, ResolvedTarget, TargetFn, TargetModule, TargetRegistry,
};
pub use validation_cycle::{CycleError, CycleOptions, CycleOutcome, ValidationCycle};
