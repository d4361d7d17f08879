use std::{fs, path::Path};

use irguard_contract::{decode_value, parse_spec_document, Value};
use irguard_core::write_json_pretty_atomic;
use irguard_integration_tests::recording_registry;
use irguard_runtime::{default_registry, CycleOptions, IrGuardConfig, Outcome, ValidationCycle};
use serde_json::json;
use tempfile::tempdir;

const STATS_DOCUMENT: &str = r#"{
  "target": "stats:mean",
  "cases": [
    {"id": "mean_basic", "call": {"args": [[1, 2, 3]]}, "expectation": {"equals": {"value": 2.0}}},
    {"id": "mean_empty", "call": {"args": [[]]}, "expectation": {"equals": {"value": 0.0}}},
    {"id": "mean_wrong", "call": {"args": [[2, 4]]}, "expectation": {"equals": {"value": 2.0}}},
    {"id": "mean_nan", "call": {"kwargs": {"values": [float('nan'), 1]}}, "expectation": {"equals": {"value": 1.0}}}
  ]
}"#;

fn write_document(path: &Path, document: &serde_json::Value) {
    write_json_pretty_atomic(path, document).expect("write document");
}

#[test]
fn integration_full_cycle_corrects_once_writes_and_revalidates_clean() {
    let temp = tempdir().expect("tempdir");
    let ir_path = temp.path().join("stats.json");
    fs::write(&ir_path, STATS_DOCUMENT).expect("write ir");

    let (registry, log) = recording_registry();
    let config = IrGuardConfig::default();
    let mut cycle = ValidationCycle::new(&registry, &config);
    let raw = fs::read_to_string(&ir_path).expect("read ir");
    let outcome = cycle.execute(&raw, CycleOptions::default()).expect("cycle");

    assert_eq!(outcome.initial_mismatches.len(), 3);
    let summary = outcome.correction.as_ref().expect("correction");
    let corrected_ids = summary
        .corrected
        .iter()
        .map(|case| case.case_id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(corrected_ids, vec!["mean_empty", "mean_wrong", "mean_nan"]);
    assert_eq!(outcome.report.correction_passes, 1);
    assert_eq!(outcome.outcome, Some(Outcome::Pass));

    let calls = log.lock().expect("call log").clone();
    assert_eq!(calls.len(), 8, "four validation calls plus four harness calls");
    assert_eq!(calls[0], vec![decode_value(&json!([1, 2, 3]))]);
    assert_eq!(calls[1], vec![Value::List(Vec::new())]);

    write_document(&ir_path, &outcome.document.to_json());
    let rewritten = fs::read_to_string(&ir_path).expect("read corrected");
    assert!(rewritten.ends_with('\n'));
    let reparsed = parse_spec_document(&rewritten).expect("corrected document stays valid");
    assert_eq!(
        reparsed.case("mean_empty").map(|case| case.expectation.to_json()),
        Some(json!({"raises": {"types": ["StatisticsError"]}}))
    );
    assert_eq!(
        reparsed.case("mean_nan").map(|case| case.expectation.to_json()),
        Some(json!({"predicate": {"name": "is-not-a-number"}}))
    );
    assert_eq!(
        reparsed.case("mean_nan").map(|case| case.call.kwargs["values"].clone()),
        Some(json!(["NaN", 1]))
    );

    let mut replay = ValidationCycle::new(&registry, &config);
    let second = replay
        .execute(&rewritten, CycleOptions::default())
        .expect("second cycle");
    assert!(second.initial_mismatches.is_empty());
    assert!(second.correction.is_none());
}

#[test]
fn integration_uncorrectable_complex_result_surfaces_as_code_bug() {
    let document = r#"{
      "target": "math_ext:square_root",
      "cases": [
        {"id": "sqrt_four", "call": {"args": [4]}, "expectation": {"equals": {"value": 2.0}}},
        {"id": "sqrt_nine", "call": {"args": [9]}, "expectation": {"equals": {"value": 3.0}}},
        {"id": "sqrt_negative", "call": {"args": [-1]}, "expectation": {"equals": {"value": 1.0}}}
      ]
    }"#;
    let registry = default_registry();
    let config = IrGuardConfig::default();
    let mut cycle = ValidationCycle::new(&registry, &config);
    let outcome = cycle.execute(document, CycleOptions::default()).expect("cycle");

    let summary = outcome.correction.as_ref().expect("correction");
    assert!(summary.corrected.is_empty());
    assert_eq!(summary.uncorrectable.len(), 1);
    assert_eq!(summary.uncorrectable[0].case_id, "sqrt_negative");
    assert_eq!(summary.uncorrectable[0].type_name, "complex");

    assert_eq!(outcome.report.counts.failed, 1);
    assert_eq!(outcome.report.failing_case_ids(), vec!["sqrt_negative"]);
    assert_eq!(outcome.outcome, Some(Outcome::CodeBug));
    assert_eq!(
        outcome.document.case("sqrt_negative").map(|case| case.expectation.to_json()),
        Some(json!({"equals": {"value": 1.0}}))
    );
}

#[test]
fn integration_independent_cycles_hold_independent_correction_flags() {
    let (registry, _log) = recording_registry();
    let config = IrGuardConfig::default();
    let mut first = ValidationCycle::new(&registry, &config);
    let mut second = ValidationCycle::new(&registry, &config);

    let first_outcome = first
        .execute(STATS_DOCUMENT, CycleOptions::default())
        .expect("first");
    let second_outcome = second
        .execute(STATS_DOCUMENT, CycleOptions::default())
        .expect("second");
    assert_eq!(first.correction_passes(), 1);
    assert_eq!(second.correction_passes(), 1);
    assert_eq!(first_outcome.report, second_outcome.report);
}
