//! Foundational low-level utilities shared across irguard crates.
//!
//! Provides atomic artifact writes (corrected documents, run reports, manifests)
//! and the millisecond clock used to stamp temporary file names.

pub mod atomic_io;
pub mod time_utils;

pub use atomic_io::{write_json_pretty_atomic, write_text_atomic};
pub use time_utils::current_unix_timestamp_ms;

#[cfg(test)]
mod tests {
    use std::fs::read_to_string;

    use serde_json::json;

    use super::*;

    #[test]
    fn unit_current_unix_timestamp_ms_is_non_decreasing() {
        let first = current_unix_timestamp_ms();
        let second = current_unix_timestamp_ms();
        assert!(first > 0);
        assert!(second >= first);
    }

    #[test]
    fn functional_write_text_atomic_writes_content() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let path = tempdir.path().join("nested").join("ir.json");
        write_text_atomic(&path, "{}\n").expect("write");
        let contents = read_to_string(&path).expect("read");
        assert_eq!(contents, "{}\n");
    }

    #[test]
    fn functional_write_json_pretty_atomic_appends_trailing_newline() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let path = tempdir.path().join("report.json");
        write_json_pretty_atomic(&path, &json!({"target": "division:divide"})).expect("write");
        let contents = read_to_string(&path).expect("read");
        assert!(contents.ends_with("}\n"));
        assert!(contents.contains("\"target\": \"division:divide\""));
    }

    #[test]
    fn regression_write_text_atomic_rejects_directory_destination() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let error = write_text_atomic(tempdir.path(), "x").expect_err("directory should fail");
        assert!(error.to_string().contains("is a directory"));
    }

    #[test]
    fn functional_write_json_pretty_atomic_replaces_corrected_document_in_place() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let path = tempdir.path().join("division.json");
        std::fs::write(
            &path,
            r#"{"target": "division:divide", "cases": [{"id": "half", "expectation": {"equals": {"value": 0.4}}}]}"#,
        )
        .expect("seed document");

        let corrected = json!({
            "target": "division:divide",
            "cases": [{"id": "half", "expectation": {"equals": {"value": 0.5}}}]
        });
        write_json_pretty_atomic(&path, &corrected).expect("rewrite");

        let reread: serde_json::Value =
            serde_json::from_str(&read_to_string(&path).expect("read")).expect("parse");
        assert_eq!(reread, corrected);
        let leftovers = std::fs::read_dir(tempdir.path())
            .expect("list dir")
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().contains(".tmp-"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn functional_write_json_pretty_atomic_round_trips_run_report() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let path = tempdir.path().join("reports").join("run.json");
        let report = json!({
            "target": "division:divide",
            "executed": true,
            "correction_passes": 1,
            "counts": {"total": 6, "passed": 6, "failed": 0},
            "outcome": "PASS"
        });
        write_json_pretty_atomic(&path, &report).expect("write report");
        let reread: serde_json::Value =
            serde_json::from_str(&read_to_string(&path).expect("read")).expect("parse");
        assert_eq!(reread, report);
    }
}
