//! Structural validation that turns a raw JSON tree into a typed `SpecDocument`.
//!
//! Pure and deterministic: no target code is loaded or executed here. Every
//! violation names the case id (when one is known) and the field path.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value as JsonValue};

use crate::error::{ContractError, SchemaError};
use crate::predicate_registry::{lookup_predicate, supported_predicate_names};
use crate::spec_document::{split_target_reference, CallSpec, Expectation, SpecCase, SpecDocument};
use crate::syntax_normalizer::parse_normalized_json;

const EXPECTATION_KINDS: [&str; 3] = ["raises", "equals", "predicate"];

/// Normalizes, parses, and schema-validates IR text.
pub fn parse_spec_document(raw: &str) -> Result<SpecDocument, ContractError> {
    parse_spec_document_with_schema(raw, None)
}

/// Same as [`parse_spec_document`], checking an external JSON Schema first when given.
pub fn parse_spec_document_with_schema(
    raw: &str,
    json_schema: Option<&JsonValue>,
) -> Result<SpecDocument, ContractError> {
    let parsed = parse_normalized_json(raw)?;
    if let Some(schema) = json_schema {
        validate_against_json_schema(&parsed, schema)?;
    }
    Ok(validate_spec_document(&parsed)?)
}

/// Checks the raw document against a caller-supplied JSON Schema.
pub fn validate_against_json_schema(
    document: &JsonValue,
    schema: &JsonValue,
) -> Result<(), SchemaError> {
    let validator = jsonschema::validator_for(schema)
        .map_err(|error| SchemaError::document("$schema", format!("invalid JSON schema: {error}")))?;
    let mut errors = validator.iter_errors(document);
    if let Some(first) = errors.next() {
        let pointer = first.instance_path().as_str();
        let field = if pointer.is_empty() {
            "$".to_string()
        } else {
            pointer.to_string()
        };
        return Err(SchemaError::document(
            field,
            format!("JSON schema validation failed: {first}"),
        ));
    }
    Ok(())
}

pub fn validate_spec_document(raw: &JsonValue) -> Result<SpecDocument, SchemaError> {
    let object = raw
        .as_object()
        .ok_or_else(|| SchemaError::document("$", "document must be a JSON object"))?;

    let target = match object.get("target") {
        None => return Err(SchemaError::document("target", "missing required field")),
        Some(JsonValue::String(target)) => target.trim().to_string(),
        Some(other) => {
            return Err(SchemaError::document(
                "target",
                format!("must be a string, found {}", json_type_name(other)),
            ))
        }
    };
    if target.is_empty() {
        return Err(SchemaError::document("target", "must not be empty"));
    }
    if split_target_reference(&target).is_none() {
        return Err(SchemaError::document(
            "target",
            format!("'{target}' must have the form <qualifier>:<function-name>"),
        ));
    }

    let raw_cases = match object.get("cases") {
        None => return Err(SchemaError::document("cases", "missing required field")),
        Some(JsonValue::Array(cases)) => cases,
        Some(other) => {
            return Err(SchemaError::document(
                "cases",
                format!("must be an array, found {}", json_type_name(other)),
            ))
        }
    };
    if raw_cases.is_empty() {
        tracing::warn!(ir_target = %target, "IR document declares no cases");
    }

    let mut seen_ids = BTreeSet::new();
    let mut cases = Vec::with_capacity(raw_cases.len());
    for (index, raw_case) in raw_cases.iter().enumerate() {
        let case = validate_case(raw_case, index)?;
        if !seen_ids.insert(case.id.clone()) {
            return Err(SchemaError::case(
                case.id.as_str(),
                format!("cases[{index}].id"),
                "duplicate case id",
            ));
        }
        cases.push(case);
    }

    let extra = object
        .iter()
        .filter(|(key, _)| key.as_str() != "target" && key.as_str() != "cases")
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    tracing::debug!(ir_target = %target, cases = cases.len(), "IR document passed schema validation");
    Ok(SpecDocument {
        target,
        cases,
        extra,
    })
}

fn validate_case(raw: &JsonValue, index: usize) -> Result<SpecCase, SchemaError> {
    let path = format!("cases[{index}]");
    let object = raw.as_object().ok_or_else(|| {
        SchemaError::document(
            path.as_str(),
            format!("case must be an object, found {}", json_type_name(raw)),
        )
    })?;

    let id = match object.get("id") {
        Some(JsonValue::String(id)) if !id.trim().is_empty() => id.trim().to_string(),
        Some(JsonValue::String(_)) => {
            return Err(SchemaError::document(format!("{path}.id"), "must not be empty"))
        }
        Some(other) => {
            return Err(SchemaError::document(
                format!("{path}.id"),
                format!("must be a string, found {}", json_type_name(other)),
            ))
        }
        None => return Err(SchemaError::document(format!("{path}.id"), "missing required field")),
    };

    let call = match object.get("call") {
        Some(raw_call) => validate_call(raw_call, &id, &path)?,
        None => {
            return Err(SchemaError::case(
                id.as_str(),
                format!("{path}.call"),
                "missing required field",
            ))
        }
    };

    let expectation = match object.get("expectation") {
        Some(raw_expectation) => validate_expectation(raw_expectation, &id, &path)?,
        None => {
            return Err(SchemaError::case(
                id.as_str(),
                format!("{path}.expectation"),
                "missing required field",
            ))
        }
    };

    let extra = object
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), "id" | "call" | "expectation"))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(SpecCase {
        id,
        call,
        expectation,
        extra,
    })
}

fn validate_call(raw: &JsonValue, case_id: &str, path: &str) -> Result<CallSpec, SchemaError> {
    let object = raw.as_object().ok_or_else(|| {
        SchemaError::case(
            case_id,
            format!("{path}.call"),
            format!("must be an object, found {}", json_type_name(raw)),
        )
    })?;

    let args = match object.get("args") {
        None | Some(JsonValue::Null) => Vec::new(),
        Some(JsonValue::Array(args)) => args.clone(),
        Some(other) => {
            return Err(SchemaError::case(
                case_id,
                format!("{path}.call.args"),
                format!("must be an array, found {}", json_type_name(other)),
            ))
        }
    };

    let kwargs = match object.get("kwargs") {
        None | Some(JsonValue::Null) => BTreeMap::new(),
        Some(JsonValue::Object(kwargs)) => kwargs
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
        Some(other) => {
            return Err(SchemaError::case(
                case_id,
                format!("{path}.call.kwargs"),
                format!("must be an object, found {}", json_type_name(other)),
            ))
        }
    };

    Ok(CallSpec { args, kwargs })
}

fn validate_expectation(
    raw: &JsonValue,
    case_id: &str,
    path: &str,
) -> Result<Expectation, SchemaError> {
    let field = format!("{path}.expectation");
    let object = raw.as_object().ok_or_else(|| {
        SchemaError::case(
            case_id,
            field.as_str(),
            format!("must be an object, found {}", json_type_name(raw)),
        )
    })?;

    if let Some(unknown) = object
        .keys()
        .find(|key| !EXPECTATION_KINDS.contains(&key.as_str()))
    {
        return Err(SchemaError::case(
            case_id,
            format!("{field}.{unknown}"),
            format!(
                "unsupported expectation kind (expected one of {})",
                EXPECTATION_KINDS.join(", ")
            ),
        ));
    }

    let populated = EXPECTATION_KINDS
        .iter()
        .filter(|kind| object.contains_key(**kind))
        .copied()
        .collect::<Vec<_>>();
    let kind = match populated.as_slice() {
        [kind] => *kind,
        [] => {
            return Err(SchemaError::case(
                case_id,
                field.as_str(),
                "must contain exactly one of raises, equals, predicate",
            ))
        }
        many => {
            return Err(SchemaError::case(
                case_id,
                field.as_str(),
                format!("contains multiple expectation kinds: {}", many.join(", ")),
            ))
        }
    };

    let body_field = format!("{field}.{kind}");
    let body = object
        .get(kind)
        .and_then(JsonValue::as_object)
        .ok_or_else(|| SchemaError::case(case_id, body_field.as_str(), "must be an object"))?;

    match kind {
        "raises" => validate_raises(body, case_id, &body_field),
        "equals" => validate_equals(body, case_id, &body_field),
        _ => validate_predicate(body, case_id, &body_field),
    }
}

fn validate_raises(
    body: &Map<String, JsonValue>,
    case_id: &str,
    field: &str,
) -> Result<Expectation, SchemaError> {
    let types_field = format!("{field}.types");
    let raw_types = match body.get("types") {
        Some(JsonValue::Array(types)) => types,
        Some(other) => {
            return Err(SchemaError::case(
                case_id,
                types_field,
                format!("must be an array, found {}", json_type_name(other)),
            ))
        }
        None => return Err(SchemaError::case(case_id, types_field, "missing required field")),
    };
    if raw_types.is_empty() {
        return Err(SchemaError::case(
            case_id,
            types_field,
            "must list at least one exception kind",
        ));
    }

    let mut types: Vec<String> = Vec::with_capacity(raw_types.len());
    for (index, raw_type) in raw_types.iter().enumerate() {
        let kind = raw_type
            .as_str()
            .map(str::trim)
            .filter(|kind| !kind.is_empty())
            .ok_or_else(|| {
                SchemaError::case(
                    case_id,
                    format!("{types_field}[{index}]"),
                    "must be a non-empty string",
                )
            })?;
        if !types.iter().any(|existing| existing == kind) {
            types.push(kind.to_string());
        }
    }
    Ok(Expectation::Raises { types })
}

fn validate_equals(
    body: &Map<String, JsonValue>,
    case_id: &str,
    field: &str,
) -> Result<Expectation, SchemaError> {
    let value = body.get("value").cloned().ok_or_else(|| {
        SchemaError::case(case_id, format!("{field}.value"), "missing required field")
    })?;

    let tolerance = match body.get("tolerance") {
        None => None,
        Some(raw) => {
            let tolerance = raw.as_f64().ok_or_else(|| {
                SchemaError::case(
                    case_id,
                    format!("{field}.tolerance"),
                    format!("must be a number, found {}", json_type_name(raw)),
                )
            })?;
            if !tolerance.is_finite() || tolerance < 0.0 {
                return Err(SchemaError::case(
                    case_id,
                    format!("{field}.tolerance"),
                    format!("must be a finite non-negative number, found {tolerance}"),
                ));
            }
            Some(tolerance)
        }
    };

    Ok(Expectation::Equals { value, tolerance })
}

fn validate_predicate(
    body: &Map<String, JsonValue>,
    case_id: &str,
    field: &str,
) -> Result<Expectation, SchemaError> {
    let name_field = format!("{field}.name");
    let raw_name = body
        .get("name")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| SchemaError::case(case_id, name_field.as_str(), "must be a string"))?;
    let name = lookup_predicate(raw_name).ok_or_else(|| {
        SchemaError::case(
            case_id,
            name_field.as_str(),
            format!(
                "unsupported predicate '{}' (supported: {})",
                raw_name,
                supported_predicate_names().join(", ")
            ),
        )
    })?;
    Ok(Expectation::Predicate { name })
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::{
        parse_spec_document, parse_spec_document_with_schema, validate_against_json_schema,
        validate_spec_document,
    };
    use crate::error::ContractError;
    use crate::predicate_registry::PredicateName;
    use crate::spec_document::Expectation;
    use serde_json::json;
    use std::path::PathBuf;

    fn fixture_path(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("testdata")
            .join("spec-document")
            .join(name)
    }

    fn load_fixture(name: &str) -> Result<crate::spec_document::SpecDocument, ContractError> {
        let raw = std::fs::read_to_string(fixture_path(name)).expect("read fixture");
        parse_spec_document(&raw)
    }

    fn schema_error_message(raw: serde_json::Value) -> String {
        validate_spec_document(&raw)
            .expect_err("schema should fail")
            .to_string()
    }

    #[test]
    fn functional_fixture_loads_division_cases_in_declared_order() {
        let document = load_fixture("division-valid.json").expect("fixture should load");
        assert_eq!(document.target, "division:divide");
        let ids = document
            .cases
            .iter()
            .map(|case| case.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["div_basic", "div_zero", "div_nan", "div_inf_numerator"]);
        assert_eq!(
            document.cases[2].expectation,
            Expectation::Predicate {
                name: PredicateName::IsNotANumber
            }
        );
        assert!(document.cases[0].call.kwargs.is_empty());
    }

    #[test]
    fn integration_fixture_with_python_float_spellings_parses_after_normalization() {
        let document = load_fixture("division-python-floats.json").expect("fixture should load");
        assert_eq!(document.cases[0].call.args, vec![json!("NaN"), json!(1)]);
        assert_eq!(document.cases[1].call.args, vec![json!("-Infinity"), json!(2)]);
    }

    #[test]
    fn regression_fixture_rejects_duplicate_case_id() {
        let error = load_fixture("invalid-duplicate-case-id.json").expect_err("should fail");
        let message = error.to_string();
        assert!(
            message.contains("case 'div_basic'") && message.contains("duplicate case id"),
            "unexpected error: {message}"
        );
    }

    #[test]
    fn regression_fixture_rejects_unknown_predicate() {
        let error = load_fixture("invalid-predicate.json").expect_err("should fail");
        assert!(matches!(error, ContractError::Schema(_)));
        let message = error.to_string();
        assert!(message.contains("unsupported predicate 'is-even'"), "{message}");
        assert!(message.contains("cases[0].expectation.predicate.name"), "{message}");
    }

    #[test]
    fn unit_validate_spec_document_requires_target_and_cases() {
        assert!(schema_error_message(json!({"cases": []})).contains("at target: missing"));
        assert!(
            schema_error_message(json!({"target": "division:divide"})).contains("at cases: missing")
        );
        assert!(schema_error_message(json!({"target": "divide", "cases": []}))
            .contains("<qualifier>:<function-name>"));
    }

    #[test]
    fn unit_validate_spec_document_fills_call_defaults() {
        let document = validate_spec_document(&json!({
            "target": "division:divide",
            "cases": [{"id": "no_args", "call": {}, "expectation": {"raises": {"types": ["TypeError"]}}}]
        }))
        .expect("valid document");
        assert!(document.cases[0].call.args.is_empty());
        assert!(document.cases[0].call.kwargs.is_empty());
    }

    #[test]
    fn regression_validate_spec_document_rejects_multiple_expectation_kinds() {
        let message = schema_error_message(json!({
            "target": "division:divide",
            "cases": [{
                "id": "ambiguous",
                "call": {"args": [1, 2]},
                "expectation": {"equals": {"value": 0.5}, "predicate": {"name": "is-finite"}}
            }]
        }));
        assert!(message.contains("case 'ambiguous'"), "{message}");
        assert!(message.contains("multiple expectation kinds"), "{message}");
    }

    #[test]
    fn regression_validate_spec_document_rejects_empty_raises_and_negative_tolerance() {
        let empty_raises = schema_error_message(json!({
            "target": "division:divide",
            "cases": [{"id": "r", "call": {}, "expectation": {"raises": {"types": []}}}]
        }));
        assert!(empty_raises.contains("cases[0].expectation.raises.types"));

        let negative = schema_error_message(json!({
            "target": "division:divide",
            "cases": [{"id": "t", "call": {}, "expectation": {"equals": {"value": 1, "tolerance": -0.1}}}]
        }));
        assert!(negative.contains("finite non-negative"), "{negative}");
    }

    #[test]
    fn regression_validate_spec_document_rejects_missing_expectation() {
        let message = schema_error_message(json!({
            "target": "division:divide",
            "cases": [{"id": "bare", "call": {"args": []}}]
        }));
        assert_eq!(
            message,
            "schema violation in case 'bare' at cases[0].expectation: missing required field"
        );
    }

    #[test]
    fn functional_parse_spec_document_with_schema_applies_external_schema() {
        let schema = json!({
            "type": "object",
            "required": ["target", "cases", "version"]
        });
        let raw = r#"{"target": "division:divide", "cases": []}"#;
        let error = parse_spec_document_with_schema(raw, Some(&schema)).expect_err("should fail");
        assert!(error.to_string().contains("JSON schema validation failed"));

        let accepted = r#"{"target": "division:divide", "cases": [], "version": 1}"#;
        let document = parse_spec_document_with_schema(accepted, Some(&schema)).expect("valid");
        assert_eq!(document.extra.get("version"), Some(&json!(1)));
    }

    #[test]
    fn regression_json_schema_error_reports_failing_instance_path() {
        let schema = json!({
            "type": "object",
            "properties": {
                "cases": {"type": "array", "items": {"type": "object", "required": ["id"]}}
            }
        });
        let document = json!({
            "target": "division:divide",
            "cases": [{"id": "a"}, {"call": {}}]
        });
        let error = validate_against_json_schema(&document, &schema).expect_err("missing id");
        assert_eq!(error.field, "/cases/1");
        assert!(error.to_string().contains("schema violation at /cases/1"));

        let root_schema = json!({"type": "object", "required": ["version"]});
        let error = validate_against_json_schema(&document, &root_schema).expect_err("root");
        assert_eq!(error.field, "$");
    }
}
