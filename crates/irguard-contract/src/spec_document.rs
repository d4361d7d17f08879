use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value as JsonValue};

use crate::predicate_registry::PredicateName;

pub const TARGET_DELIMITER: char = ':';
pub const DEFAULT_EQUALS_TOLERANCE: f64 = 1e-10;

/// Validated IR document. Only `expectation` fields are ever rewritten.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecDocument {
    pub target: String,
    pub cases: Vec<SpecCase>,
    /// Unrecognized top-level fields, carried through correction untouched.
    pub extra: Map<String, JsonValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpecCase {
    pub id: String,
    pub call: CallSpec,
    pub expectation: Expectation,
    pub extra: Map<String, JsonValue>,
}

/// Wire-form call arguments; decoded through the value codec at invocation time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallSpec {
    pub args: Vec<JsonValue>,
    pub kwargs: BTreeMap<String, JsonValue>,
}

#[derive(Debug, Clone, PartialEq)]
/// Enumerates supported `Expectation` values.
pub enum Expectation {
    Raises {
        types: Vec<String>,
    },
    Equals {
        value: JsonValue,
        tolerance: Option<f64>,
    },
    Predicate {
        name: PredicateName,
    },
}

impl Expectation {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Raises { .. } => "raises",
            Self::Equals { .. } => "equals",
            Self::Predicate { .. } => "predicate",
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Raises { types } => json!({ "raises": { "types": types } }),
            Self::Equals { value, tolerance } => {
                let mut body = Map::new();
                body.insert("value".to_string(), value.clone());
                if let Some(tolerance) = tolerance {
                    body.insert("tolerance".to_string(), json!(tolerance));
                }
                json!({ "equals": body })
            }
            Self::Predicate { name } => json!({ "predicate": { "name": name.as_str() } }),
        }
    }
}

impl SpecCase {
    pub fn to_json(&self) -> JsonValue {
        let mut call = Map::new();
        call.insert("args".to_string(), JsonValue::Array(self.call.args.clone()));
        if !self.call.kwargs.is_empty() {
            call.insert(
                "kwargs".to_string(),
                JsonValue::Object(
                    self.call
                        .kwargs
                        .iter()
                        .map(|(key, value)| (key.clone(), value.clone()))
                        .collect(),
                ),
            );
        }

        let mut object = self.extra.clone();
        object.insert("id".to_string(), JsonValue::String(self.id.clone()));
        object.insert("call".to_string(), JsonValue::Object(call));
        object.insert("expectation".to_string(), self.expectation.to_json());
        JsonValue::Object(object)
    }
}

impl SpecDocument {
    pub fn to_json(&self) -> JsonValue {
        let mut object = self.extra.clone();
        object.insert("target".to_string(), JsonValue::String(self.target.clone()));
        object.insert(
            "cases".to_string(),
            JsonValue::Array(self.cases.iter().map(SpecCase::to_json).collect()),
        );
        JsonValue::Object(object)
    }

    pub fn case(&self, case_id: &str) -> Option<&SpecCase> {
        self.cases.iter().find(|case| case.id == case_id)
    }

    pub fn case_mut(&mut self, case_id: &str) -> Option<&mut SpecCase> {
        self.cases.iter_mut().find(|case| case.id == case_id)
    }
}

impl Serialize for SpecDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Splits `<qualifier>:<function>` on its single delimiter.
pub fn split_target_reference(target: &str) -> Option<(&str, &str)> {
    let (qualifier, function) = target.trim().split_once(TARGET_DELIMITER)?;
    let qualifier = qualifier.trim();
    let function = function.trim();
    if qualifier.is_empty() || function.is_empty() || function.contains(TARGET_DELIMITER) {
        return None;
    }
    Some((qualifier, function))
}

#[cfg(test)]
mod tests {
    use super::{split_target_reference, CallSpec, Expectation, SpecCase};
    use crate::predicate_registry::PredicateName;
    use serde_json::{json, Map};

    #[test]
    fn unit_split_target_reference_requires_single_delimiter() {
        assert_eq!(
            split_target_reference("division:divide"),
            Some(("division", "divide"))
        );
        assert_eq!(split_target_reference("division.divide"), None);
        assert_eq!(split_target_reference(":divide"), None);
        assert_eq!(split_target_reference("a:b:c"), None);
    }

    #[test]
    fn unit_expectation_to_json_uses_single_key_wire_form() {
        assert_eq!(
            Expectation::Raises {
                types: vec!["ZeroDivisionError".to_string()]
            }
            .to_json(),
            json!({"raises": {"types": ["ZeroDivisionError"]}})
        );
        assert_eq!(
            Expectation::Equals {
                value: json!(5.0),
                tolerance: None
            }
            .to_json(),
            json!({"equals": {"value": 5.0}})
        );
        assert_eq!(
            Expectation::Predicate {
                name: PredicateName::IsInfinite
            }
            .to_json(),
            json!({"predicate": {"name": "is-infinite"}})
        );
    }

    #[test]
    fn functional_case_to_json_preserves_extra_fields() {
        let mut extra = Map::new();
        extra.insert("note".to_string(), json!("generated"));
        let case = SpecCase {
            id: "div_basic".to_string(),
            call: CallSpec {
                args: vec![json!(10), json!(2)],
                ..CallSpec::default()
            },
            expectation: Expectation::Equals {
                value: json!(5.0),
                tolerance: Some(1e-9),
            },
            extra,
        };
        let rendered = case.to_json();
        assert_eq!(rendered["note"], json!("generated"));
        assert_eq!(rendered["call"], json!({"args": [10, 2]}));
        assert_eq!(rendered["expectation"]["equals"]["tolerance"], json!(1e-9));
    }
}
