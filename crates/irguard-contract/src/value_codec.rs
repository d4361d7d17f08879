//! Conversion between wire JSON values and native call/return values.
//!
//! JSON cannot carry NaN or infinities, so the IR spells them as the sentinel
//! strings below. Decoding never fails; encoding fails only for values that
//! have no document form: complex numbers and strings spelled like a sentinel.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value as JsonValue;
use thiserror::Error;

pub const SENTINEL_NAN: &str = "NaN";
pub const SENTINEL_POS_INFINITY: &str = "Infinity";
pub const SENTINEL_NEG_INFINITY: &str = "-Infinity";

/// Native value passed to, or returned from, a target function.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// Only ever produced by targets; the IR has no spelling for it.
    Complex { re: f64, im: f64 },
}

impl Value {
    /// Numeric view used by tolerance comparison. Booleans are not numbers here.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Short type label used in exception messages and mismatch reasons.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Complex { .. } => "complex",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complex { re, im } => write!(f, "{}", format_complex(*re, *im)),
            other => write!(f, "{}", observed_json(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    #[error("value of type '{type_name}' has no IR representation: {rendered}")]
    Unrepresentable {
        type_name: &'static str,
        rendered: String,
    },
}

/// Decodes a wire value, folding sentinel strings into native floats.
pub fn decode_value(raw: &JsonValue) -> Value {
    match raw {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(value) => Value::Bool(*value),
        JsonValue::Number(number) => match number.as_i64() {
            Some(value) => Value::Int(value),
            None => Value::Float(number.as_f64().unwrap_or(f64::NAN)),
        },
        JsonValue::String(text) => match text.as_str() {
            SENTINEL_NAN => Value::Float(f64::NAN),
            SENTINEL_POS_INFINITY => Value::Float(f64::INFINITY),
            SENTINEL_NEG_INFINITY => Value::Float(f64::NEG_INFINITY),
            _ => Value::Str(text.clone()),
        },
        JsonValue::Array(items) => Value::List(items.iter().map(decode_value).collect()),
        JsonValue::Object(entries) => Value::Map(
            entries
                .iter()
                .map(|(key, value)| (key.clone(), decode_value(value)))
                .collect(),
        ),
    }
}

/// Encodes a native value for the IR, spelling non-finite floats as sentinels.
pub fn encode_value(value: &Value) -> Result<JsonValue, CodecError> {
    Ok(match value {
        Value::Null => JsonValue::Null,
        Value::Bool(flag) => JsonValue::Bool(*flag),
        Value::Int(number) => JsonValue::from(*number),
        Value::Float(number) => encode_float(*number),
        Value::Str(text) if is_sentinel(text) => {
            return Err(CodecError::Unrepresentable {
                type_name: value.type_name(),
                rendered: format!("{text:?}"),
            })
        }
        Value::Str(text) => JsonValue::String(text.clone()),
        Value::List(items) => JsonValue::Array(
            items
                .iter()
                .map(encode_value)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Value::Map(entries) => {
            let mut object = serde_json::Map::new();
            for (key, entry) in entries {
                object.insert(key.clone(), encode_value(entry)?);
            }
            JsonValue::Object(object)
        }
        Value::Complex { re, im } => {
            return Err(CodecError::Unrepresentable {
                type_name: value.type_name(),
                rendered: format_complex(*re, *im),
            })
        }
    })
}

/// Renders any value for run reports, including ones `encode_value` rejects.
pub fn observed_json(value: &Value) -> JsonValue {
    match value {
        Value::Complex { re, im } => JsonValue::String(format_complex(*re, *im)),
        Value::Str(text) => JsonValue::String(text.clone()),
        Value::List(items) => JsonValue::Array(items.iter().map(observed_json).collect()),
        Value::Map(entries) => JsonValue::Object(
            entries
                .iter()
                .map(|(key, entry)| (key.clone(), observed_json(entry)))
                .collect(),
        ),
        other => encode_value(other).unwrap_or(JsonValue::Null),
    }
}

/// Structural equality where NaN is equivalent to NaN.
pub fn values_equivalent(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Float(a), Value::Float(b)) => (a.is_nan() && b.is_nan()) || a == b,
        (Value::Complex { re: ar, im: ai }, Value::Complex { re: br, im: bi }) => {
            values_equivalent(&Value::Float(*ar), &Value::Float(*br))
                && values_equivalent(&Value::Float(*ai), &Value::Float(*bi))
        }
        (Value::List(a), Value::List(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equivalent(x, y))
        }
        (Value::Map(a), Value::Map(b)) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b)
                    .all(|((ka, va), (kb, vb))| ka == kb && values_equivalent(va, vb))
        }
        _ => left == right,
    }
}

/// A string spelled like a sentinel would decode back as a float.
fn is_sentinel(text: &str) -> bool {
    matches!(
        text,
        SENTINEL_NAN | SENTINEL_POS_INFINITY | SENTINEL_NEG_INFINITY
    )
}

fn encode_float(number: f64) -> JsonValue {
    if number.is_nan() {
        return JsonValue::String(SENTINEL_NAN.to_string());
    }
    if number.is_infinite() {
        let sentinel = if number > 0.0 {
            SENTINEL_POS_INFINITY
        } else {
            SENTINEL_NEG_INFINITY
        };
        return JsonValue::String(sentinel.to_string());
    }
    serde_json::Number::from_f64(number)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}

fn format_complex(re: f64, im: f64) -> String {
    let sign = if im.is_sign_negative() { '-' } else { '+' };
    format!("({re}{sign}{}j)", im.abs())
}
