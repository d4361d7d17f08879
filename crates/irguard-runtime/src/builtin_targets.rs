//! Targets shipped with the binary so IR documents can be validated out of the box.

use std::sync::OnceLock;

use irguard_contract::Value;
use regex::Regex;

use crate::target_registry::{Invocation, Raised, TargetModule, TargetRegistry};

/// Registry with every built-in module: `division`, `string_utils`, `math_ext`.
pub fn default_registry() -> TargetRegistry {
    let mut registry = TargetRegistry::new();
    registry.register_module("division", division_module());
    registry.register_module("string_utils", string_utils_module());
    registry.register_module("math_ext", math_ext_module());
    registry
}

pub fn division_module() -> TargetModule {
    TargetModule::new().with_function("divide", divide)
}

pub fn string_utils_module() -> TargetModule {
    TargetModule::new()
        .with_function("is_palindrome", is_palindrome)
        .with_function("find_longest_word", find_longest_word)
}

pub fn math_ext_module() -> TargetModule {
    TargetModule::new().with_function("square_root", square_root)
}

fn divide(invocation: &Invocation) -> Result<Value, Raised> {
    let bound = invocation.bind("divide", &["a", "b"])?;
    let (Some(numerator), Some(denominator)) = (bound[0].as_f64(), bound[1].as_f64()) else {
        return Err(Raised::type_error("Both arguments must be numeric"));
    };
    if denominator == 0.0 {
        return Err(Raised::new("ZeroDivisionError", "Cannot divide by zero"));
    }
    Ok(Value::Float(numerator / denominator))
}

fn is_palindrome(invocation: &Invocation) -> Result<Value, Raised> {
    let bound = invocation.bind("is_palindrome", &["s"])?;
    let text = require_str(&bound[0], "is_palindrome")?;
    let cleaned = text
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|ch| ch.to_ascii_lowercase())
        .collect::<Vec<_>>();
    Ok(Value::Bool(cleaned.iter().eq(cleaned.iter().rev())))
}

fn word_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[a-zA-Z0-9]+\b").expect("word regex"))
}

fn find_longest_word(invocation: &Invocation) -> Result<Value, Raised> {
    let bound = invocation.bind("find_longest_word", &["sentence"])?;
    let sentence = require_str(&bound[0], "find_longest_word")?;
    let longest = word_regex()
        .find_iter(sentence)
        .map(|word| word.as_str())
        .fold(None::<&str>, |best, word| match best {
            Some(current) if current.len() >= word.len() => Some(current),
            _ => Some(word),
        });
    Ok(longest.map_or(Value::Null, |word| Value::Str(word.to_string())))
}

fn square_root(invocation: &Invocation) -> Result<Value, Raised> {
    let bound = invocation.bind("square_root", &["x"])?;
    let x = bound[0]
        .as_f64()
        .ok_or_else(|| Raised::type_error("must be real number"))?;
    if x < 0.0 {
        return Ok(Value::Complex {
            re: 0.0,
            im: (-x).sqrt(),
        });
    }
    Ok(Value::Float(x.sqrt()))
}

fn require_str<'a>(value: &'a Value, function: &str) -> Result<&'a str, Raised> {
    value.as_str().ok_or_else(|| {
        Raised::type_error(format!(
            "{function}() expected str, got {}",
            value.type_name()
        ))
    })
}
