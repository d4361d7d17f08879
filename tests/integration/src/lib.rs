//! Shared fixtures for the cross-crate validation cycle tests.

use std::sync::{Arc, Mutex};

use irguard_contract::Value;
use irguard_runtime::{Invocation, Raised, TargetModule, TargetRegistry};

/// Arguments of every call a recording target received, in call order.
pub type CallLog = Arc<Mutex<Vec<Vec<Value>>>>;

/// Registry with a `stats:mean` target that records every call it receives.
pub fn recording_registry() -> (TargetRegistry, CallLog) {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&log);
    let mut registry = TargetRegistry::new();
    registry.register_module(
        "stats",
        TargetModule::new().with_function("mean", move |invocation: &Invocation| {
            let bound = invocation.bind("mean", &["values"])?;
            if let Ok(mut calls) = recorder.lock() {
                calls.push(bound.clone());
            }
            mean(&bound[0])
        }),
    );
    (registry, log)
}

fn mean(values: &Value) -> Result<Value, Raised> {
    let Value::List(items) = values else {
        return Err(Raised::type_error("mean() expects a list"));
    };
    if items.is_empty() {
        return Err(Raised::new(
            "StatisticsError",
            "mean requires at least one data point",
        ));
    }
    let mut total = 0.0;
    for item in items {
        total += item
            .as_f64()
            .ok_or_else(|| Raised::type_error("mean() expects numbers"))?;
    }
    Ok(Value::Float(total / items.len() as f64))
}
