//! Startup-built lookup table that stands in for load-by-name resolution.
//!
//! A target reference `<qualifier>:<function>` resolves by loading the module
//! registered under `qualifier` and fetching `function` from it. Module
//! loaders run lazily at resolution time so a broken module only fails the
//! documents that reference it.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use irguard_contract::{split_target_reference, Value};
use thiserror::Error;

/// Callable under test. Exceptions are modeled as `Err(Raised)`.
pub type TargetFn = Arc<dyn Fn(&Invocation) -> Result<Value, Raised> + Send + Sync>;

type ModuleLoader = Arc<dyn Fn() -> Result<TargetModule, String> + Send + Sync>;

/// Exception descriptor observed from a target invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raised {
    pub kind: String,
    pub message: String,
}

impl Raised {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new("TypeError", message)
    }

    pub fn value_error(message: impl Into<String>) -> Self {
        Self::new("ValueError", message)
    }
}

impl fmt::Display for Raised {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            f.write_str(&self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

/// Decoded positional and keyword arguments for one call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invocation {
    pub args: Vec<Value>,
    pub kwargs: BTreeMap<String, Value>,
}

impl Invocation {
    pub fn positional(args: Vec<Value>) -> Self {
        Self {
            args,
            kwargs: BTreeMap::new(),
        }
    }

    /// Binds positional then keyword arguments onto `parameters`, in order.
    pub fn bind(&self, function: &str, parameters: &[&str]) -> Result<Vec<Value>, Raised> {
        if self.args.len() > parameters.len() {
            return Err(Raised::type_error(format!(
                "{function}() takes {} positional arguments but {} were given",
                parameters.len(),
                self.args.len()
            )));
        }
        if let Some(unknown) = self
            .kwargs
            .keys()
            .find(|name| !parameters.contains(&name.as_str()))
        {
            return Err(Raised::type_error(format!(
                "{function}() got an unexpected keyword argument '{unknown}'"
            )));
        }

        let mut bound = Vec::with_capacity(parameters.len());
        for (index, parameter) in parameters.iter().enumerate() {
            let positional = self.args.get(index);
            let keyword = self.kwargs.get(*parameter);
            match (positional, keyword) {
                (Some(_), Some(_)) => {
                    return Err(Raised::type_error(format!(
                        "{function}() got multiple values for argument '{parameter}'"
                    )))
                }
                (Some(value), None) | (None, Some(value)) => bound.push(value.clone()),
                (None, None) => {
                    return Err(Raised::type_error(format!(
                        "{function}() missing required argument '{parameter}'"
                    )))
                }
            }
        }
        Ok(bound)
    }
}

/// Named callables exported by one qualifier.
#[derive(Clone, Default)]
pub struct TargetModule {
    functions: BTreeMap<String, TargetFn>,
}

impl TargetModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_function<F>(mut self, name: &str, function: F) -> Self
    where
        F: Fn(&Invocation) -> Result<Value, Raised> + Send + Sync + 'static,
    {
        self.functions.insert(name.to_string(), Arc::new(function));
        self
    }

    pub fn function(&self, name: &str) -> Option<TargetFn> {
        self.functions.get(name).cloned()
    }

    pub fn function_names(&self) -> Vec<String> {
        self.functions.keys().cloned().collect()
    }
}

impl fmt::Debug for TargetModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetModule")
            .field("functions", &self.function_names())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Enumerates supported `ResolutionError` values.
pub enum ResolutionError {
    #[error("target '{target}' must have the form <qualifier>:<function-name>")]
    MalformedTarget { target: String },
    #[error("target module '{qualifier}' is not registered (available: {})", .available.join(", "))]
    ModuleNotFound {
        qualifier: String,
        available: Vec<String>,
    },
    #[error("target module '{qualifier}' failed to load: {reason}")]
    ModuleLoadFailed { qualifier: String, reason: String },
    #[error("target module '{qualifier}' has no function '{function}' (available: {})", .available.join(", "))]
    FunctionNotFound {
        qualifier: String,
        function: String,
        available: Vec<String>,
    },
}

/// A target function resolved for one validation cycle.
#[derive(Clone)]
pub struct ResolvedTarget {
    pub qualifier: String,
    pub function_name: String,
    function: TargetFn,
}

impl ResolvedTarget {
    pub fn reference(&self) -> String {
        format!("{}:{}", self.qualifier, self.function_name)
    }

    /// Calls the target directly. Panics are not trapped here.
    pub fn invoke(&self, invocation: &Invocation) -> Result<Value, Raised> {
        (self.function)(invocation)
    }
}

impl fmt::Debug for ResolvedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedTarget")
            .field("qualifier", &self.qualifier)
            .field("function_name", &self.function_name)
            .finish()
    }
}

#[derive(Clone, Default)]
pub struct TargetRegistry {
    loaders: BTreeMap<String, ModuleLoader>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module whose contents are built on every resolution.
    pub fn register_loader<L>(&mut self, qualifier: &str, loader: L)
    where
        L: Fn() -> Result<TargetModule, String> + Send + Sync + 'static,
    {
        self.loaders
            .insert(qualifier.trim().to_string(), Arc::new(loader));
    }

    pub fn register_module(&mut self, qualifier: &str, module: TargetModule) {
        self.register_loader(qualifier, move || Ok(module.clone()));
    }

    pub fn qualifiers(&self) -> Vec<String> {
        self.loaders.keys().cloned().collect()
    }

    /// Resolves `target`, replacing its qualifier with `qualifier_override` when given.
    pub fn resolve(
        &self,
        target: &str,
        qualifier_override: Option<&str>,
    ) -> Result<ResolvedTarget, ResolutionError> {
        let (declared_qualifier, function_name) =
            split_target_reference(target).ok_or_else(|| ResolutionError::MalformedTarget {
                target: target.to_string(),
            })?;
        let qualifier = qualifier_override
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(declared_qualifier);

        let loader = self
            .loaders
            .get(qualifier)
            .ok_or_else(|| ResolutionError::ModuleNotFound {
                qualifier: qualifier.to_string(),
                available: self.qualifiers(),
            })?;
        let module = loader().map_err(|reason| ResolutionError::ModuleLoadFailed {
            qualifier: qualifier.to_string(),
            reason,
        })?;
        let function =
            module
                .function(function_name)
                .ok_or_else(|| ResolutionError::FunctionNotFound {
                    qualifier: qualifier.to_string(),
                    function: function_name.to_string(),
                    available: module.function_names(),
                })?;

        tracing::debug!(
            qualifier,
            function = function_name,
            "resolved validation target"
        );
        Ok(ResolvedTarget {
            qualifier: qualifier.to_string(),
            function_name: function_name.to_string(),
            function,
        })
    }
}
