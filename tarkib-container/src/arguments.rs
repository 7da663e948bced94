//! Argument resolution — the merge of explicit, configured and
//! hint-driven arguments into the set a factory or method receives.
//!
//! This is where most of the container's behavior lives. Two passes:
//!
//! 1. [`ArgumentResolver::resolve_named`] merges configured argument
//!    specs into the caller's explicit arguments, recursively building
//!    object-typed dependencies.
//! 2. [`ArgumentResolver::resolve_positional`] walks the callable's
//!    declared parameter list in order, filling type-hinted parameters
//!    the merged set left unset.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::config::{ArgumentSpec, ScalarValue};
use crate::container::{Container, ResolutionStack};
use crate::error::{ContainerError, Result};
use crate::registry::{Instance, ParamSpec};
use crate::resolve::effective_config;

/// A single resolved argument: a literal scalar or an erased object.
#[derive(Clone)]
pub enum ArgValue {
    Scalar(ScalarValue),
    Object(Instance),
}

impl fmt::Debug for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Scalar(value) => f.debug_tuple("Scalar").field(value).finish(),
            ArgValue::Object(_) => f.write_str("Object(..)"),
        }
    }
}

/// Named arguments consumed by factories and methods.
///
/// Built by callers (explicit arguments) and by the container itself
/// (configured and hint-driven arguments). Factories read values out
/// with the typed getters; a missing or mismatched value surfaces there,
/// at invocation time.
#[derive(Clone, Debug, Default)]
pub struct ArgumentSet {
    values: BTreeMap<String, ArgValue>,
}

impl ArgumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ArgValue) {
        self.values.insert(name.into(), value);
    }

    /// Adds a literal scalar argument.
    pub fn with_scalar(mut self, name: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        self.insert(name, ArgValue::Scalar(value.into()));
        self
    }

    /// Adds an already-erased object argument.
    pub fn with_instance(mut self, name: impl Into<String>, instance: Instance) -> Self {
        self.insert(name, ArgValue::Object(instance));
        self
    }

    /// Wraps `value` and adds it as an object argument.
    pub fn with_object<T: Send + Sync + 'static>(self, name: impl Into<String>, value: T) -> Self {
        self.with_instance(name, Arc::new(value))
    }

    // ── Typed getters used inside factories and methods ──

    pub fn scalar(&self, name: &str) -> Result<&ScalarValue> {
        match self.values.get(name) {
            Some(ArgValue::Scalar(value)) => Ok(value),
            Some(ArgValue::Object(_)) => Err(ContainerError::ArgumentType {
                parameter: name.to_string(),
                expected: "scalar",
            }),
            None => Err(ContainerError::MissingArgument {
                parameter: name.to_string(),
            }),
        }
    }

    pub fn object<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>> {
        match self.values.get(name) {
            Some(ArgValue::Object(instance)) => {
                instance
                    .clone()
                    .downcast::<T>()
                    .map_err(|_| ContainerError::ArgumentType {
                        parameter: name.to_string(),
                        expected: std::any::type_name::<T>(),
                    })
            }
            Some(ArgValue::Scalar(_)) => Err(ContainerError::ArgumentType {
                parameter: name.to_string(),
                expected: std::any::type_name::<T>(),
            }),
            None => Err(ContainerError::MissingArgument {
                parameter: name.to_string(),
            }),
        }
    }

    pub fn i64(&self, name: &str) -> Result<i64> {
        self.scalar(name)?
            .as_i64()
            .ok_or_else(|| ContainerError::ArgumentType {
                parameter: name.to_string(),
                expected: "integer",
            })
    }

    pub fn f64(&self, name: &str) -> Result<f64> {
        self.scalar(name)?
            .as_f64()
            .ok_or_else(|| ContainerError::ArgumentType {
                parameter: name.to_string(),
                expected: "float",
            })
    }

    pub fn bool(&self, name: &str) -> Result<bool> {
        self.scalar(name)?
            .as_bool()
            .ok_or_else(|| ContainerError::ArgumentType {
                parameter: name.to_string(),
                expected: "boolean",
            })
    }

    pub fn str(&self, name: &str) -> Result<&str> {
        self.scalar(name)?
            .as_str()
            .ok_or_else(|| ContainerError::ArgumentType {
                parameter: name.to_string(),
                expected: "string",
            })
    }
}

/// Bridges argument resolution back into the container for recursive
/// object construction.
pub(crate) struct ArgumentResolver<'a> {
    pub container: &'a Container,
}

impl ArgumentResolver<'_> {
    /// Merges configured argument specs for `type_name` into `explicit`.
    ///
    /// Specs are looked up against the *requested* name (preference
    /// rebinding happens inside the config lookup, not here). Explicit
    /// caller-supplied arguments are never overwritten.
    pub fn resolve_named(
        &self,
        type_name: &str,
        explicit: &ArgumentSet,
        stack: &mut ResolutionStack,
    ) -> Result<ArgumentSet> {
        let mut merged = explicit.clone();

        let effective = effective_config(self.container.config(), type_name);
        let Some(specs) = effective.arguments else {
            return Ok(merged);
        };

        for (parameter, spec) in specs {
            if merged.contains(parameter) {
                continue;
            }
            match spec {
                ArgumentSpec::Scalar { value } => {
                    merged.insert(parameter.clone(), ArgValue::Scalar(value.clone()));
                }
                ArgumentSpec::Object { type_name: referenced, shared } => {
                    let instance = self.resolve_object_spec(referenced, *shared, stack)?;
                    merged.insert(parameter.clone(), ArgValue::Object(instance));
                }
            }
        }

        Ok(merged)
    }

    /// An already-cached instance is reused verbatim no matter what the
    /// spec's own shared flag says; otherwise the flag picks between
    /// the cache-or-create path and a fresh, uncached build.
    fn resolve_object_spec(
        &self,
        referenced: &str,
        shared: bool,
        stack: &mut ResolutionStack,
    ) -> Result<Instance> {
        if let Some(existing) = self.container.shared_cache().peek(referenced) {
            trace!(referenced, "reusing cached instance for object argument");
            return Ok(existing);
        }
        if shared {
            self.container.get_with(referenced, stack)
        } else {
            self.container.create_with(referenced, &ArgumentSet::new(), stack)
        }
    }

    /// Walks `params` in declaration order and produces the final set
    /// handed to the callable.
    ///
    /// A parameter takes its merged value by name when present. With a
    /// type hint and no value, the container resolves the hinted type
    /// itself, shared-or-fresh per `is_shared` on that type (keyed by
    /// the hint, not the parameter name). With neither, the parameter
    /// stays unset and the callable fails if it was required.
    pub fn resolve_positional(
        &self,
        params: &[ParamSpec],
        merged: &ArgumentSet,
        stack: &mut ResolutionStack,
    ) -> Result<ArgumentSet> {
        let mut ordered = ArgumentSet::new();

        for param in params {
            if let Some(value) = merged.get(&param.name) {
                ordered.insert(param.name.clone(), value.clone());
            } else if let Some(hint) = &param.type_hint {
                trace!(parameter = %param.name, hint = %hint, "resolving type-hinted parameter");
                let instance = if self.container.is_shared(hint) {
                    self.container.get_with(hint, stack)?
                } else {
                    self.container.create_with(hint, &ArgumentSet::new(), stack)?
                };
                ordered.insert(param.name.clone(), ArgValue::Object(instance));
            }
        }

        Ok(ordered)
    }
}
