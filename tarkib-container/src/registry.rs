//! Factory registry — maps type names to declared constructors.
//!
//! The container does not reflect over Rust types at runtime. Instead,
//! application code registers, per type name, a factory function plus
//! the ordered list of parameters that factory consumes, and optionally
//! methods callable through `invoke`. This registry is the container's
//! only notion of "introspection".

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::arguments::ArgumentSet;
use crate::config::TypeName;
use crate::error::{ContainerError, Result};

/// Type-erased handle to a container-built object.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Factory signature: named arguments in, erased instance out.
///
/// # Why `Arc` and not `Box`?
/// Factories are shared between threads (the container is `Send + Sync`);
/// `Arc` allows cloning without copying the closure.
pub type FactoryFn = Arc<dyn Fn(&ArgumentSet) -> Result<Instance> + Send + Sync>;

/// Method signature: erased receiver plus named arguments, erased result.
pub(crate) type MethodFn = Arc<dyn Fn(&Instance, &ArgumentSet) -> Result<Instance> + Send + Sync>;

/// One declared parameter of a constructor or method, in declaration
/// order. A parameter either expects a caller/config-supplied value, or
/// carries a type hint the container can resolve on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub type_hint: Option<TypeName>,
}

impl ParamSpec {
    /// A parameter with no type hint; the value must come from explicit
    /// or configured arguments.
    pub fn value(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_hint: None,
        }
    }

    /// A parameter with an object type hint the container may resolve
    /// by itself when no value is supplied.
    pub fn object(name: impl Into<String>, type_hint: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            type_hint: Some(type_hint.into()),
        }
    }
}

/// A registered constructor: declared parameters plus the factory.
pub(crate) struct FactoryEntry {
    pub params: Vec<ParamSpec>,
    pub build: FactoryFn,
}

/// A registered method: declared parameters plus the callable.
pub(crate) struct MethodEntry {
    pub params: Vec<ParamSpec>,
    pub call: MethodFn,
}

/// Stores every registered factory and method.
///
/// Populated before `build()`; immutable once the container owns it.
/// Registering a second factory for the same name replaces the first.
#[derive(Default)]
pub struct FactoryRegistry {
    factories: HashMap<TypeName, FactoryEntry>,
    methods: HashMap<TypeId, HashMap<String, MethodEntry>>,
    type_names: HashMap<TypeId, TypeName>,
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory for `type_name` producing `T`.
    ///
    /// `params` is the constructor's parameter list in declaration
    /// order; the factory reads them by name from the [`ArgumentSet`]
    /// it receives.
    pub fn register<T, F>(&mut self, type_name: impl Into<TypeName>, params: Vec<ParamSpec>, build: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&ArgumentSet) -> Result<T> + Send + Sync + 'static,
    {
        let type_name = type_name.into();
        debug!(type_name = %type_name, params = params.len(), "registered factory");

        self.type_names.insert(TypeId::of::<T>(), type_name.clone());

        let build: FactoryFn = Arc::new(move |args| Ok(Arc::new(build(args)?) as Instance));
        self.factories.insert(type_name, FactoryEntry { params, build });
    }

    /// Registers a method callable through `invoke` on instances of `T`.
    ///
    /// Methods are keyed by the receiver's [`TypeId`], which is how the
    /// container finds them from a type-erased object at call time.
    pub fn method<T, R, F>(&mut self, name: impl Into<String>, params: Vec<ParamSpec>, call: F)
    where
        T: Send + Sync + 'static,
        R: Send + Sync + 'static,
        F: Fn(&T, &ArgumentSet) -> Result<R> + Send + Sync + 'static,
    {
        let name = name.into();
        let owner = self
            .type_names
            .get(&TypeId::of::<T>())
            .cloned()
            .unwrap_or_else(|| std::any::type_name::<T>().to_string());
        debug!(method = %name, owner = %owner, "registered method");

        let call: MethodFn = Arc::new(move |receiver, args| {
            let receiver = receiver
                .downcast_ref::<T>()
                .ok_or_else(|| ContainerError::TypeMismatch {
                    type_name: owner.clone(),
                    expected: std::any::type_name::<T>(),
                })?;
            Ok(Arc::new(call(receiver, args)?) as Instance)
        });

        self.methods
            .entry(TypeId::of::<T>())
            .or_default()
            .insert(name, MethodEntry { params, call });
    }

    pub(crate) fn factory(&self, type_name: &str) -> Option<&FactoryEntry> {
        self.factories.get(type_name)
    }

    pub(crate) fn method_of(&self, type_id: TypeId, name: &str) -> Option<&MethodEntry> {
        self.methods.get(&type_id).and_then(|m| m.get(name))
    }

    /// Registered name of a runtime type, for diagnostics.
    pub fn type_name_of(&self, type_id: TypeId) -> Option<&str> {
        self.type_names.get(&type_id).map(String::as_str)
    }

    /// All registered type names, for "did you mean?" suggestions.
    pub fn registered_type_names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("factories", &self.factories.len())
            .field("method_owners", &self.methods.len())
            .finish()
    }
}
