//! # The Container — heart of Tarkib
//!
//! The facade composing type resolution, argument resolution and the
//! shared-instance cache behind three operations:
//!
//! ```text
//! ContainerBuilder ──build()──> Container
//!                                  │
//!                     ┌───────────┼────────────┐
//!                  create()     get()       invoke()
//!                  (always     (cached/     (method on an
//!                   fresh)      shared)      existing object)
//! ```
//!
//! # Examples
//! ```rust
//! use tarkib_container::prelude::*;
//!
//! struct FileLogger;
//!
//! let container = Container::builder()
//!     .preference("Logger", "FileLogger")
//!     .factory::<FileLogger, _>("FileLogger", vec![], |_| Ok(FileLogger))
//!     .build();
//!
//! let logger = container.get("Logger").expect("failed to resolve");
//! assert!(logger.downcast::<FileLogger>().is_ok());
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{info, instrument, trace, warn};

use crate::arguments::{ArgumentResolver, ArgumentSet};
use crate::config::{ContainerConfig, TypeConfig, TypeName, VirtualTypeConfig, normalize_type_name};
use crate::error::{
    ContainerError, CyclicDependencyError, MissingMethodError, Result, UnresolvableTypeError,
};
use crate::registry::{FactoryRegistry, Instance, ParamSpec};
use crate::resolve::{effective_config, resolve_type};
use crate::shared::SharedInstanceCache;
use tarkib_support::rendering::suggest_similar;

// ============================================================
// ContainerBuilder
// ============================================================

/// Builds a [`Container`] from a configuration snapshot, a factory
/// registry and optional pre-built shared instances.
///
/// # Examples
/// ```rust,ignore
/// let container = Container::builder()
///     .config(snapshot)
///     .factory::<Database, _>("Database", vec![ParamSpec::value("url")], |args| { ... })
///     .shared_instance("AppConfig", app_config)
///     .build();
/// ```
pub struct ContainerBuilder {
    config: ContainerConfig,
    registry: FactoryRegistry,
    seed: HashMap<String, Instance>,
}

impl ContainerBuilder {
    fn new() -> Self {
        Self {
            config: ContainerConfig::new(),
            registry: FactoryRegistry::new(),
            seed: HashMap::new(),
        }
    }

    /// Replaces the whole configuration snapshot, e.g. one deserialized
    /// from JSON.
    pub fn config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds an interface-to-concrete preference (one hop, not chained).
    pub fn preference(mut self, from: impl Into<TypeName>, to: impl Into<TypeName>) -> Self {
        self.config.preferences.insert(from.into(), to.into());
        self
    }

    /// Adds a virtual type: an alias building `config.base_type` with
    /// preset arguments.
    pub fn virtual_type(mut self, name: impl Into<TypeName>, config: VirtualTypeConfig) -> Self {
        self.config.virtual_types.insert(name.into(), config);
        self
    }

    /// Adds a per-type construction config (shared flag + arguments).
    pub fn type_config(mut self, name: impl Into<TypeName>, config: TypeConfig) -> Self {
        self.config.types.insert(name.into(), config);
        self
    }

    /// Registers a factory for `type_name` producing `T`.
    pub fn factory<T, F>(
        mut self,
        type_name: impl Into<TypeName>,
        params: Vec<ParamSpec>,
        build: F,
    ) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ArgumentSet) -> Result<T> + Send + Sync + 'static,
    {
        self.registry.register::<T, F>(type_name, params, build);
        self
    }

    /// Registers a method callable through [`Container::invoke`] on
    /// instances of `T`.
    pub fn method<T, R, F>(mut self, name: impl Into<String>, params: Vec<ParamSpec>, call: F) -> Self
    where
        T: Send + Sync + 'static,
        R: Send + Sync + 'static,
        F: Fn(&T, &ArgumentSet) -> Result<R> + Send + Sync + 'static,
    {
        self.registry.method::<T, R, F>(name, params, call);
        self
    }

    /// Seeds the shared cache with an externally built singleton.
    pub fn shared_instance<T: Send + Sync + 'static>(
        mut self,
        type_name: impl Into<TypeName>,
        value: T,
    ) -> Self {
        self.seed.insert(type_name.into(), Arc::new(value));
        self
    }

    /// Freezes the snapshot and returns the container.
    ///
    /// Every configured type name is normalized here, once, so lookups
    /// at resolve time are plain map hits.
    #[instrument(skip(self), name = "container_build")]
    pub fn build(self) -> Container {
        info!(
            factories = self.registry.len(),
            seeded = self.seed.len(),
            "building container"
        );

        let seed = self
            .seed
            .into_iter()
            .map(|(name, instance)| (normalize_type_name(&name).to_string(), instance))
            .collect();

        Container {
            config: self.config.normalized(),
            registry: self.registry,
            shared: SharedInstanceCache::new(seed),
        }
    }
}

// ============================================================
// ResolutionStack
// ============================================================

/// Type names currently being built on this resolution chain.
///
/// Revisiting a name fails fast with [`ContainerError::CyclicDependency`]
/// instead of recursing until the call stack is exhausted. Each public
/// entry point starts a fresh stack, so the guard is per-chain and two
/// threads building the same type are not mistaken for a cycle.
#[derive(Debug, Default)]
pub(crate) struct ResolutionStack {
    frames: Vec<String>,
}

impl ResolutionStack {
    fn enter(&mut self, type_name: &str) -> Result<()> {
        if self.frames.iter().any(|frame| frame == type_name) {
            let mut chain = self.frames.clone();
            chain.push(type_name.to_string());
            warn!(?chain, "cyclic dependency detected");
            return Err(ContainerError::CyclicDependency(CyclicDependencyError {
                chain,
            }));
        }
        self.frames.push(type_name.to_string());
        Ok(())
    }

    fn leave(&mut self) {
        self.frames.pop();
    }

    /// The type whose arguments required the one on top of the stack.
    fn parent(&self) -> Option<&str> {
        self.frames
            .len()
            .checked_sub(2)
            .and_then(|i| self.frames.get(i))
            .map(String::as_str)
    }
}

// ============================================================
// Container
// ============================================================

/// Immutable, thread-safe object-resolution container.
///
/// Created by [`ContainerBuilder::build()`]. Owns the configuration
/// snapshot, the factory registry and the shared-instance cache; the
/// cache is the only mutable state and only ever grows.
pub struct Container {
    config: ContainerConfig,
    registry: FactoryRegistry,
    shared: SharedInstanceCache,
}

impl Container {
    /// Creates a new builder.
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    /// Builds a fresh instance of `type_name`.
    ///
    /// Resolves the concrete type, merges configured arguments into
    /// `arguments` (against the requested name, not the concrete one),
    /// fills type-hinted parameters and invokes the factory. Never
    /// consults or populates the shared cache.
    pub fn create(&self, type_name: &str, arguments: ArgumentSet) -> Result<Instance> {
        self.create_with(type_name, &arguments, &mut ResolutionStack::default())
    }

    /// Returns the shared instance of `type_name`, building and caching
    /// it on first request.
    ///
    /// The name is normalized first. Anything requested through this
    /// path gets cached, whether or not its config marks it shared.
    pub fn get(&self, type_name: &str) -> Result<Instance> {
        self.get_with(type_name, &mut ResolutionStack::default())
    }

    /// Calls a registered method on a container-built object.
    ///
    /// The method is looked up by the object's runtime type. Parameters
    /// resolve from `arguments` by name, and from type hints for the
    /// rest; configured argument specs do not apply to method calls.
    pub fn invoke(&self, object: &Instance, method: &str, arguments: ArgumentSet) -> Result<Instance> {
        let type_id = Any::type_id(object.as_ref());
        let entry = self.registry.method_of(type_id, method).ok_or_else(|| {
            ContainerError::MissingMethod(MissingMethodError {
                type_name: self
                    .registry
                    .type_name_of(type_id)
                    .unwrap_or("<unregistered>")
                    .to_string(),
                method: method.to_string(),
            })
        })?;

        trace!(method, "invoking method");
        let mut stack = ResolutionStack::default();
        let resolver = ArgumentResolver { container: self };
        let ordered = resolver.resolve_positional(&entry.params, &arguments, &mut stack)?;
        (entry.call)(object, &ordered)
    }

    /// Whether the effective config marks `type_name` as shared.
    pub fn is_shared(&self, type_name: &str) -> bool {
        effective_config(&self.config, normalize_type_name(type_name)).shared
    }

    /// [`create`](Container::create) plus a downcast to `T`.
    pub fn create_as<T: Send + Sync + 'static>(
        &self,
        type_name: &str,
        arguments: ArgumentSet,
    ) -> Result<Arc<T>> {
        downcast_instance(self.create(type_name, arguments)?, type_name)
    }

    /// [`get`](Container::get) plus a downcast to `T`.
    pub fn get_as<T: Send + Sync + 'static>(&self, type_name: &str) -> Result<Arc<T>> {
        downcast_instance(self.get(type_name)?, type_name)
    }

    // ── Internal ──

    pub(crate) fn config(&self) -> &ContainerConfig {
        &self.config
    }

    pub(crate) fn shared_cache(&self) -> &SharedInstanceCache {
        &self.shared
    }

    pub(crate) fn create_with(
        &self,
        type_name: &str,
        explicit: &ArgumentSet,
        stack: &mut ResolutionStack,
    ) -> Result<Instance> {
        stack.enter(type_name)?;
        let result = self.create_guarded(type_name, explicit, stack);
        stack.leave();
        result
    }

    fn create_guarded(
        &self,
        type_name: &str,
        explicit: &ArgumentSet,
        stack: &mut ResolutionStack,
    ) -> Result<Instance> {
        let concrete = resolve_type(&self.config, type_name);
        trace!(requested = type_name, concrete, "creating instance");

        let resolver = ArgumentResolver { container: self };
        let merged = resolver.resolve_named(type_name, explicit, stack)?;

        let entry = self
            .registry
            .factory(concrete)
            .ok_or_else(|| self.unresolvable(concrete, stack))?;

        let ordered = resolver.resolve_positional(&entry.params, &merged, stack)?;
        (entry.build)(&ordered)
    }

    pub(crate) fn get_with(&self, type_name: &str, stack: &mut ResolutionStack) -> Result<Instance> {
        let type_name = normalize_type_name(type_name);
        if let Some(existing) = self.shared.peek(type_name) {
            trace!(type_name, "shared cache hit");
            return Ok(existing);
        }

        let built = self.create_with(type_name, &ArgumentSet::new(), stack)?;
        Ok(self.shared.insert_if_absent(type_name, built))
    }

    fn unresolvable(&self, requested: &str, stack: &ResolutionStack) -> ContainerError {
        let available = self.registry.registered_type_names();
        ContainerError::UnresolvableType(UnresolvableTypeError {
            requested: requested.to_string(),
            required_by: stack.parent().map(str::to_string),
            suggestions: suggest_similar(requested, &available, 3),
        })
    }
}

fn downcast_instance<T: Send + Sync + 'static>(instance: Instance, type_name: &str) -> Result<Arc<T>> {
    instance
        .downcast::<T>()
        .map_err(|_| ContainerError::TypeMismatch {
            type_name: type_name.to_string(),
            expected: std::any::type_name::<T>(),
        })
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("factories", &self.registry.len())
            .field("shared", &self.shared.len())
            .finish()
    }
}

// ============================================================
// Prelude
// ============================================================

pub mod prelude {
    pub use super::{Container, ContainerBuilder};
    pub use crate::arguments::{ArgValue, ArgumentSet};
    pub use crate::config::{
        ArgumentSpec, ContainerConfig, ScalarValue, TypeConfig, VirtualTypeConfig,
    };
    pub use crate::error::{ContainerError, Result};
    pub use crate::registry::{FactoryRegistry, Instance, ParamSpec};
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArgumentSpec;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FileLogger;

    #[derive(Debug)]
    struct DbConnection {
        id: u32,
    }

    struct Repo {
        ttl: i64,
        db: Option<Arc<DbConnection>>,
    }

    fn logger_container() -> Container {
        Container::builder()
            .preference("Logger", "FileLogger")
            .factory::<FileLogger, _>("FileLogger", vec![], |_| Ok(FileLogger))
            .build()
    }

    #[test]
    fn scenario_a_preference_resolution_and_identity() {
        let container = logger_container();

        let first = container.get("Logger").unwrap();
        assert!(first.clone().downcast::<FileLogger>().is_ok());

        let second = container.get("Logger").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn scenario_b_virtual_type_with_preset_scalar() {
        let container = Container::builder()
            .virtual_type(
                "CachedRepo",
                VirtualTypeConfig::new("Repo").argument("ttl", ArgumentSpec::scalar(60)),
            )
            .factory::<Repo, _>("Repo", vec![ParamSpec::value("ttl")], |args| {
                Ok(Repo {
                    ttl: args.i64("ttl")?,
                    db: None,
                })
            })
            .build();

        let repo = container.create_as::<Repo>("CachedRepo", ArgumentSet::new()).unwrap();
        assert_eq!(repo.ttl, 60);
    }

    fn repo_container(conn_count: Arc<AtomicU32>) -> Container {
        Container::builder()
            .type_config(
                "Repo",
                TypeConfig::new()
                    .shared(true)
                    .argument("db", ArgumentSpec::object("DbConnection", true)),
            )
            .factory::<DbConnection, _>("DbConnection", vec![], move |_| {
                Ok(DbConnection {
                    id: conn_count.fetch_add(1, Ordering::SeqCst),
                })
            })
            .factory::<Repo, _>(
                "Repo",
                vec![ParamSpec::value("ttl"), ParamSpec::object("db", "DbConnection")],
                |args| {
                    Ok(Repo {
                        ttl: args.i64("ttl").unwrap_or(0),
                        db: Some(args.object::<DbConnection>("db")?),
                    })
                },
            )
            .build()
    }

    #[test]
    fn scenario_c_distinct_repos_share_one_connection() {
        let count = Arc::new(AtomicU32::new(0));
        let container = repo_container(count.clone());

        let first = container.create_as::<Repo>("Repo", ArgumentSet::new()).unwrap();
        let second = container.create_as::<Repo>("Repo", ArgumentSet::new()).unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(
            first.db.as_ref().unwrap(),
            second.db.as_ref().unwrap()
        ));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn scenario_d_explicit_argument_skips_configured_resolution() {
        let count = Arc::new(AtomicU32::new(0));
        let container = repo_container(count.clone());

        let explicit = Arc::new(DbConnection { id: 99 });
        let args = ArgumentSet::new().with_instance("db", explicit.clone());

        let repo = container.create_as::<Repo>("Repo", args).unwrap();
        assert!(Arc::ptr_eq(repo.db.as_ref().unwrap(), &explicit));
        // The configured DbConnection factory never ran.
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn create_bypasses_cache_even_for_shared_types() {
        let count = Arc::new(AtomicU32::new(0));
        let container = repo_container(count);

        // "Repo" is configured shared=true, yet create always builds fresh.
        let first = container.create("Repo", ArgumentSet::new()).unwrap();
        let second = container.create("Repo", ArgumentSet::new()).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn get_caches_even_unconfigured_types() {
        let container = logger_container();

        let first = container.get("FileLogger").unwrap();
        let second = container.get("FileLogger").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn cached_instance_reused_despite_unshared_spec() {
        // Object spec says shared=false, but the referenced type is
        // already in the cache; the cached instance wins.
        let count = Arc::new(AtomicU32::new(0));
        let container = Container::builder()
            .type_config(
                "Repo",
                TypeConfig::new().argument("db", ArgumentSpec::object("DbConnection", false)),
            )
            .factory::<DbConnection, _>("DbConnection", vec![], {
                let count = count.clone();
                move |_| {
                    Ok(DbConnection {
                        id: count.fetch_add(1, Ordering::SeqCst),
                    })
                }
            })
            .factory::<Repo, _>(
                "Repo",
                vec![ParamSpec::object("db", "DbConnection")],
                |args| {
                    Ok(Repo {
                        ttl: 0,
                        db: Some(args.object::<DbConnection>("db")?),
                    })
                },
            )
            .build();

        let cached = container.get_as::<DbConnection>("DbConnection").unwrap();
        let repo = container.create_as::<Repo>("Repo", ArgumentSet::new()).unwrap();

        assert!(Arc::ptr_eq(repo.db.as_ref().unwrap(), &cached));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn type_hint_resolution_honors_is_shared() {
        // No configured arguments at all; the factory's type hint drives
        // resolution, and FileLogger's shared flag routes it through the
        // cache.
        struct Service {
            logger: Arc<FileLogger>,
        }

        let container = Container::builder()
            .type_config("FileLogger", TypeConfig::new().shared(true))
            .factory::<FileLogger, _>("FileLogger", vec![], |_| Ok(FileLogger))
            .factory::<Service, _>(
                "Service",
                vec![ParamSpec::object("logger", "FileLogger")],
                |args| {
                    Ok(Service {
                        logger: args.object::<FileLogger>("logger")?,
                    })
                },
            )
            .build();

        let first = container.create_as::<Service>("Service", ArgumentSet::new()).unwrap();
        let second = container.create_as::<Service>("Service", ArgumentSet::new()).unwrap();
        assert!(Arc::ptr_eq(&first.logger, &second.logger));

        let shared = container.get_as::<FileLogger>("FileLogger").unwrap();
        assert!(Arc::ptr_eq(&first.logger, &shared));
    }

    #[test]
    fn type_hint_resolution_fresh_when_not_shared() {
        struct Service {
            logger: Arc<FileLogger>,
        }

        let container = Container::builder()
            .factory::<FileLogger, _>("FileLogger", vec![], |_| Ok(FileLogger))
            .factory::<Service, _>(
                "Service",
                vec![ParamSpec::object("logger", "FileLogger")],
                |args| {
                    Ok(Service {
                        logger: args.object::<FileLogger>("logger")?,
                    })
                },
            )
            .build();

        let first = container.create_as::<Service>("Service", ArgumentSet::new()).unwrap();
        let second = container.create_as::<Service>("Service", ArgumentSet::new()).unwrap();
        assert!(!Arc::ptr_eq(&first.logger, &second.logger));
    }

    #[test]
    fn get_normalizes_leading_separators() {
        let container = logger_container();

        let first = container.get(r"\FileLogger").unwrap();
        let second = container.get("FileLogger").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn seeded_shared_instance_is_returned() {
        let container = Container::builder()
            .shared_instance(r"\DbConnection", DbConnection { id: 7 })
            .build();

        let conn = container.get_as::<DbConnection>("DbConnection").unwrap();
        assert_eq!(conn.id, 7);
    }

    #[test]
    fn seeded_instance_feeds_object_arguments() {
        let container = Container::builder()
            .type_config(
                "Repo",
                TypeConfig::new().argument("db", ArgumentSpec::object("DbConnection", false)),
            )
            .factory::<Repo, _>(
                "Repo",
                vec![ParamSpec::object("db", "DbConnection")],
                |args| {
                    Ok(Repo {
                        ttl: 0,
                        db: Some(args.object::<DbConnection>("db")?),
                    })
                },
            )
            .shared_instance("DbConnection", DbConnection { id: 3 })
            .build();

        let repo = container.create_as::<Repo>("Repo", ArgumentSet::new()).unwrap();
        assert_eq!(repo.db.as_ref().unwrap().id, 3);
    }

    #[test]
    fn unresolvable_type_reports_context() {
        let container = Container::builder()
            .type_config(
                "Repo",
                TypeConfig::new().argument("db", ArgumentSpec::object("DbConnection", false)),
            )
            .factory::<Repo, _>("Repo", vec![], |_| Ok(Repo { ttl: 0, db: None }))
            .build();

        let err = container.create("Repo", ArgumentSet::new()).unwrap_err();
        match err {
            ContainerError::UnresolvableType(e) => {
                assert_eq!(e.requested, "DbConnection");
                assert_eq!(e.required_by.as_deref(), Some("Repo"));
            }
            other => panic!("expected UnresolvableType, got: {other:?}"),
        }
    }

    #[test]
    fn unresolvable_type_suggests_similar_names() {
        let container = Container::builder()
            .factory::<FileLogger, _>("FileLogger", vec![], |_| Ok(FileLogger))
            .build();

        let err = container.create("FileLoger", ArgumentSet::new()).unwrap_err();
        match err {
            ContainerError::UnresolvableType(e) => {
                assert_eq!(e.suggestions, vec!["FileLogger".to_string()]);
            }
            other => panic!("expected UnresolvableType, got: {other:?}"),
        }
    }

    #[test]
    fn cyclic_configuration_fails_fast() {
        struct A;
        struct B;

        let container = Container::builder()
            .type_config(
                "A",
                TypeConfig::new().argument("b", ArgumentSpec::object("B", false)),
            )
            .type_config(
                "B",
                TypeConfig::new().argument("a", ArgumentSpec::object("A", false)),
            )
            .factory::<A, _>("A", vec![ParamSpec::object("b", "B")], |_| Ok(A))
            .factory::<B, _>("B", vec![ParamSpec::object("a", "A")], |_| Ok(B))
            .build();

        let err = container.create("A", ArgumentSet::new()).unwrap_err();
        match err {
            ContainerError::CyclicDependency(e) => {
                assert_eq!(e.chain, vec!["A", "B", "A"]);
            }
            other => panic!("expected CyclicDependency, got: {other:?}"),
        }
    }

    #[test]
    fn self_referential_configuration_fails_fast() {
        struct A;

        let container = Container::builder()
            .type_config(
                "A",
                TypeConfig::new().argument("inner", ArgumentSpec::object("A", false)),
            )
            .factory::<A, _>("A", vec![ParamSpec::object("inner", "A")], |_| Ok(A))
            .build();

        let err = container.create("A", ArgumentSet::new()).unwrap_err();
        assert!(matches!(err, ContainerError::CyclicDependency(_)));
    }

    #[test]
    fn invoke_calls_registered_method() {
        struct Greeter {
            prefix: String,
        }

        let container = Container::builder()
            .factory::<Greeter, _>("Greeter", vec![], |_| {
                Ok(Greeter {
                    prefix: "hello".into(),
                })
            })
            .method::<Greeter, String, _>("greet", vec![ParamSpec::value("name")], |g, args| {
                Ok(format!("{} {}", g.prefix, args.str("name")?))
            })
            .build();

        let greeter = container.create("Greeter", ArgumentSet::new()).unwrap();
        let result = container
            .invoke(&greeter, "greet", ArgumentSet::new().with_scalar("name", "world"))
            .unwrap();

        assert_eq!(*result.downcast::<String>().unwrap(), "hello world");
    }

    #[test]
    fn invoke_resolves_type_hinted_parameters() {
        struct Reporter;

        let container = Container::builder()
            .type_config("DbConnection", TypeConfig::new().shared(true))
            .factory::<DbConnection, _>("DbConnection", vec![], |_| Ok(DbConnection { id: 5 }))
            .factory::<Reporter, _>("Reporter", vec![], |_| Ok(Reporter))
            .method::<Reporter, u32, _>(
                "connection_id",
                vec![ParamSpec::object("db", "DbConnection")],
                |_, args| Ok(args.object::<DbConnection>("db")?.id),
            )
            .build();

        let reporter = container.create("Reporter", ArgumentSet::new()).unwrap();
        let result = container
            .invoke(&reporter, "connection_id", ArgumentSet::new())
            .unwrap();
        assert_eq!(*result.downcast::<u32>().unwrap(), 5);

        // The hinted DbConnection went through the shared path.
        let shared = container.get_as::<DbConnection>("DbConnection").unwrap();
        assert_eq!(shared.id, 5);
    }

    #[test]
    fn invoke_explicit_argument_overrides_hint() {
        struct Reporter;

        let count = Arc::new(AtomicU32::new(0));
        let container = Container::builder()
            .factory::<DbConnection, _>("DbConnection", vec![], {
                let count = count.clone();
                move |_| {
                    Ok(DbConnection {
                        id: count.fetch_add(1, Ordering::SeqCst) + 10,
                    })
                }
            })
            .factory::<Reporter, _>("Reporter", vec![], |_| Ok(Reporter))
            .method::<Reporter, u32, _>(
                "connection_id",
                vec![ParamSpec::object("db", "DbConnection")],
                |_, args| Ok(args.object::<DbConnection>("db")?.id),
            )
            .build();

        let reporter = container.create("Reporter", ArgumentSet::new()).unwrap();
        let args = ArgumentSet::new().with_object("db", DbConnection { id: 1 });
        let result = container.invoke(&reporter, "connection_id", args).unwrap();

        assert_eq!(*result.downcast::<u32>().unwrap(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn invoke_missing_method_errors() {
        struct Greeter;

        let container = Container::builder()
            .factory::<Greeter, _>("Greeter", vec![], |_| Ok(Greeter))
            .build();

        let greeter = container.create("Greeter", ArgumentSet::new()).unwrap();
        let err = container
            .invoke(&greeter, "greet", ArgumentSet::new())
            .unwrap_err();

        match err {
            ContainerError::MissingMethod(e) => {
                assert_eq!(e.type_name, "Greeter");
                assert_eq!(e.method, "greet");
            }
            other => panic!("expected MissingMethod, got: {other:?}"),
        }
    }

    #[test]
    fn missing_required_argument_surfaces_at_invocation() {
        let container = Container::builder()
            .factory::<Repo, _>("Repo", vec![ParamSpec::value("ttl")], |args| {
                Ok(Repo {
                    ttl: args.i64("ttl")?,
                    db: None,
                })
            })
            .build();

        let err = container.create("Repo", ArgumentSet::new()).unwrap_err();
        assert!(matches!(err, ContainerError::MissingArgument { .. }));
    }

    #[test]
    fn named_arguments_resolve_against_requested_name() {
        // The virtual type's preset arguments apply even though the
        // factory is looked up under the base type.
        let container = Container::builder()
            .virtual_type(
                "SlowRepo",
                VirtualTypeConfig::new("Repo").argument("ttl", ArgumentSpec::scalar(600)),
            )
            .type_config(
                "Repo",
                TypeConfig::new().argument("ttl", ArgumentSpec::scalar(1)),
            )
            .factory::<Repo, _>("Repo", vec![ParamSpec::value("ttl")], |args| {
                Ok(Repo {
                    ttl: args.i64("ttl")?,
                    db: None,
                })
            })
            .build();

        let via_virtual = container.create_as::<Repo>("SlowRepo", ArgumentSet::new()).unwrap();
        assert_eq!(via_virtual.ttl, 600);

        let direct = container.create_as::<Repo>("Repo", ArgumentSet::new()).unwrap();
        assert_eq!(direct.ttl, 1);
    }

    #[test]
    fn explicit_scalar_overrides_configured_value() {
        let container = Container::builder()
            .type_config(
                "Repo",
                TypeConfig::new().argument("ttl", ArgumentSpec::scalar(60)),
            )
            .factory::<Repo, _>("Repo", vec![ParamSpec::value("ttl")], |args| {
                Ok(Repo {
                    ttl: args.i64("ttl")?,
                    db: None,
                })
            })
            .build();

        let repo = container
            .create_as::<Repo>("Repo", ArgumentSet::new().with_scalar("ttl", 5))
            .unwrap();
        assert_eq!(repo.ttl, 5);
    }

    #[test]
    fn json_snapshot_end_to_end() {
        let json = r#"{
            "preferences": { "Logger": "FileLogger" },
            "virtual_types": {
                "CachedRepo": {
                    "type": "Repo",
                    "arguments": { "ttl": { "kind": "scalar", "value": 60 } }
                }
            },
            "types": {
                "Repo": { "shared": false }
            }
        }"#;
        let config: ContainerConfig = serde_json::from_str(json).unwrap();

        let container = Container::builder()
            .config(config)
            .factory::<FileLogger, _>("FileLogger", vec![], |_| Ok(FileLogger))
            .factory::<Repo, _>("Repo", vec![ParamSpec::value("ttl")], |args| {
                Ok(Repo {
                    ttl: args.i64("ttl")?,
                    db: None,
                })
            })
            .build();

        assert!(container.get("Logger").is_ok());
        let repo = container.create_as::<Repo>("CachedRepo", ArgumentSet::new()).unwrap();
        assert_eq!(repo.ttl, 60);
    }

    #[test]
    fn typed_helper_reports_mismatch() {
        let container = logger_container();
        let err = container.get_as::<DbConnection>("FileLogger").unwrap_err();
        assert!(matches!(err, ContainerError::TypeMismatch { .. }));
    }

    #[test]
    fn is_shared_defaults_to_false() {
        let container = logger_container();
        assert!(!container.is_shared("FileLogger"));
        assert!(!container.is_shared("Unknown"));
    }

    #[test]
    fn concurrent_get_yields_one_instance() {
        let container = Arc::new(
            Container::builder()
                .factory::<DbConnection, _>("DbConnection", vec![], |_| {
                    Ok(DbConnection { id: 1 })
                })
                .build(),
        );

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let container = container.clone();
                std::thread::spawn(move || container.get("DbConnection").unwrap())
            })
            .collect();

        let instances: Vec<Instance> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for instance in &instances[1..] {
            assert!(Arc::ptr_eq(&instances[0], instance));
        }
    }

    #[test]
    fn debug_display() {
        let container = logger_container();
        let debug = format!("{container:?}");
        assert!(debug.contains("Container"));
        assert!(debug.contains("factories"));
    }
}
