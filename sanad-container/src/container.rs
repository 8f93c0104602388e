//! # The Container, heart of Sanad
//!
//! A hierarchical dependency injection container. Each container owns a
//! local table of handlers, falls back to its parent for keys it does not
//! know, and auto-registers functions it can find through its metadata
//! provider when it is the root.
//!
//! # Architecture
//! ```text
//! ContainerBuilder ──build()──> Container (root)
//!                                  │
//!                            create_child()
//!                                  │
//!                                  ▼
//!                              Container ──get()──> local → parent → auto-register
//! ```
//!
//! # Examples
//! ```rust
//! use sanad_container::prelude::*;
//! use std::sync::Arc;
//!
//! struct Database { url: String }
//! struct UserService { db: Arc<Database> }
//!
//! let metadata = MetadataStore::new();
//! let service = metadata.define(
//!     Function::class(|args| Ok(UserService { db: args.get(0)? }))
//!         .inject([DependencyKey::of::<Database>()]),
//! );
//! metadata.transient(service.key(), None);
//!
//! let container = Container::builder().metadata(metadata).build();
//! container
//!     .register_instance(
//!         DependencyKey::of::<Database>(),
//!         Arc::new(Database { url: "postgres://localhost".into() }),
//!     )
//!     .unwrap();
//!
//! let service = container.resolve::<UserService>().unwrap();
//! assert_eq!(service.db.url, "postgres://localhost");
//! ```

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use sanad_support::rendering::suggest_similar;
use tracing::{debug, instrument, trace};

use crate::construction::{
    ConstructionInfo, ConstructionInfoCache, ParameterInfoLocator, compose, new_cache,
};
use crate::error::{NotConstructibleError, Result, SanadError};
use crate::function::{Arguments, Function, Instance, downcast};
use crate::key::DependencyKey;
use crate::metadata::{MetadataProvider, MetadataStore};
use crate::path;
use crate::registry::{Handler, Registry};
use crate::resolver::Dependency;
use crate::settings::ContainerSettings;

// ============================================================
// ContainerBuilder
// ============================================================

/// Builds a root [`Container`].
///
/// # Examples
/// ```rust
/// use sanad_container::prelude::*;
///
/// let container = Container::builder()
///     .metadata(MetadataStore::new())
///     .detect_cycles(false)
///     .build();
/// assert!(container.is_root());
/// assert!(!container.settings().detect_cycles);
/// ```
pub struct ContainerBuilder {
    metadata: Option<Arc<dyn MetadataProvider>>,
    settings: ContainerSettings,
    locator: Option<ParameterInfoLocator>,
}

impl ContainerBuilder {
    fn new() -> Self {
        Self {
            metadata: None,
            settings: ContainerSettings::default(),
            locator: None,
        }
    }

    /// Source of function declarations. Defaults to an empty [`MetadataStore`].
    pub fn metadata(mut self, provider: impl MetadataProvider + 'static) -> Self {
        self.metadata = Some(Arc::new(provider));
        self
    }

    /// Replaces all settings at once, e.g. with values loaded from a file.
    pub fn settings(mut self, settings: ContainerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn share_construction_info(mut self, share: bool) -> Self {
        self.settings.share_construction_info = share;
        self
    }

    pub fn detect_cycles(mut self, detect: bool) -> Self {
        self.settings.detect_cycles = detect;
        self
    }

    pub fn max_suggestions(mut self, max: usize) -> Self {
        self.settings.max_suggestions = max;
        self
    }

    /// Installs a parameter-info locator on the root container.
    pub fn parameter_info_locator<F>(mut self, locator: F) -> Self
    where
        F: Fn(&Function) -> Option<Vec<Dependency>> + Send + Sync + 'static,
    {
        let locator: ParameterInfoLocator = Arc::new(locator);
        self.locator = Some(match self.locator.take() {
            Some(original) => compose(original, locator),
            None => locator,
        });
        self
    }

    pub fn build(self) -> Container {
        debug!(settings = ?self.settings, "Building container");
        let metadata: Arc<dyn MetadataProvider> = match self.metadata {
            Some(metadata) => metadata,
            None => Arc::new(MetadataStore::new()),
        };

        Container {
            inner: Arc::new(ContainerInner {
                registry: RwLock::new(Registry::new()),
                construction_info: new_cache(),
                locator: RwLock::new(self.locator),
                metadata,
                settings: self.settings,
                parent: None,
                root: None,
            }),
        }
    }
}

// ═══════════════════════════════════════════
// Container
// ═══════════════════════════════════════════

/// Thread-safe, hierarchical dependency injection container.
///
/// Cloning is cheap and yields a handle to the same container.
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

struct ContainerInner {
    registry: RwLock<Registry>,
    construction_info: ConstructionInfoCache,
    locator: RwLock<Option<ParameterInfoLocator>>,
    metadata: Arc<dyn MetadataProvider>,
    settings: ContainerSettings,
    parent: Option<Container>,
    /// `None` on the root itself.
    root: Option<Container>,
}

impl Container {
    /// A root container with default settings and an empty metadata store.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    #[inline]
    pub fn parent(&self) -> Option<&Container> {
        self.inner.parent.as_ref()
    }

    /// The top of this container's tree. A root returns itself.
    pub fn root(&self) -> Container {
        self.inner.root.clone().unwrap_or_else(|| self.clone())
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.inner.parent.is_none()
    }

    #[inline]
    pub fn settings(&self) -> &ContainerSettings {
        &self.inner.settings
    }

    #[inline]
    pub fn metadata(&self) -> &dyn MetadataProvider {
        &*self.inner.metadata
    }

    /// Whether two handles point at the same container.
    #[inline]
    pub fn ptr_eq(&self, other: &Container) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn id(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }

    // ── Parameter info ──

    /// Adds an alternate source of parameter keys.
    ///
    /// Locators added later are only asked when every earlier one
    /// answered `None`. Children inherit the chain as it is when they
    /// are created.
    pub fn add_parameter_info_locator<F>(&self, locator: F)
    where
        F: Fn(&Function) -> Option<Vec<Dependency>> + Send + Sync + 'static,
    {
        let locator: ParameterInfoLocator = Arc::new(locator);
        let mut slot = self.inner.locator.write();
        *slot = Some(match slot.take() {
            Some(original) => compose(original, locator),
            None => locator,
        });
    }

    // ── Registration ──

    /// Registers a ready-made instance under `key`.
    pub fn register_instance(&self, key: DependencyKey, instance: Instance) -> Result<()> {
        self.register_handler(key, move |_: &Container| Ok(instance.clone()))
    }

    /// Registers `function` to be invoked on every resolution of `key`.
    pub fn register_transient(&self, key: DependencyKey, function: Function) -> Result<()> {
        self.register_handler(key, move |container: &Container| container.invoke(&function))
    }

    /// Registers `function` to be invoked once, on first resolution of `key`.
    ///
    /// The instance lives in the container holding the handler. The cell is
    /// not locked while the function runs: if two threads race, both build
    /// and the first stored instance is the one every caller gets.
    pub fn register_singleton(&self, key: DependencyKey, function: Function) -> Result<()> {
        let cell: Arc<OnceCell<Instance>> = Arc::new(OnceCell::new());
        self.register_handler(key, move |container: &Container| {
            if let Some(instance) = cell.get() {
                return Ok(instance.clone());
            }
            let instance = container.invoke(&function)?;
            Ok(cell.get_or_init(|| instance).clone())
        })
    }

    /// Registers `function` the way its metadata says, under `key` or the
    /// function's own key. Without declared registration it becomes a
    /// singleton of this container.
    pub fn auto_register(&self, function: &Function, key: Option<DependencyKey>) -> Result<()> {
        let key = key.unwrap_or_else(|| function.key().clone());
        key.ensure_valid("auto_register")?;

        match self.inner.metadata.registration(function) {
            Some(registration) => registration.register(self, key, function),
            None => {
                debug!(key = %key, function = function.name(), "No declared registration, using singleton");
                self.register_singleton(key, function.clone())
            }
        }
    }

    /// [`auto_register`](Self::auto_register) for each function, last to first.
    pub fn auto_register_all(&self, functions: &[Function]) -> Result<()> {
        for function in functions.iter().rev() {
            self.auto_register(function, None)?;
        }
        Ok(())
    }

    /// Appends `handler` to the handlers of `key`.
    pub fn register_handler<F>(&self, key: DependencyKey, handler: F) -> Result<()>
    where
        F: Fn(&Container) -> Result<Instance> + Send + Sync + 'static,
    {
        key.ensure_valid("register_handler")?;
        let handler: Handler = Arc::new(handler);
        self.inner.registry.write().push(key, handler);
        Ok(())
    }

    /// Removes every local handler of `key`. Parents are not touched.
    pub fn unregister(&self, key: &DependencyKey) -> Result<()> {
        key.ensure_valid("unregister")?;
        self.inner.registry.write().remove(key);
        Ok(())
    }

    // ── Resolution ──

    /// Resolves a key or a resolver.
    ///
    /// Lookup order for a key: this container's own handle for the
    /// `Container` key, the first local handler, the parent, and finally
    /// auto-registration through the metadata provider (root only).
    pub fn get(&self, key: impl Into<Dependency>) -> Result<Instance> {
        let dependency: Dependency = key.into();
        match dependency {
            Dependency::Key(key) => self.get_key(&key),
            Dependency::Resolver(resolver) => resolver.get(self),
        }
    }

    fn get_key(&self, key: &DependencyKey) -> Result<Instance> {
        key.ensure_valid("get")?;

        if key.is::<Container>() {
            return Ok(Arc::new(self.clone()));
        }

        let local = self.inner.registry.read().primary(key);
        if let Some(handler) = local {
            return handler(self);
        }

        if let Some(parent) = &self.inner.parent {
            trace!(key = %key, "Delegating to parent");
            return parent.get_key(key);
        }

        self.auto_resolve(key)
    }

    fn auto_resolve(&self, key: &DependencyKey) -> Result<Instance> {
        let function = self
            .inner
            .metadata
            .function(key)
            .ok_or_else(|| self.not_constructible(key))?;

        debug!(key = %key, function = function.name(), "Auto-registering");
        self.auto_register(&function, Some(key.clone()))?;

        let registered = self.inner.registry.read().primary(key);
        match registered {
            Some(handler) => handler(self),
            None => Err(SanadError::RegistrationMissing { key: key.clone() }),
        }
    }

    fn not_constructible(&self, key: &DependencyKey) -> SanadError {
        let mut known: Vec<String> = self
            .inner
            .metadata
            .known_keys()
            .iter()
            .chain(self.inner.registry.read().keys().iter())
            .map(DependencyKey::display_name)
            .collect();
        known.sort();
        known.dedup();

        let candidates: Vec<&str> = known.iter().map(String::as_str).collect();
        let suggestions = suggest_similar(
            &key.display_name(),
            &candidates,
            self.inner.settings.max_suggestions,
        )
        .into_iter()
        .map(str::to_string)
        .collect();

        SanadError::NotConstructible(NotConstructibleError {
            requested: key.clone(),
            suggestions,
        })
    }

    /// Resolves every handler of `key`, in registration order.
    ///
    /// Only the nearest container with an entry is used. No entry anywhere
    /// gives an empty list; nothing is auto-registered.
    pub fn get_all(&self, key: &DependencyKey) -> Result<Vec<Instance>> {
        key.ensure_valid("get_all")?;

        let handlers = self.inner.registry.read().all(key);
        match handlers {
            Some(handlers) => handlers.iter().map(|handler| handler(self)).collect(),
            None => match &self.inner.parent {
                Some(parent) => parent.get_all(key),
                None => Ok(Vec::new()),
            },
        }
    }

    pub fn has_handler(&self, key: &DependencyKey, check_parent: bool) -> Result<bool> {
        key.ensure_valid("has_handler")?;

        if self.inner.registry.read().contains(key) {
            return Ok(true);
        }
        match &self.inner.parent {
            Some(parent) if check_parent => parent.has_handler(key, true),
            _ => Ok(false),
        }
    }

    /// Creates a child with an empty table whose lookups fall back to `self`.
    ///
    /// The child inherits metadata, settings and the current locator chain.
    /// It shares this container's construction-info cache unless
    /// [`ContainerSettings::share_construction_info`] is off.
    pub fn create_child(&self) -> Container {
        let construction_info = if self.inner.settings.share_construction_info {
            self.inner.construction_info.clone()
        } else {
            new_cache()
        };

        let child = Container {
            inner: Arc::new(ContainerInner {
                registry: RwLock::new(Registry::new()),
                construction_info,
                locator: RwLock::new(self.inner.locator.read().clone()),
                metadata: self.inner.metadata.clone(),
                settings: self.inner.settings.clone(),
                parent: Some(self.clone()),
                root: Some(self.root()),
            }),
        };

        debug!(
            shared_cache = self.inner.settings.share_construction_info,
            "Created child container"
        );
        child
    }

    // ── Invocation ──

    /// Resolves the dependencies of `function` and runs its activator.
    ///
    /// Any failure is wrapped into [`SanadError::Invocation`] naming the
    /// function, unless it already is one.
    #[instrument(level = "trace", skip_all, fields(function = function.name()))]
    pub fn invoke(&self, function: &Function) -> Result<Instance> {
        self.try_invoke(function)
            .map_err(|err| SanadError::invocation(function.name(), err))
    }

    fn try_invoke(&self, function: &Function) -> Result<Instance> {
        let _guard = if self.inner.settings.detect_cycles {
            Some(path::enter(self.id(), function)?)
        } else {
            None
        };

        let info = self.construction_info(function);
        let values = info
            .keys()
            .iter()
            .map(|dependency| self.get(dependency))
            .collect::<Result<Vec<_>>>()?;

        info.activator()
            .invoke(function, Arguments::new(function.name(), values))
    }

    /// The cached construction info of `function`, computed on first use.
    pub fn construction_info(&self, function: &Function) -> Arc<ConstructionInfo> {
        let cached = self.inner.construction_info.read().get(&function.id()).cloned();
        if let Some(info) = cached {
            return info;
        }

        let locator = self.inner.locator.read().clone();
        let info = Arc::new(ConstructionInfo::derive(
            function,
            self.metadata(),
            locator.as_ref(),
        ));

        self.inner
            .construction_info
            .write()
            .entry(function.id())
            .or_insert(info)
            .clone()
    }

    // ── Typed access ──

    /// Resolves the plain key of `T` and downcasts.
    pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        self.resolve_key(&DependencyKey::of::<T>())
    }

    /// Resolves `key` and downcasts to `T`.
    pub fn resolve_key<T: Send + Sync + 'static>(&self, key: &DependencyKey) -> Result<Arc<T>> {
        let instance = self.get(key)?;
        downcast(instance, || key.to_string())
    }

    /// Resolves every handler of `T`'s plain key and downcasts each.
    pub fn resolve_all<T: Send + Sync + 'static>(&self) -> Result<Vec<Arc<T>>> {
        let key = DependencyKey::of::<T>();
        self.get_all(&key)?
            .into_iter()
            .map(|instance| downcast(instance, || key.to_string()))
            .collect()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("registered", &self.inner.registry.read().len())
            .field("root", &self.is_root())
            .field("locator", &self.inner.locator.read().is_some())
            .finish()
    }
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::{Container, ContainerBuilder};
    pub use crate::activator::Activator;
    pub use crate::error::{Result, SanadError};
    pub use crate::function::{Arguments, Function, Injectable, Instance};
    pub use crate::key::DependencyKey;
    pub use crate::metadata::{MetadataProvider, MetadataStore};
    pub use crate::registration::{Registration, SingletonRegistration, TransientRegistration};
    pub use crate::resolver::{All, Dependency, Lazy, LazyInstance, Optional, Parent, Resolver};
    pub use crate::settings::ContainerSettings;
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use crate::activator::Activator;
    use crate::registration::SingletonRegistration;
    use crate::resolver::{Lazy, Optional, Resolver};

    #[derive(Debug)]
    struct Config(u32);
    #[derive(Debug)]
    struct Database {
        config: Arc<Config>,
    }
    #[derive(Debug)]
    struct Repository {
        db: Arc<Database>,
    }

    fn counted(counter: &Arc<AtomicU32>) -> Function {
        let counter = counter.clone();
        Function::class(move |_| Ok(Config(counter.fetch_add(1, Ordering::SeqCst))))
    }

    fn database_fn() -> Function {
        Function::class(|args| Ok(Database { config: args.get(0)? }))
            .inject([DependencyKey::of::<Config>()])
    }

    #[test]
    fn handler_result_is_returned() {
        let container = Container::new();
        let key = DependencyKey::token("answer");
        container
            .register_handler(key.clone(), |_| Ok(Arc::new(42u32) as Instance))
            .unwrap();

        assert_eq!(*container.resolve_key::<u32>(&key).unwrap(), 42);
    }

    #[test]
    fn instance_keeps_identity() {
        let container = Container::new();
        let config = Arc::new(Config(1));
        container
            .register_instance(DependencyKey::of::<Config>(), config.clone())
            .unwrap();

        let a = container.resolve::<Config>().unwrap();
        assert!(Arc::ptr_eq(&a, &config));
    }

    #[test]
    fn transient_builds_every_time() {
        let counter = Arc::new(AtomicU32::new(0));
        let container = Container::new();
        container
            .register_transient(DependencyKey::of::<Config>(), counted(&counter))
            .unwrap();

        let a = container.resolve::<Config>().unwrap();
        let b = container.resolve::<Config>().unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn singleton_builds_once() {
        let counter = Arc::new(AtomicU32::new(0));
        let container = Container::new();
        container
            .register_singleton(DependencyKey::of::<Config>(), counted(&counter))
            .unwrap();

        let a = container.resolve::<Config>().unwrap();
        let b = container.resolve::<Config>().unwrap();
        let c = container.resolve::<Config>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&b, &c));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn singleton_is_shared_across_threads() {
        let counter = Arc::new(AtomicU32::new(0));
        let container = Container::new();
        container
            .register_singleton(DependencyKey::of::<Config>(), counted(&counter))
            .unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let container = container.clone();
                std::thread::spawn(move || container.resolve::<Config>().unwrap())
            })
            .collect();
        let resolved: Vec<Arc<Config>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        for value in &resolved {
            assert!(Arc::ptr_eq(value, &resolved[0]));
        }
    }

    #[test]
    fn dependencies_are_resolved_in_order() {
        let container = Container::new();
        container
            .register_instance(DependencyKey::of::<Config>(), Arc::new(Config(5)))
            .unwrap();
        container
            .register_transient(DependencyKey::of::<Database>(), database_fn())
            .unwrap();

        let db = container.resolve::<Database>().unwrap();
        assert_eq!(db.config.0, 5);
    }

    #[test]
    fn first_handler_wins_and_get_all_keeps_order() {
        let container = Container::new();
        let key = DependencyKey::token("plugins");
        for n in 1..=3u32 {
            container.register_instance(key.clone(), Arc::new(n)).unwrap();
        }

        assert_eq!(*container.resolve_key::<u32>(&key).unwrap(), 1);
        let all: Vec<u32> = container
            .get_all(&key)
            .unwrap()
            .into_iter()
            .map(|v| *v.downcast::<u32>().unwrap())
            .collect();
        assert_eq!(all, vec![1, 2, 3]);
    }

    #[test]
    fn get_all_without_entry_is_empty_and_does_not_register() {
        let metadata = MetadataStore::new();
        metadata.define(Function::class(|_| Ok(Config(0))));
        let container = Container::builder().metadata(metadata).build();

        assert!(container.resolve_all::<Config>().unwrap().is_empty());
        assert!(!container.has_handler(&DependencyKey::of::<Config>(), true).unwrap());
    }

    #[test]
    fn get_all_uses_parent_entry() {
        let root = Container::new();
        root.register_instance(DependencyKey::of::<Config>(), Arc::new(Config(1)))
            .unwrap();
        let child = root.create_child();

        assert_eq!(child.resolve_all::<Config>().unwrap().len(), 1);
    }

    #[test]
    fn container_key_returns_itself() {
        let root = Container::new();
        let child = root.create_child();

        let resolved = child.resolve::<Container>().unwrap();
        assert!(resolved.ptr_eq(&child));
        assert!(!resolved.ptr_eq(&root));
    }

    #[test]
    fn child_falls_back_to_parent() {
        let root = Container::new();
        let config = Arc::new(Config(3));
        root.register_instance(DependencyKey::of::<Config>(), config.clone())
            .unwrap();

        let grandchild = root.create_child().create_child();
        let found = grandchild.resolve::<Config>().unwrap();
        assert!(Arc::ptr_eq(&found, &config));
        assert!(grandchild.root().ptr_eq(&root));
        assert!(grandchild.parent().unwrap().parent().unwrap().ptr_eq(&root));
    }

    #[test]
    fn child_registration_shadows_parent() {
        let root = Container::new();
        root.register_instance(DependencyKey::of::<Config>(), Arc::new(Config(1)))
            .unwrap();
        let child = root.create_child();
        child
            .register_instance(DependencyKey::of::<Config>(), Arc::new(Config(2)))
            .unwrap();

        assert_eq!(child.resolve::<Config>().unwrap().0, 2);
        assert_eq!(root.resolve::<Config>().unwrap().0, 1);
    }

    #[test]
    fn has_handler_check_parent() {
        let root = Container::new();
        let key = DependencyKey::of::<Config>();
        root.register_instance(key.clone(), Arc::new(Config(1))).unwrap();
        let child = root.create_child();

        assert!(!child.has_handler(&key, false).unwrap());
        assert!(child.has_handler(&key, true).unwrap());
        assert!(root.has_handler(&key, false).unwrap());
    }

    #[test]
    fn unregister_removes_local_entry_only() {
        let root = Container::new();
        let key = DependencyKey::of::<Config>();
        root.register_instance(key.clone(), Arc::new(Config(1))).unwrap();
        let child = root.create_child();
        child.register_instance(key.clone(), Arc::new(Config(2))).unwrap();
        child.register_instance(key.clone(), Arc::new(Config(3))).unwrap();

        child.unregister(&key).unwrap();
        assert!(!child.has_handler(&key, false).unwrap());
        assert_eq!(child.resolve::<Config>().unwrap().0, 1);

        // Unknown keys are a no-op.
        child.unregister(&DependencyKey::token("nothing")).unwrap();
    }

    #[test]
    fn invalid_keys_are_rejected_everywhere() {
        let container = Container::new();
        let bad = DependencyKey::token("");

        let checks: Vec<(&str, SanadError)> = vec![
            ("get", container.get(&bad).unwrap_err()),
            ("get_all", container.get_all(&bad).unwrap_err()),
            ("has_handler", container.has_handler(&bad, true).unwrap_err()),
            ("unregister", container.unregister(&bad).unwrap_err()),
            (
                "register_handler",
                container
                    .register_instance(bad.clone(), Arc::new(Config(0)))
                    .unwrap_err(),
            ),
            (
                "auto_register",
                container
                    .auto_register(&Function::class(|_| Ok(Config(0))), Some(bad.clone()))
                    .unwrap_err(),
            ),
        ];

        for (expected, err) in checks {
            match err {
                SanadError::InvalidKey { operation } => assert_eq!(operation, expected),
                other => panic!("Expected InvalidKey, got: {other:?}"),
            }
        }
        assert!(container.get(&DependencyKey::named::<Config>("")).is_err());
    }

    #[test]
    fn unknown_key_is_not_constructible_with_suggestions() {
        struct Configuration;

        let metadata = MetadataStore::new();
        metadata.define(Function::class(|_| Ok(Configuration)));
        let container = Container::builder().metadata(metadata).build();

        match container.resolve::<Config>() {
            Err(SanadError::NotConstructible(e)) => {
                assert!(e.requested.is::<Config>());
                assert_eq!(e.suggestions, vec!["Configuration".to_string()]);
            }
            other => panic!("Expected NotConstructible, got: {other:?}"),
        }
    }

    #[test]
    fn suggestions_can_be_turned_off() {
        struct Configuration;

        let metadata = MetadataStore::new();
        metadata.define(Function::class(|_| Ok(Configuration)));
        let container = Container::builder()
            .metadata(metadata)
            .max_suggestions(0)
            .build();

        match container.resolve::<Config>() {
            Err(SanadError::NotConstructible(e)) => assert!(e.suggestions.is_empty()),
            other => panic!("Expected NotConstructible, got: {other:?}"),
        }
    }

    #[test]
    fn auto_registration_defaults_to_root_singleton() {
        let counter = Arc::new(AtomicU32::new(0));
        let metadata = MetadataStore::new();
        metadata.define(counted(&counter));

        let root = Container::builder().metadata(metadata).build();
        let left = root.create_child();
        let right = root.create_child();

        let a = left.resolve::<Config>().unwrap();
        let b = right.resolve::<Config>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(root.has_handler(&DependencyKey::of::<Config>(), false).unwrap());
        assert!(!left.has_handler(&DependencyKey::of::<Config>(), false).unwrap());
    }

    #[test]
    fn auto_registration_follows_declared_transient() {
        let counter = Arc::new(AtomicU32::new(0));
        let metadata = MetadataStore::new();
        let config = metadata.define(counted(&counter));
        metadata.transient(config.key(), None);

        let container = Container::builder().metadata(metadata).build();
        let a = container.resolve::<Config>().unwrap();
        let b = container.resolve::<Config>().unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn auto_registration_under_other_key_is_reported() {
        let metadata = MetadataStore::new();
        let config = metadata.define(Function::class(|_| Ok(Config(0))));
        metadata.transient(config.key(), Some(DependencyKey::token("elsewhere")));

        let container = Container::builder().metadata(metadata).build();
        match container.resolve::<Config>() {
            Err(SanadError::RegistrationMissing { key }) => assert!(key.is::<Config>()),
            other => panic!("Expected RegistrationMissing, got: {other:?}"),
        }
        assert!(container.has_handler(&DependencyKey::token("elsewhere"), false).unwrap());
    }

    #[test]
    fn declared_singleton_in_child_stays_in_child() {
        let metadata = MetadataStore::new();
        let config = metadata.define(Function::class(|_| Ok(Config(0))));
        metadata.singleton(config.key(), true);

        let root = Container::builder().metadata(metadata).build();
        let child = root.create_child();
        child.auto_register(&config, None).unwrap();

        assert!(child.has_handler(config.key(), false).unwrap());
        assert!(!root.has_handler(config.key(), false).unwrap());
    }

    #[test]
    fn auto_register_all_installs_every_function() {
        let container = Container::new();
        container
            .auto_register_all(&[Function::class(|_| Ok(Config(1))), database_fn()])
            .unwrap();

        assert!(container.has_handler(&DependencyKey::of::<Config>(), false).unwrap());
        assert!(container.has_handler(&DependencyKey::of::<Database>(), false).unwrap());
        assert_eq!(container.resolve::<Database>().unwrap().config.0, 1);
    }

    #[test]
    fn explicit_singleton_registration_object() {
        let root = Container::new();
        let child = root.create_child();
        SingletonRegistration::new()
            .register(&child, DependencyKey::of::<Config>(), &Function::class(|_| Ok(Config(4))))
            .unwrap();

        assert_eq!(child.resolve::<Config>().unwrap().0, 4);
        assert!(root.has_handler(&DependencyKey::of::<Config>(), false).unwrap());
    }

    #[test]
    fn invocation_errors_are_wrapped_once() {
        let container = Container::new();
        container
            .register_transient(DependencyKey::of::<Database>(), database_fn())
            .unwrap();
        container
            .register_transient(
                DependencyKey::of::<Repository>(),
                Function::class(|args| Ok(Repository { db: args.get(0)? }))
                    .inject([DependencyKey::of::<Database>()]),
            )
            .unwrap();

        let err = container.resolve::<Repository>().unwrap_err();
        match &err {
            SanadError::Invocation { function, .. } => assert_eq!(function, "Database"),
            other => panic!("Expected Invocation, got: {other:?}"),
        }
        assert!(matches!(err.root_cause(), SanadError::NotConstructible(_)));
        assert!(err.to_string().starts_with("Error instantiating Database."));
    }

    #[test]
    fn constructor_errors_are_wrapped() {
        let container = Container::new();
        container
            .register_transient(
                DependencyKey::of::<Config>(),
                Function::class(|_| -> Result<Config> {
                    Err(SanadError::construction(DependencyKey::of::<Config>(), "missing file"))
                }),
            )
            .unwrap();

        let err = container.resolve::<Config>().unwrap_err();
        assert!(err.is_invocation());
        assert!(matches!(err.root_cause(), SanadError::ConstructionFailed { .. }));
        assert!(err.to_string().contains("missing file"));
    }

    #[test]
    fn factory_activator_from_metadata() {
        let shared = Arc::new(Config(11));
        let metadata = MetadataStore::new();
        let key = DependencyKey::token("config");
        let factory = metadata.define(Function::factory(key.clone(), {
            let shared = shared.clone();
            move |_| Ok(shared.clone())
        }));
        metadata.factory(factory.key()).transient(factory.key(), None);

        let container = Container::builder().metadata(metadata).build();
        let a = container.resolve_key::<Config>(&key).unwrap();
        assert!(Arc::ptr_eq(&a, &shared));
        assert_eq!(
            container.construction_info(&factory).activator(),
            Activator::Factory
        );
    }

    #[test]
    fn circular_dependency_is_detected() {
        #[derive(Debug)]
        struct A;
        struct B;

        let metadata = MetadataStore::new();
        metadata.define(Function::class(|_| Ok(A)).inject([DependencyKey::of::<B>()]));
        metadata.define(Function::class(|_| Ok(B)).inject([DependencyKey::of::<A>()]));
        let container = Container::builder().metadata(metadata).build();

        let err = container.resolve::<A>().unwrap_err();
        match err.root_cause() {
            SanadError::CircularDependency(e) => {
                let names: Vec<String> = e.chain.iter().map(DependencyKey::display_name).collect();
                assert_eq!(names, vec!["A", "B", "A"]);
            }
            other => panic!("Expected CircularDependency, got: {other:?}"),
        }
        assert_eq!(path::depth(), 0);
    }

    #[test]
    fn wrapping_another_instance_of_the_same_type_is_not_a_cycle() {
        #[derive(Debug)]
        struct Log {
            inner: Option<Arc<Log>>,
        }

        let container = Container::new();
        let outer = DependencyKey::token("outer");
        let inner = DependencyKey::token("inner");
        container
            .register_transient(
                outer.clone(),
                Function::class(|args| Ok(Log { inner: Some(args.get(0)?) })).inject([inner.clone()]),
            )
            .unwrap();
        container
            .register_transient(inner.clone(), Function::class(|_| Ok(Log { inner: None })))
            .unwrap();

        let log = container.resolve_key::<Log>(&outer).unwrap();
        assert!(log.inner.as_ref().is_some_and(|wrapped| wrapped.inner.is_none()));
        assert_eq!(path::depth(), 0);
    }

    #[test]
    fn lazy_breaks_a_cycle() {
        use crate::resolver::LazyInstance;

        struct A {
            b: Arc<LazyInstance>,
        }
        struct B {
            a: Arc<A>,
        }

        let metadata = MetadataStore::new();
        metadata.define(
            Function::class(|args| Ok(A { b: args.lazy(0)? }))
                .inject([Lazy::of(DependencyKey::of::<B>())]),
        );
        metadata.define(
            Function::class(|args| Ok(B { a: args.get(0)? })).inject([DependencyKey::of::<A>()]),
        );
        let container = Container::builder().metadata(metadata).build();

        let a = container.resolve::<A>().unwrap();
        let b = a.b.resolve::<B>().unwrap();
        assert!(Arc::ptr_eq(&b.a, &a));
    }

    #[test]
    fn resolvers_as_dependencies() {
        struct Report {
            config: Option<Arc<Config>>,
            plugins: Vec<Arc<u32>>,
        }

        let container = Container::new();
        let plugins = DependencyKey::token("plugins");
        container.register_instance(plugins.clone(), Arc::new(1u32)).unwrap();
        container.register_instance(plugins.clone(), Arc::new(2u32)).unwrap();
        container
            .register_transient(
                DependencyKey::of::<Report>(),
                Function::class(|args| {
                    Ok(Report {
                        config: args.optional(0)?,
                        plugins: args.all(1)?,
                    })
                })
                .inject([
                    Optional::of(DependencyKey::of::<Config>(), true),
                    Resolver::all(plugins.clone()),
                ]),
            )
            .unwrap();

        let report = container.resolve::<Report>().unwrap();
        assert!(report.config.is_none());
        assert_eq!(report.plugins.len(), 2);
    }

    #[test]
    fn construction_info_is_cached() {
        let calls = Arc::new(AtomicU32::new(0));
        let container = Container::new();
        let function = Function::class(|_| Ok(Config(0))).inject_with({
            let calls = calls.clone();
            move || {
                calls.fetch_add(1, Ordering::SeqCst);
                Vec::new()
            }
        });
        container
            .register_transient(DependencyKey::of::<Config>(), function.clone())
            .unwrap();

        container.resolve::<Config>().unwrap();
        container.resolve::<Config>().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(
            &container.construction_info(&function),
            &container.construction_info(&function)
        ));
    }

    #[test]
    fn functions_sharing_a_key_keep_their_own_construction_info() {
        let container = Container::new();
        let primary = Function::class(|args| Ok(Config(*args.get::<u32>(0)?)))
            .inject([DependencyKey::token("primary_port")]);
        let replica = Function::class(|args| Ok(Config(*args.get::<u32>(0)?)))
            .inject([DependencyKey::token("replica_port")]);
        assert_eq!(primary.key(), replica.key());

        container
            .register_instance(DependencyKey::token("primary_port"), Arc::new(5432u32))
            .unwrap();
        container
            .register_instance(DependencyKey::token("replica_port"), Arc::new(5433u32))
            .unwrap();
        container
            .register_transient(DependencyKey::token("primary"), primary.clone())
            .unwrap();
        container
            .register_transient(DependencyKey::token("replica"), replica.clone())
            .unwrap();

        let a = container.resolve_key::<Config>(&DependencyKey::token("primary")).unwrap();
        let b = container.resolve_key::<Config>(&DependencyKey::token("replica")).unwrap();
        assert_eq!((a.0, b.0), (5432, 5433));
        assert!(!Arc::ptr_eq(
            &container.construction_info(&primary),
            &container.construction_info(&replica)
        ));
    }

    #[test]
    fn construction_info_shared_with_children_by_default() {
        let root = Container::new();
        let function = database_fn();
        let from_root = root.construction_info(&function);

        let child = root.create_child();
        child.add_parameter_info_locator(|_: &Function| Some(vec![]));
        assert!(Arc::ptr_eq(&child.construction_info(&function), &from_root));
    }

    #[test]
    fn construction_info_isolated_when_not_shared() {
        let root = Container::builder().share_construction_info(false).build();
        let plain = Function::class(|_| Ok(Config(0)));
        let from_root = root.construction_info(&plain);

        let child = root.create_child();
        child.add_parameter_info_locator(|_: &Function| {
            Some(vec![DependencyKey::token("located").into()])
        });

        let from_child = child.construction_info(&plain);
        assert!(!Arc::ptr_eq(&from_child, &from_root));
        assert!(from_root.keys().is_empty());
        assert_eq!(from_child.keys().len(), 1);
    }

    #[test]
    fn locators_compose_first_answer_wins() {
        let container = Container::new();
        container.add_parameter_info_locator(|_: &Function| None);
        container.add_parameter_info_locator(|_: &Function| {
            Some(vec![DependencyKey::token("second").into()])
        });
        container.add_parameter_info_locator(|_: &Function| {
            Some(vec![DependencyKey::token("third").into()])
        });

        let info = container.construction_info(&Function::class(|_| Ok(Config(0))));
        assert_eq!(
            info.keys(),
            &[Dependency::Key(DependencyKey::token("second"))]
        );
    }

    #[test]
    fn children_inherit_locator_chain() {
        let root = Container::builder()
            .share_construction_info(false)
            .parameter_info_locator(|_: &Function| Some(vec![DependencyKey::token("root").into()]))
            .build();
        let child = root.create_child();

        let info = child.construction_info(&Function::class(|_| Ok(Config(0))));
        assert_eq!(info.keys(), &[Dependency::Key(DependencyKey::token("root"))]);
    }

    #[test]
    fn cycle_detection_can_be_disabled() {
        let container = Container::builder().detect_cycles(false).build();
        container
            .register_transient(DependencyKey::of::<Config>(), Function::class(|_| Ok(Config(0))))
            .unwrap();

        assert!(container.resolve::<Config>().is_ok());
        assert_eq!(path::depth(), 0);
    }

    #[test]
    fn type_mismatch_names_the_key() {
        let container = Container::new();
        container
            .register_instance(DependencyKey::token("port"), Arc::new(8080u16))
            .unwrap();

        match container.resolve_key::<String>(&DependencyKey::token("port")) {
            Err(SanadError::TypeMismatch { target, .. }) => assert_eq!(target, "token \"port\""),
            other => panic!("Expected TypeMismatch, got: {other:?}"),
        }
    }

    #[test]
    fn container_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Container>();
    }

    #[test]
    fn debug_display() {
        let container = Container::new();
        container
            .register_instance(DependencyKey::of::<Config>(), Arc::new(Config(0)))
            .unwrap();

        let debug = format!("{container:?}");
        assert!(debug.contains("Container"));
        assert!(debug.contains("registered: 1"));
    }
}
