//! Metadata: what the container knows about a function without calling it.
//!
//! The container never inspects functions itself. It asks a
//! [`MetadataProvider`] for the function behind a key, its declared
//! parameter keys, its registration strategy and its activator.
//!
//! [`MetadataStore`] is the default provider: an explicit, concurrent
//! table filled in at registration time.
//!
//! # Examples
//! ```
//! use sanad_container::prelude::*;
//! use std::sync::Arc;
//!
//! struct Clock;
//!
//! let metadata = MetadataStore::new();
//! let clock = metadata.define(Function::class(|_| Ok(Clock)));
//! metadata.transient(clock.key(), None);
//!
//! let container = Container::builder().metadata(metadata).build();
//! let a = container.resolve::<Clock>().unwrap();
//! let b = container.resolve::<Clock>().unwrap();
//! assert!(!Arc::ptr_eq(&a, &b));
//! ```

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::activator::Activator;
use crate::function::{Function, Inject, Injectable};
use crate::key::DependencyKey;
use crate::registration::{Registration, SingletonRegistration, TransientRegistration};
use crate::resolver::Dependency;

/// Source of per-function declarations. Read-only from the container.
pub trait MetadataProvider: Send + Sync {
    /// The function standing behind `key`, used for auto-registration.
    fn function(&self, key: &DependencyKey) -> Option<Function>;

    /// Declared constructor parameter keys, in order.
    fn parameter_keys(&self, function: &Function) -> Option<Vec<Dependency>>;

    /// Declared registration strategy.
    fn registration(&self, function: &Function) -> Option<Registration>;

    /// Declared activator.
    fn activator(&self, function: &Function) -> Option<Activator>;

    /// Keys this provider knows functions for. Used for suggestions.
    fn known_keys(&self) -> Vec<DependencyKey> {
        Vec::new()
    }
}

#[derive(Debug, Clone, Default)]
struct TypeMetadata {
    function: Option<Function>,
    param_types: Option<Arc<[Dependency]>>,
    registration: Option<Registration>,
    activator: Option<Activator>,
}

/// Default [`MetadataProvider`], keyed by function key.
///
/// Cloning is cheap and clones share the same table, so one store can
/// be handed to several containers and still be written to afterwards.
#[derive(Debug, Clone, Default)]
pub struct MetadataStore {
    entries: Arc<DashMap<DependencyKey, TypeMetadata>>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn update(&self, key: &DependencyKey, apply: impl FnOnce(&mut TypeMetadata)) {
        let mut entry = self.entries.entry(key.clone()).or_default();
        apply(entry.value_mut());
    }

    /// Makes `function` the function behind its key. Returns it back.
    pub fn define(&self, function: Function) -> Function {
        debug!(key = %function.key(), "Defined function");
        self.update(function.key(), |meta| meta.function = Some(function.clone()));
        function
    }

    /// Declares an [`Injectable`] type: its function plus parameter types.
    pub fn declare<T: Injectable>(&self) -> Function {
        let function = self.define(Function::class::<T, _>(T::construct));
        self.param_types(function.key(), T::dependencies());
        function
    }

    /// Declares constructor parameter keys for `key`.
    pub fn param_types<I>(&self, key: &DependencyKey, dependencies: I) -> &Self
    where
        I: IntoIterator,
        I::Item: Into<Dependency>,
    {
        let keys: Arc<[Dependency]> = dependencies.into_iter().map(Into::into).collect();
        self.update(key, |meta| meta.param_types = Some(keys));
        self
    }

    /// Declares the registration strategy for `key`.
    pub fn set_registration(&self, key: &DependencyKey, registration: impl Into<Registration>) -> &Self {
        let registration = registration.into();
        self.update(key, |meta| meta.registration = Some(registration));
        self
    }

    /// Declares transient registration, optionally under another key.
    pub fn transient(&self, key: &DependencyKey, as_key: Option<DependencyKey>) -> &Self {
        let strategy = match as_key {
            Some(as_key) => TransientRegistration::keyed(as_key),
            None => TransientRegistration::new(),
        };
        self.set_registration(key, strategy)
    }

    /// Declares singleton registration; accepts a `bool`, a key or both.
    pub fn singleton(&self, key: &DependencyKey, strategy: impl Into<SingletonRegistration>) -> &Self {
        self.set_registration(key, strategy.into())
    }

    pub fn instance_activator(&self, key: &DependencyKey, activator: Activator) -> &Self {
        self.update(key, |meta| meta.activator = Some(activator));
        self
    }

    /// Declares that `key`'s function is a plain factory call.
    pub fn factory(&self, key: &DependencyKey) -> &Self {
        self.instance_activator(key, Activator::Factory)
    }

    /// Copies declared parameter types onto the function's explicit
    /// `inject` list (empty when none are declared).
    pub fn autoinject(&self, function: &Function) -> &Self {
        let keys = self
            .entries
            .get(function.key())
            .and_then(|meta| meta.param_types.clone())
            .unwrap_or_else(|| Arc::from(Vec::new()));
        function.set_inject(Inject::List(keys));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MetadataProvider for MetadataStore {
    fn function(&self, key: &DependencyKey) -> Option<Function> {
        self.entries.get(key).and_then(|meta| meta.function.clone())
    }

    fn parameter_keys(&self, function: &Function) -> Option<Vec<Dependency>> {
        self.entries
            .get(function.key())
            .and_then(|meta| meta.param_types.as_ref().map(|keys| keys.to_vec()))
    }

    fn registration(&self, function: &Function) -> Option<Registration> {
        self.entries
            .get(function.key())
            .and_then(|meta| meta.registration.clone())
    }

    fn activator(&self, function: &Function) -> Option<Activator> {
        self.entries.get(function.key()).and_then(|meta| meta.activator)
    }

    fn known_keys(&self) -> Vec<DependencyKey> {
        self.entries
            .iter()
            .filter(|entry| entry.value().function.is_some())
            .map(|entry| entry.key().clone())
            .collect()
    }
}
