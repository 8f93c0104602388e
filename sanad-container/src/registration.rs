//! Registration strategies declared on a function.
//!
//! When the container auto-registers a function it asks the metadata
//! provider for one of these; without one it falls back to a singleton
//! in the registering container.
//!
//! - [`Registration::Transient`]: new instance on every resolve
//! - [`Registration::Singleton`]: one instance, kept in the root
//!   container (or in the registering container when `register_in_child`)

use std::fmt;

use tracing::debug;

use crate::container::Container;
use crate::error::Result;
use crate::function::Function;
use crate::key::DependencyKey;

/// How a function installs itself into a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Transient(TransientRegistration),
    Singleton(SingletonRegistration),
}

impl Registration {
    /// Plain transient registration under the requested key.
    pub fn transient() -> Self {
        Registration::Transient(TransientRegistration::new())
    }

    /// Plain singleton registration in the root container.
    pub fn singleton() -> Self {
        Registration::Singleton(SingletonRegistration::new())
    }

    /// Installs `function` into `container` (or its root) under `key`,
    /// unless the strategy carries its own key.
    pub fn register(&self, container: &Container, key: DependencyKey, function: &Function) -> Result<()> {
        debug!(key = %key, function = function.name(), strategy = %self, "Applying registration strategy");
        match self {
            Registration::Transient(strategy) => strategy.register(container, key, function),
            Registration::Singleton(strategy) => strategy.register(container, key, function),
        }
    }

    #[inline]
    pub fn is_singleton(&self) -> bool {
        matches!(self, Registration::Singleton(_))
    }
}

impl fmt::Display for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Registration::Transient(_) => write!(f, "Transient"),
            Registration::Singleton(s) if s.register_in_child => write!(f, "Singleton(child)"),
            Registration::Singleton(_) => write!(f, "Singleton"),
        }
    }
}

impl From<TransientRegistration> for Registration {
    fn from(strategy: TransientRegistration) -> Self {
        Registration::Transient(strategy)
    }
}

impl From<SingletonRegistration> for Registration {
    fn from(strategy: SingletonRegistration) -> Self {
        Registration::Singleton(strategy)
    }
}

/// Registers the function as transient.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransientRegistration {
    key: Option<DependencyKey>,
}

impl TransientRegistration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers under `key` instead of the requested key.
    pub fn keyed(key: DependencyKey) -> Self {
        Self { key: Some(key) }
    }

    pub fn key(&self) -> Option<&DependencyKey> {
        self.key.as_ref()
    }

    pub fn register(&self, container: &Container, key: DependencyKey, function: &Function) -> Result<()> {
        container.register_transient(self.key.clone().unwrap_or(key), function.clone())
    }
}

/// Registers the function as a singleton.
///
/// Mirrors the two-shaped constructor of the strategy: a `bool` means
/// "register in child" with no key, a key means an explicit key.
///
/// ```
/// use sanad_container::registration::SingletonRegistration;
/// use sanad_container::key::DependencyKey;
///
/// let in_child = SingletonRegistration::from(true);
/// assert!(in_child.register_in_child());
/// assert!(in_child.key().is_none());
///
/// let keyed = SingletonRegistration::from(DependencyKey::token("cache"));
/// assert!(!keyed.register_in_child());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SingletonRegistration {
    key: Option<DependencyKey>,
    register_in_child: bool,
}

impl SingletonRegistration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keyed(key: DependencyKey) -> Self {
        Self {
            key: Some(key),
            register_in_child: false,
        }
    }

    /// Keep the singleton in the registering container, not the root.
    pub fn in_child(mut self, register_in_child: bool) -> Self {
        self.register_in_child = register_in_child;
        self
    }

    pub fn key(&self) -> Option<&DependencyKey> {
        self.key.as_ref()
    }

    #[inline]
    pub fn register_in_child(&self) -> bool {
        self.register_in_child
    }

    pub fn register(&self, container: &Container, key: DependencyKey, function: &Function) -> Result<()> {
        let destination = if self.register_in_child {
            container.clone()
        } else {
            container.root()
        };
        destination.register_singleton(self.key.clone().unwrap_or(key), function.clone())
    }
}

impl From<bool> for SingletonRegistration {
    fn from(register_in_child: bool) -> Self {
        Self::new().in_child(register_in_child)
    }
}

impl From<DependencyKey> for SingletonRegistration {
    fn from(key: DependencyKey) -> Self {
        Self::keyed(key)
    }
}

impl From<(DependencyKey, bool)> for SingletonRegistration {
    fn from((key, register_in_child): (DependencyKey, bool)) -> Self {
        Self::keyed(key).in_child(register_in_child)
    }
}
