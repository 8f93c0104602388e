//! Resolvers: keys that customize their own lookup.
//!
//! A function may declare a [`Resolver`] instead of a plain key for any
//! of its arguments. When the container meets one, it hands itself to
//! [`Resolver::get`] instead of consulting its table.
//!
//! | Resolver   | Produces                                   |
//! |------------|--------------------------------------------|
//! | `Lazy`     | `LazyInstance`, resolving on every call    |
//! | `All`      | `Vec<Instance>`, every handler for the key |
//! | `Optional` | `Option<Instance>`, only if registered     |
//! | `Parent`   | `Option<Instance>`, from the parent        |

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::container::Container;
use crate::error::Result;
use crate::function::{Instance, downcast};
use crate::key::DependencyKey;

/// One declared constructor argument: a plain key or a resolver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Dependency {
    Key(DependencyKey),
    Resolver(Resolver),
}

impl Dependency {
    /// Plain key for type `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Dependency::Key(DependencyKey::of::<T>())
    }
}

impl From<DependencyKey> for Dependency {
    fn from(key: DependencyKey) -> Self {
        Dependency::Key(key)
    }
}

impl From<&DependencyKey> for Dependency {
    fn from(key: &DependencyKey) -> Self {
        Dependency::Key(key.clone())
    }
}

impl From<Resolver> for Dependency {
    fn from(resolver: Resolver) -> Self {
        Dependency::Resolver(resolver)
    }
}

impl From<&Dependency> for Dependency {
    fn from(dependency: &Dependency) -> Self {
        dependency.clone()
    }
}

/// Lookup strategies usable in place of a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resolver {
    /// Defers resolution until the returned handle is called.
    Lazy(DependencyKey),
    /// Resolves every handler registered for the key.
    All(DependencyKey),
    /// Resolves only if a handler is already registered.
    Optional {
        key: DependencyKey,
        check_parent: bool,
    },
    /// Resolves from the parent of the resolving container.
    Parent(DependencyKey),
}

impl Resolver {
    pub fn lazy(key: impl Into<DependencyKey>) -> Self {
        Resolver::Lazy(key.into())
    }

    pub fn all(key: impl Into<DependencyKey>) -> Self {
        Resolver::All(key.into())
    }

    pub fn optional(key: impl Into<DependencyKey>, check_parent: bool) -> Self {
        Resolver::Optional {
            key: key.into(),
            check_parent,
        }
    }

    pub fn parent(key: impl Into<DependencyKey>) -> Self {
        Resolver::Parent(key.into())
    }

    /// The key this resolver looks up.
    pub fn key(&self) -> &DependencyKey {
        match self {
            Resolver::Lazy(key)
            | Resolver::All(key)
            | Resolver::Optional { key, .. }
            | Resolver::Parent(key) => key,
        }
    }

    /// Resolves against `container`, the container currently processing
    /// this resolver (not necessarily the one the caller started from).
    pub fn get(&self, container: &Container) -> Result<Instance> {
        trace!(resolver = ?self, "Resolving through resolver");

        match self {
            Resolver::Lazy(key) => Ok(Arc::new(LazyInstance {
                container: container.clone(),
                key: key.clone(),
            })),
            Resolver::All(key) => Ok(Arc::new(container.get_all(key)?)),
            Resolver::Optional { key, check_parent } => {
                let value = if container.has_handler(key, *check_parent)? {
                    Some(container.get(key)?)
                } else {
                    None
                };
                Ok(Arc::new(value))
            }
            Resolver::Parent(key) => {
                let value = match container.parent() {
                    Some(parent) => Some(parent.get(key)?),
                    None => None,
                };
                Ok(Arc::new(value))
            }
        }
    }
}

impl fmt::Display for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolver::Lazy(key) => write!(f, "Lazy({key})"),
            Resolver::All(key) => write!(f, "All({key})"),
            Resolver::Optional { key, check_parent } => {
                write!(f, "Optional({key}, check_parent={check_parent})")
            }
            Resolver::Parent(key) => write!(f, "Parent({key})"),
        }
    }
}

/// `Lazy::of(key)` builds a [`Resolver::Lazy`].
pub struct Lazy;

impl Lazy {
    pub fn of(key: impl Into<DependencyKey>) -> Resolver {
        Resolver::lazy(key)
    }
}

/// `All::of(key)` builds a [`Resolver::All`].
pub struct All;

impl All {
    pub fn of(key: impl Into<DependencyKey>) -> Resolver {
        Resolver::all(key)
    }
}

/// `Optional::of(key, check_parent)` builds a [`Resolver::Optional`].
pub struct Optional;

impl Optional {
    pub fn of(key: impl Into<DependencyKey>, check_parent: bool) -> Resolver {
        Resolver::optional(key, check_parent)
    }
}

/// `Parent::of(key)` builds a [`Resolver::Parent`].
pub struct Parent;

impl Parent {
    pub fn of(key: impl Into<DependencyKey>) -> Resolver {
        Resolver::parent(key)
    }
}

/// Handle produced by a `Lazy` resolver.
///
/// Every call re-resolves the key against the container that produced
/// the handle. Caching, if wanted, belongs to the key's registration.
pub struct LazyInstance {
    container: Container,
    key: DependencyKey,
}

impl LazyInstance {
    pub fn get(&self) -> Result<Instance> {
        self.container.get(&self.key)
    }

    pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        downcast(self.get()?, || self.key.to_string())
    }

    #[inline]
    pub fn key(&self) -> &DependencyKey {
        &self.key
    }
}

impl fmt::Debug for LazyInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyInstance").field("key", &self.key).finish()
    }
}
