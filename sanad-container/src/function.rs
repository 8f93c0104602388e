//! Constructible functions and the arguments they receive.
//!
//! A [`Function`] is what the container invokes to build something.
//! It carries its identity key, up to two entry points and an optional
//! explicit dependency list:
//!
//! - the *constructor* builds a new owned value (used by [`Activator::Class`]);
//! - the *call* entry returns an [`Instance`] that may be shared
//!   (used by [`Activator::Factory`]).
//!
//! [`Activator::Class`]: crate::activator::Activator::Class
//! [`Activator::Factory`]: crate::activator::Activator::Factory

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use sanad_support::rendering::display_name;

use crate::error::{Result, SanadError};
use crate::key::DependencyKey;
use crate::resolver::{Dependency, LazyInstance};

/// A resolved, type-erased value. Identity is the `Arc` pointer.
pub type Instance = Arc<dyn Any + Send + Sync>;

type ConstructFn = Arc<dyn Fn(Arguments) -> Result<Instance> + Send + Sync>;
type CallFn = Arc<dyn Fn(Arguments) -> Result<Instance> + Send + Sync>;
type InjectThunk = Arc<dyn Fn() -> Vec<Dependency> + Send + Sync>;

/// An explicitly attached dependency list.
///
/// Takes precedence over every other source of parameter information.
#[derive(Clone)]
pub enum Inject {
    /// Used verbatim.
    List(Arc<[Dependency]>),
    /// Called once, when the construction info is first computed.
    Deferred(InjectThunk),
}

impl Inject {
    pub fn keys(&self) -> Arc<[Dependency]> {
        match self {
            Inject::List(keys) => keys.clone(),
            Inject::Deferred(thunk) => thunk().into(),
        }
    }
}

impl fmt::Debug for Inject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inject::List(keys) => f.debug_tuple("List").field(keys).finish(),
            Inject::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// A type that states its dependencies and how to build itself.
///
/// This is the explicit counterpart of reading constructor parameter
/// types at runtime.
///
/// ```
/// use sanad_container::prelude::*;
///
/// struct Clock;
/// impl Injectable for Clock {
///     fn construct(_: Arguments) -> Result<Self> { Ok(Clock) }
/// }
///
/// struct Scheduler { clock: std::sync::Arc<Clock> }
/// impl Injectable for Scheduler {
///     fn dependencies() -> Vec<Dependency> {
///         vec![Dependency::of::<Clock>()]
///     }
///     fn construct(args: Arguments) -> Result<Self> {
///         Ok(Scheduler { clock: args.get(0)? })
///     }
/// }
///
/// let metadata = MetadataStore::new();
/// metadata.declare::<Clock>();
/// metadata.declare::<Scheduler>();
///
/// let container = Container::builder().metadata(metadata).build();
/// let scheduler = container.resolve::<Scheduler>().unwrap();
/// let clock = container.resolve::<Clock>().unwrap();
/// assert!(std::sync::Arc::ptr_eq(&scheduler.clock, &clock));
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    /// Ordered dependency list, one entry per constructor argument.
    fn dependencies() -> Vec<Dependency> {
        Vec::new()
    }

    /// Builds the value from resolved arguments.
    fn construct(args: Arguments) -> Result<Self>;
}

/// Something the container can invoke to produce an instance.
///
/// Cloning is cheap; clones share identity. Every function built by
/// [`Function::class`], [`Function::factory`] or [`Function::injectable`]
/// gets a fresh identity, even when it shares its key with another one.
#[derive(Clone)]
pub struct Function {
    inner: Arc<FunctionInner>,
}

/// Source of function identities.
static NEXT_ID: AtomicUsize = AtomicUsize::new(1);

struct FunctionInner {
    id: usize,
    key: DependencyKey,
    name: String,
    construct: Option<ConstructFn>,
    call: Option<CallFn>,
    inject: RwLock<Option<Inject>>,
}

impl Function {
    /// A constructor for `T`, keyed by `T` itself.
    pub fn class<T, F>(constructor: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(Arguments) -> Result<T> + Send + Sync + 'static,
    {
        let construct: ConstructFn =
            Arc::new(move |args| Ok(Arc::new(constructor(args)?) as Instance));
        Self::from_parts(
            DependencyKey::of::<T>(),
            display_name(type_name::<T>()),
            Some(construct),
            None,
        )
    }

    /// A plain function returning a (possibly shared) instance.
    pub fn factory<R, F>(key: DependencyKey, body: F) -> Self
    where
        R: Send + Sync + 'static,
        F: Fn(Arguments) -> Result<Arc<R>> + Send + Sync + 'static,
    {
        let name = key.display_name();
        let call: CallFn = Arc::new(move |args| Ok(body(args)? as Instance));
        Self::from_parts(key, name, None, Some(call))
    }

    /// A constructor for an [`Injectable`] type with its dependency list
    /// attached as the explicit `inject` list.
    pub fn injectable<T: Injectable>() -> Self {
        Self::class::<T, _>(T::construct).inject(T::dependencies())
    }

    fn from_parts(
        key: DependencyKey,
        name: String,
        construct: Option<ConstructFn>,
        call: Option<CallFn>,
    ) -> Self {
        Self {
            inner: Arc::new(FunctionInner {
                id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
                key,
                name,
                construct,
                call,
                inject: RwLock::new(None),
            }),
        }
    }

    /// Attaches a literal dependency list.
    pub fn inject<I>(self, dependencies: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Dependency>,
    {
        let keys: Vec<Dependency> = dependencies.into_iter().map(Into::into).collect();
        self.set_inject(Inject::List(keys.into()));
        self
    }

    /// Attaches a dependency list computed on first use.
    pub fn inject_with<F>(self, thunk: F) -> Self
    where
        F: Fn() -> Vec<Dependency> + Send + Sync + 'static,
    {
        self.set_inject(Inject::Deferred(Arc::new(thunk)));
        self
    }

    pub(crate) fn set_inject(&self, inject: Inject) {
        *self.inner.inject.write() = Some(inject);
    }

    /// The explicitly attached dependency list, if any.
    pub fn injected(&self) -> Option<Inject> {
        self.inner.inject.read().clone()
    }

    /// Identity of this function, shared by its clones and never reused.
    #[inline]
    pub fn id(&self) -> usize {
        self.inner.id
    }

    #[inline]
    pub fn key(&self) -> &DependencyKey {
        &self.inner.key
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    #[inline]
    pub fn is_constructible(&self) -> bool {
        self.inner.construct.is_some()
    }

    #[inline]
    pub fn is_callable(&self) -> bool {
        self.inner.call.is_some()
    }

    pub(crate) fn constructor(&self) -> Option<&ConstructFn> {
        self.inner.construct.as_ref()
    }

    pub(crate) fn call_entry(&self) -> Option<&CallFn> {
        self.inner.call.as_ref()
    }

    /// Whether two handles point at the same function.
    #[inline]
    pub fn ptr_eq(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("key", &self.inner.key)
            .field("constructible", &self.is_constructible())
            .field("callable", &self.is_callable())
            .field("inject", &*self.inner.inject.read())
            .finish()
    }
}

/// Resolved arguments handed to a constructor or factory, in declaration order.
pub struct Arguments {
    function: String,
    values: Vec<Instance>,
}

impl Arguments {
    pub fn new(function: impl Into<String>, values: Vec<Instance>) -> Self {
        Self {
            function: function.into(),
            values,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The raw instance at `index`.
    pub fn instance(&self, index: usize) -> Result<Instance> {
        self.values
            .get(index)
            .cloned()
            .ok_or_else(|| SanadError::MissingArgument {
                function: self.function.clone(),
                index,
            })
    }

    /// The instance at `index`, downcast to `T`.
    pub fn get<T: Send + Sync + 'static>(&self, index: usize) -> Result<Arc<T>> {
        let instance = self.instance(index)?;
        downcast(instance, || self.describe(index))
    }

    /// The deferred handle produced by a `Lazy` resolver.
    pub fn lazy(&self, index: usize) -> Result<Arc<LazyInstance>> {
        self.get::<LazyInstance>(index)
    }

    /// Every instance produced by an `All` resolver, downcast to `T`.
    pub fn all<T: Send + Sync + 'static>(&self, index: usize) -> Result<Vec<Arc<T>>> {
        let all = self.get::<Vec<Instance>>(index)?;
        all.iter()
            .cloned()
            .map(|instance| downcast(instance, || self.describe(index)))
            .collect()
    }

    /// The value produced by an `Optional` or `Parent` resolver.
    pub fn optional<T: Send + Sync + 'static>(&self, index: usize) -> Result<Option<Arc<T>>> {
        let slot: Option<Instance> = (*self.get::<Option<Instance>>(index)?).clone();
        slot.map(|instance| downcast(instance, || self.describe(index)))
            .transpose()
    }

    pub fn into_vec(self) -> Vec<Instance> {
        self.values
    }

    fn describe(&self, index: usize) -> String {
        format!("argument {index} of {}", self.function)
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arguments")
            .field("function", &self.function)
            .field("len", &self.values.len())
            .finish()
    }
}

/// Downcasts an instance, naming `target` in the error.
pub(crate) fn downcast<T: Send + Sync + 'static>(
    instance: Instance,
    target: impl FnOnce() -> String,
) -> Result<Arc<T>> {
    instance.downcast::<T>().map_err(|_| SanadError::TypeMismatch {
        target: target(),
        expected: type_name::<T>(),
    })
}
