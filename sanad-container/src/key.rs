//! Dependency identification keys.
//!
//! [`DependencyKey`] identifies one registration slot in a container.
//! A key is a Rust type, a type plus a name, or a free-standing token.

use std::any::{TypeId, type_name};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use sanad_support::rendering::display_name;

use crate::error::{Result, SanadError};

const TOKEN_TYPE_NAME: &str = "token";

/// Uniquely identifies a dependency in a container.
///
/// Keys compare by identity: the [`TypeId`] (if any) plus the optional
/// name. Two tokens with the same text are the same key.
///
/// # Examples
/// ```
/// use sanad_container::key::DependencyKey;
///
/// let key = DependencyKey::of::<String>();
/// assert_eq!(key.type_name(), "alloc::string::String");
/// assert_eq!(key.name(), None);
///
/// let primary = DependencyKey::named::<String>("primary_db");
/// assert_ne!(primary, key);
///
/// let token = DependencyKey::token("api-url");
/// assert_eq!(token, DependencyKey::token("api-url"));
/// assert!(!DependencyKey::token("").is_valid());
/// ```
#[derive(Clone)]
pub struct DependencyKey {
    type_id: Option<TypeId>,
    type_name: &'static str,
    name: Option<Cow<'static, str>>,
}

impl DependencyKey {
    /// Creates a key for type `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: Some(TypeId::of::<T>()),
            type_name: type_name::<T>(),
            name: None,
        }
    }

    /// Creates a named key for type `T`.
    ///
    /// Named keys let several registrations share a type.
    #[inline]
    pub fn named<T: ?Sized + 'static>(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            type_id: Some(TypeId::of::<T>()),
            type_name: type_name::<T>(),
            name: Some(name.into()),
        }
    }

    /// Creates a key that is nothing but a string token.
    #[inline]
    pub fn token(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            type_id: None,
            type_name: TOKEN_TYPE_NAME,
            name: Some(name.into()),
        }
    }

    /// Returns the [`TypeId`] behind this key, `None` for tokens.
    #[inline]
    pub fn type_id(&self) -> Option<TypeId> {
        self.type_id
    }

    /// Returns the fully qualified type name, or `"token"`.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the name of a named key or the text of a token.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    pub fn is_token(&self) -> bool {
        self.type_id.is_none()
    }

    /// Returns `true` when the key may be used for registration or lookup.
    ///
    /// Empty tokens and empty names are the "no key" values of this crate
    /// and are rejected by every container operation.
    #[inline]
    pub fn is_valid(&self) -> bool {
        !matches!(self.name.as_deref(), Some(""))
    }

    /// Returns `true` if this key is exactly the key of type `T`.
    #[inline]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.type_id == Some(TypeId::of::<T>()) && self.name.is_none()
    }

    /// Short, path-free label used in messages and spans.
    pub fn display_name(&self) -> String {
        match (&self.type_id, &self.name) {
            (None, Some(name)) => name.to_string(),
            (_, Some(name)) => format!("{}[{name}]", display_name(self.type_name)),
            (_, None) => display_name(self.type_name),
        }
    }

    /// Fails with [`SanadError::InvalidKey`] if the key is not usable.
    pub(crate) fn ensure_valid(&self, operation: &'static str) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(SanadError::InvalidKey { operation })
        }
    }
}

impl PartialEq for DependencyKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.name == other.name
    }
}

impl Eq for DependencyKey {}

impl Hash for DependencyKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Debug for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.type_id, &self.name) {
            (None, Some(name)) => write!(f, "DependencyKey(token={name:?})"),
            (_, Some(name)) => write!(f, "DependencyKey({}, name={name:?})", self.type_name),
            (_, None) => write!(f, "DependencyKey({})", self.type_name),
        }
    }
}

impl fmt::Display for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.type_id, &self.name) {
            (None, Some(name)) => write!(f, "token {name:?}"),
            (_, Some(name)) => write!(f, "{} (name={name:?})", self.type_name),
            (_, None) => write!(f, "{}", self.type_name),
        }
    }
}

impl From<&DependencyKey> for DependencyKey {
    fn from(key: &DependencyKey) -> Self {
        key.clone()
    }
}

impl From<&'static str> for DependencyKey {
    fn from(token: &'static str) -> Self {
        Self::token(token)
    }
}
