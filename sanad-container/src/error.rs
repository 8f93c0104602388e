//! Error types for Sanad container operations.
//!
//! Every container call either returns a value or one of these errors.
//! Nothing is swallowed and nothing is retried.

use std::fmt;

use sanad_support::rendering::{render_aggregate, render_chain};

use crate::key::DependencyKey;

/// Main error type for all Sanad operations.
#[derive(Debug, thiserror::Error)]
pub enum SanadError {
    /// An empty token or empty name was used as a key.
    #[error("Invalid key passed to {operation}: a key cannot be empty")]
    InvalidKey { operation: &'static str },

    /// Nothing is registered for the key and no function stands behind it.
    #[error("{}", .0)]
    NotConstructible(NotConstructibleError),

    /// Auto-registration ran but installed its handler under another key.
    #[error("Auto-registration of {key} did not register a handler for that key")]
    RegistrationMissing { key: DependencyKey },

    /// The factory activator was asked to call a function with no call entry.
    #[error("{function} cannot be called as a factory: it only has a constructor")]
    NotCallable { function: String },

    /// Aggregate error raised at the `invoke` boundary.
    #[error("{}", render_invocation(.function, .source))]
    Invocation {
        function: String,
        #[source]
        source: Box<SanadError>,
    },

    /// A function re-entered its own construction.
    #[error("{}", .0)]
    CircularDependency(CircularDependencyError),

    /// A constructor or factory returned its own error.
    #[error("Failed to construct {key}: {source}")]
    ConstructionFailed {
        key: DependencyKey,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A resolved instance was not of the requested type.
    #[error("Type mismatch for {target}: expected {expected}")]
    TypeMismatch {
        target: String,
        expected: &'static str,
    },

    /// A constructor asked for an argument that was never declared.
    #[error("{function} has no argument at position {index}")]
    MissingArgument { function: String, index: usize },
}

fn render_invocation(function: &str, source: &SanadError) -> String {
    render_aggregate(
        &format!("Error instantiating {function}."),
        Some(&source.to_string()),
    )
}

impl SanadError {
    /// Wraps `inner` into [`SanadError::Invocation`] for `function`.
    ///
    /// An error that already is an invocation error is returned as-is.
    pub fn invocation(function: impl Into<String>, inner: SanadError) -> Self {
        if inner.is_invocation() {
            return inner;
        }
        SanadError::Invocation {
            function: function.into(),
            source: Box::new(inner),
        }
    }

    /// Wraps a user error raised while building `key`.
    pub fn construction(
        key: DependencyKey,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        SanadError::ConstructionFailed {
            key,
            source: source.into(),
        }
    }

    #[inline]
    pub fn is_invocation(&self) -> bool {
        matches!(self, SanadError::Invocation { .. })
    }

    /// Follows invocation wrappers down to the error that started it.
    pub fn root_cause(&self) -> &SanadError {
        match self {
            SanadError::Invocation { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Error when a key cannot be turned into an instance.
///
/// Includes "did you mean?" suggestions drawn from known keys.
#[derive(Debug)]
pub struct NotConstructibleError {
    /// The key that was requested.
    pub requested: DependencyKey,
    /// Known keys with a similar name.
    pub suggestions: Vec<String>,
}

impl fmt::Display for NotConstructibleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cannot construct {}: nothing is registered for it", self.requested)?;

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }

        write!(
            f,
            "\n  Hint: register a handler for it or define its function in the metadata store"
        )
    }
}

/// Error when a function is needed again while it is being constructed.
#[derive(Debug)]
pub struct CircularDependencyError {
    /// Function keys along the cycle, first and last are the same.
    pub chain: Vec<DependencyKey>,
}

impl fmt::Display for CircularDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.chain.iter().map(DependencyKey::display_name).collect();
        write!(f, "Circular dependency detected:\n  {}", render_chain(&names))?;
        write!(f, "\n  Hint: break the cycle with a Lazy resolver")
    }
}

/// Convenient Result type for Sanad operations.
pub type Result<T> = std::result::Result<T, SanadError>;
