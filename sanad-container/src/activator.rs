//! Activators: how a function and its arguments become an instance.

use std::fmt;

use tracing::trace;

use crate::error::{NotConstructibleError, Result, SanadError};
use crate::function::{Arguments, Function, Instance};

/// Strategy used by `invoke` once all arguments are resolved.
///
/// Declared per function through the metadata provider; defaults to
/// [`Activator::Class`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Activator {
    /// Runs the function's constructor; the result is always a new `Arc`.
    #[default]
    Class,
    /// Calls the function and returns whatever instance it hands back.
    Factory,
}

impl Activator {
    pub fn invoke(&self, function: &Function, args: Arguments) -> Result<Instance> {
        trace!(function = function.name(), activator = %self, args = args.len(), "Activating");

        match self {
            Activator::Class => {
                let constructor = function.constructor().ok_or_else(|| {
                    SanadError::NotConstructible(NotConstructibleError {
                        requested: function.key().clone(),
                        suggestions: vec![],
                    })
                })?;
                constructor(args)
            }
            Activator::Factory => {
                let call = function.call_entry().ok_or_else(|| SanadError::NotCallable {
                    function: function.name().to_string(),
                })?;
                call(args)
            }
        }
    }
}

impl fmt::Display for Activator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Activator::Class => write!(f, "Class"),
            Activator::Factory => write!(f, "Factory"),
        }
    }
}
