//! Resolution path tracking for cycle detection.
//!
//! Every `invoke` pushes `(container, function)` onto a per-thread stack
//! and pops it when done. Meeting a pair that is already on the stack
//! means the function needs itself to be built. Functions are compared by
//! identity, so a function that takes another instance of its own type
//! from a different function is fine.
//!
//! The container is part of the pair because a child resolving through
//! its parent invokes the same function in a different container, which
//! is not a cycle.

use std::cell::RefCell;

use tracing::warn;

use crate::error::{CircularDependencyError, Result, SanadError};
use crate::function::Function;
use crate::key::DependencyKey;

struct Step {
    container: usize,
    function: usize,
    key: DependencyKey,
}

thread_local! {
    static PATH: RefCell<Vec<Step>> = const { RefCell::new(Vec::new()) };
}

/// Pops its entry off the resolution path when dropped.
#[must_use]
pub(crate) struct PathGuard {
    depth: usize,
}

impl Drop for PathGuard {
    fn drop(&mut self) {
        PATH.with(|path| path.borrow_mut().truncate(self.depth));
    }
}

/// Pushes `(container, function)` onto the current thread's resolution path.
///
/// # Errors
/// [`SanadError::CircularDependency`] if the pair is already on the path.
/// The chain lists function keys from its first occurrence to the repeat.
pub(crate) fn enter(container: usize, function: &Function) -> Result<PathGuard> {
    PATH.with(|path| {
        let mut path = path.borrow_mut();

        let repeated = |step: &Step| step.container == container && step.function == function.id();
        if let Some(start) = path.iter().position(repeated) {
            let mut chain: Vec<DependencyKey> = path[start..].iter().map(|step| step.key.clone()).collect();
            chain.push(function.key().clone());

            warn!(cycle = ?chain, "Circular dependency detected!");
            return Err(SanadError::CircularDependency(CircularDependencyError { chain }));
        }

        let depth = path.len();
        path.push(Step {
            container,
            function: function.id(),
            key: function.key().clone(),
        });
        Ok(PathGuard { depth })
    })
}

/// Number of invocations in progress on this thread.
#[cfg(test)]
pub(crate) fn depth() -> usize {
    PATH.with(|path| path.borrow().len())
}
