//! Ambient scope lookup.
//!
//! Consumers deep inside a region find their scope through a [`ScopeStack`]
//! instead of having it threaded through every call. The innermost pushed
//! scope is the current one.

use parking_lot::Mutex;

use crate::error::{FocusError, Result};
use crate::host::Element;
use crate::key::FocusKey;
use crate::scope::{FocusBinding, FocusScope};

/// Stack of active scopes, innermost last.
pub struct ScopeStack<E: Element> {
    scopes: Mutex<Vec<FocusScope<E>>>,
}

impl<E: Element> ScopeStack<E> {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self {
            scopes: Mutex::new(Vec::new()),
        }
    }

    /// Make `scope` the current scope.
    pub fn push(&self, scope: FocusScope<E>) {
        tracing::trace!(target: "horizon_focus::context", scope = %scope.key(), "scope entered");
        self.scopes.lock().push(scope);
    }

    /// Leave the current scope.
    pub fn pop(&self) -> Option<FocusScope<E>> {
        let scope = self.scopes.lock().pop();
        if let Some(scope) = &scope {
            tracing::trace!(target: "horizon_focus::context", scope = %scope.key(), "scope left");
        }
        scope
    }

    /// Number of scopes on the stack.
    pub fn depth(&self) -> usize {
        self.scopes.lock().len()
    }

    /// The innermost scope.
    ///
    /// # Errors
    ///
    /// [`FocusError::NoActiveScope`] if the stack is empty.
    pub fn current(&self) -> Result<FocusScope<E>> {
        let scope = self.scopes.lock().last().cloned();
        scope.ok_or_else(|| {
            tracing::warn!(target: "horizon_focus::context", "no focus scope is active");
            FocusError::NoActiveScope
        })
    }

    /// Register `handle` in the current scope for the lifetime of the
    /// returned binding. A key is generated when `key` is `None`.
    ///
    /// # Errors
    ///
    /// [`FocusError::NoActiveScope`] if the stack is empty, or
    /// [`FocusError::DuplicateHandle`] if the handle is already registered.
    pub fn bind(&self, handle: E, key: Option<FocusKey>) -> Result<FocusBinding<E>> {
        self.current()?.register_scoped(handle, key)
    }

    /// Trigger the current scope's update channel.
    ///
    /// # Errors
    ///
    /// [`FocusError::NoActiveScope`] if the stack is empty.
    pub fn trigger(&self) -> Result<usize> {
        Ok(self.current()?.trigger_update())
    }
}

impl<E: Element> Default for ScopeStack<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Element> std::fmt::Debug for ScopeStack<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<FocusKey> = self
            .scopes
            .lock()
            .iter()
            .map(|scope| scope.key().clone())
            .collect();
        f.debug_struct("ScopeStack").field("scopes", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{FocusHost, FrameScheduler};
    use std::sync::Arc;

    struct Everything;

    impl FocusHost<u32> for Everything {
        fn contains(&self, _ancestor: &u32, _node: &u32) -> bool {
            true
        }

        fn focus(&self, _element: &u32) {}
    }

    fn scope(key: &str) -> FocusScope<u32> {
        FocusScope::builder(0_u32, Arc::new(Everything), Arc::new(FrameScheduler::new()))
            .scope_key(key)
            .build()
            .expect("root scope")
    }

    #[test]
    fn test_empty_stack_has_no_active_scope() {
        let stack = ScopeStack::<u32>::new();
        assert_eq!(stack.current().err(), Some(FocusError::NoActiveScope));
        assert_eq!(stack.bind(1, None).err(), Some(FocusError::NoActiveScope));
        assert_eq!(stack.trigger(), Err(FocusError::NoActiveScope));
    }

    #[test]
    fn test_innermost_scope_is_current() {
        let stack = ScopeStack::new();
        stack.push(scope("outer"));
        stack.push(scope("inner"));
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.current().expect("pushed").key().as_str(), "inner");

        stack.pop();
        assert_eq!(stack.current().expect("pushed").key().as_str(), "outer");
    }

    #[test]
    fn test_bind_registers_in_current_scope() {
        let stack = ScopeStack::new();
        let outer = scope("outer");
        stack.push(outer.clone());

        let binding = stack.bind(7, Some(FocusKey::from("seven"))).expect("bound");
        assert_eq!(outer.target_count(), 1);
        assert_eq!(stack.trigger(), Ok(0));

        drop(binding);
        assert_eq!(outer.target_count(), 0);
    }
}
