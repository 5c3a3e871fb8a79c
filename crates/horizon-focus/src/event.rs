//! Focus events consumed and produced by a scope.

use crate::key::FocusKey;

/// A capturing focus-in observed at the scope root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusInEvent<E> {
    /// The element that received focus.
    pub target: E,
}

impl<E> FocusInEvent<E> {
    /// Create a new focus-in event.
    pub fn new(target: E) -> Self {
        Self { target }
    }
}

/// A capturing focus-out observed at the scope root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusOutEvent<E> {
    /// The element losing focus.
    pub target: E,
    /// The element about to receive focus, when the host knows it.
    pub related: Option<E>,
}

impl<E> FocusOutEvent<E> {
    /// Create a focus-out with no known destination.
    pub fn new(target: E) -> Self {
        Self {
            target,
            related: None,
        }
    }

    /// Set the element about to receive focus.
    pub fn with_related(mut self, related: E) -> Self {
        self.related = Some(related);
        self
    }
}

/// Change notification published whenever a scope's state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusChange<E> {
    /// Key of the newly active target, or `None` when no target is active.
    pub key: Option<FocusKey>,
    /// The raw element that caused the change.
    pub element: E,
}

impl<E> FocusChange<E> {
    /// Whether this change reports that no target is active.
    pub fn is_cleared(&self) -> bool {
        self.key.is_none()
    }
}
