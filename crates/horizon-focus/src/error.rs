//! Error types for the focus engine.

use crate::key::FocusKey;

/// Result type alias for focus operations.
pub type Result<T> = std::result::Result<T, FocusError>;

/// Errors surfaced by misuse of the registration and scope APIs.
///
/// Focus tracking itself has no failure mode: an event that resolves to no
/// registered target is a valid transition, not an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FocusError {
    /// The handle is already registered in this scope.
    #[error("Element is already registered as focus target '{key}'")]
    DuplicateHandle {
        /// Key of the target that already owns the handle.
        key: FocusKey,
    },

    /// A scope operation was invoked with no enclosing scope.
    #[error("No focus scope is active")]
    NoActiveScope,
}

impl FocusError {
    /// Create a duplicate handle error.
    pub fn duplicate_handle(key: impl Into<FocusKey>) -> Self {
        Self::DuplicateHandle { key: key.into() }
    }
}
