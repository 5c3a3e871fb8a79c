//! Registered focus targets of one scope.
//!
//! The registry maps element handles to [`Target`] metadata. A handle appears
//! at most once; insertion order carries no meaning.

use std::collections::HashMap;

use slotmap::{new_key_type, SlotMap};

use crate::error::{FocusError, Result};
use crate::host::Element;
use crate::key::FocusKey;

new_key_type! {
    /// Identity of a registration.
    ///
    /// Re-registering a handle after deregistering it yields a new id.
    pub struct TargetId;
}

/// A registered focusable unit within a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target<E> {
    /// The interactive element. Owned by the caller.
    pub handle: E,
    /// Identifier unique among the scope's targets.
    pub key: FocusKey,
}

/// The set of targets registered with one scope.
#[derive(Debug)]
pub struct TargetRegistry<E> {
    targets: SlotMap<TargetId, Target<E>>,
    by_handle: HashMap<E, TargetId>,
}

impl<E: Element> TargetRegistry<E> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            targets: SlotMap::with_key(),
            by_handle: HashMap::new(),
        }
    }

    /// Register `handle` under `key`.
    ///
    /// # Errors
    ///
    /// [`FocusError::DuplicateHandle`] if the handle is already registered.
    pub fn register(&mut self, handle: E, key: FocusKey) -> Result<TargetId> {
        if let Some(existing) = self.lookup(&handle) {
            tracing::warn!(target: "horizon_focus::registry", ?handle, key = %existing.key, "duplicate focus target");
            return Err(FocusError::duplicate_handle(existing.key.clone()));
        }
        let id = self.targets.insert(Target {
            handle: handle.clone(),
            key,
        });
        self.by_handle.insert(handle, id);
        Ok(id)
    }

    /// Remove `handle`. Returns the removed registration, or `None` when the
    /// handle was not registered.
    pub fn deregister(&mut self, handle: &E) -> Option<(TargetId, Target<E>)> {
        let id = self.by_handle.remove(handle)?;
        self.targets.remove(id).map(|target| (id, target))
    }

    /// Find the target registered for `handle`.
    pub fn lookup(&self, handle: &E) -> Option<&Target<E>> {
        self.by_handle.get(handle).and_then(|id| self.targets.get(*id))
    }

    /// Id of the registration for `handle`.
    pub fn id_of(&self, handle: &E) -> Option<TargetId> {
        self.by_handle.get(handle).copied()
    }

    /// Target by id.
    pub fn get(&self, id: TargetId) -> Option<&Target<E>> {
        self.targets.get(id)
    }

    /// Iterate over all registrations.
    pub fn iter(&self) -> impl Iterator<Item = (TargetId, &Target<E>)> {
        self.targets.iter()
    }

    /// Number of registered targets.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether no target is registered.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl<E: Element> Default for TargetRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}
