//! Pointer-interaction tracking for the preserve policy.

use horizon_focus_core::ListenerId;

/// Tracks whether a pointer button went down inside the scope and has not
/// been released yet.
///
/// The release may happen anywhere in the document, so the tracker owns the
/// id of a one-shot document listener while the pointer is down.
#[derive(Debug, Default)]
pub struct PointerTracker {
    down: bool,
    listener: Option<ListenerId>,
}

impl PointerTracker {
    /// Create a tracker with no pointer pressed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pointer-down inside the scope.
    ///
    /// Returns `true` when the document pointer-up listener must be armed.
    pub fn on_pointer_down(&mut self) -> bool {
        self.down = true;
        self.listener.is_none()
    }

    /// Remember the armed document listener.
    pub fn arm(&mut self, listener: ListenerId) {
        self.listener = Some(listener);
    }

    /// Record the pointer release.
    ///
    /// Returns the listener to disarm, if one was armed.
    pub fn on_pointer_up(&mut self) -> Option<ListenerId> {
        self.down = false;
        self.listener.take()
    }

    /// Whether a pointer is currently held down.
    pub fn is_pointer_down(&self) -> bool {
        self.down
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn test_down_up_cycle() {
        let mut ids = SlotMap::<ListenerId, ()>::with_key();
        let mut tracker = PointerTracker::new();
        assert!(!tracker.is_pointer_down());

        assert!(tracker.on_pointer_down());
        let id = ids.insert(());
        tracker.arm(id);
        assert!(tracker.is_pointer_down());

        // A second press before release reuses the armed listener.
        assert!(!tracker.on_pointer_down());

        assert_eq!(tracker.on_pointer_up(), Some(id));
        assert!(!tracker.is_pointer_down());
        assert_eq!(tracker.on_pointer_up(), None);
    }
}
