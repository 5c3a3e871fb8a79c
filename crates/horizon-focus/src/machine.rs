//! The focus state machine.
//!
//! [`FocusMachine`] reconciles capturing focus-in/focus-out events and
//! pointer releases into one canonical phase. It performs no side effects
//! itself: every transition returns the [`Effect`]s the owning scope must
//! carry out, in order.
//!
//! | Phase            | focus-in (resolves to `t`)         | focus-out                                   |
//! |------------------|------------------------------------|---------------------------------------------|
//! | `Unfocused`      | `Focused(t)`, notify               | ignored                                     |
//! | `Focused(None)`  | `Focused(t)`, notify               | inside root: as focus-in, silent if `t` is  |
//! |                  |                                    | `None`; otherwise `PendingLoss(None)`       |
//! | `Focused(a)`     | `t == a`: none; else `Focused(t)`  | inside root: as focus-in; preserve+pointer: |
//! |                  | and notify                         | refocus `a`; otherwise `PendingLoss(a)`     |
//! | `PendingLoss(a)` | cancel loss; `t == a`: `Focused(a)`| same as `Focused(a)`                        |
//! |                  | silently, else notify              |                                             |
//!
//! A pending loss that fires moves the machine to `Unfocused` and notifies.

use crate::event::{FocusInEvent, FocusOutEvent};
use crate::host::{Element, FocusHost};
use crate::registry::{TargetId, TargetRegistry};
use crate::resolver;

/// Canonical focus phase of a scope.
///
/// `Focused(None)` means real focus is inside the scope root but not inside
/// any registered target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusPhase {
    /// Nothing inside the scope holds focus.
    #[default]
    Unfocused,
    /// Focus is inside the scope.
    Focused(Option<TargetId>),
    /// Focus appeared to leave; a deferred task will confirm it.
    PendingLoss(Option<TargetId>),
}

impl FocusPhase {
    /// The active target, if the scope is (or may still be) focused.
    pub fn active_target(self) -> Option<TargetId> {
        match self {
            Self::Unfocused => None,
            Self::Focused(target) | Self::PendingLoss(target) => target,
        }
    }

    /// Whether the scope reports focus. A pending loss still counts.
    pub fn is_focused(self) -> bool {
        !matches!(self, Self::Unfocused)
    }
}

/// Work the scope must perform after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect<E> {
    /// Cancel the pending deferred loss.
    CancelLoss,
    /// Schedule a deferred loss, replacing any pending one.
    ScheduleLoss,
    /// Move real focus back to this element.
    Refocus(E),
    /// Publish a change: the new active target and the element involved.
    Notify {
        /// The new active target.
        target: Option<TargetId>,
        /// The raw element that caused the change.
        element: E,
    },
}

/// Inputs of the preserve policy at the moment of a focus-out.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreserveInput {
    /// Whether the preserve policy is enabled.
    pub enabled: bool,
    /// Whether a pointer is held down inside the scope.
    pub pointer_down: bool,
}

impl PreserveInput {
    fn applies(self) -> bool {
        self.enabled && self.pointer_down
    }
}

/// The focus state machine of one scope.
#[derive(Debug)]
pub struct FocusMachine<E> {
    phase: FocusPhase,
    /// Element that lost focus when the pending loss was scheduled.
    lost_element: Option<E>,
}

impl<E: Element> FocusMachine<E> {
    /// Create a machine in the `Unfocused` phase.
    pub fn new() -> Self {
        Self {
            phase: FocusPhase::Unfocused,
            lost_element: None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> FocusPhase {
        self.phase
    }

    /// Handle a capturing focus-in.
    pub fn focus_in<H>(
        &mut self,
        registry: &TargetRegistry<E>,
        host: &H,
        event: &FocusInEvent<E>,
    ) -> Vec<Effect<E>>
    where
        H: FocusHost<E> + ?Sized,
    {
        let mut effects = vec![Effect::CancelLoss];
        self.lost_element = None;
        let target = resolver::resolve(registry, host, &event.target);
        self.move_to(target, &event.target, true, &mut effects);
        effects
    }

    /// Handle a capturing focus-out.
    ///
    /// `root` is the scope root, used to decide whether the destination is
    /// still inside the scope.
    pub fn focus_out<H>(
        &mut self,
        registry: &TargetRegistry<E>,
        host: &H,
        root: &E,
        event: &FocusOutEvent<E>,
        preserve: PreserveInput,
    ) -> Vec<Effect<E>>
    where
        H: FocusHost<E> + ?Sized,
    {
        if !self.phase.is_focused() {
            return Vec::new();
        }
        let current = self.phase.active_target();

        if let Some(related) = event.related.as_ref().filter(|r| host.contains(root, r)) {
            let mut effects = vec![Effect::CancelLoss];
            self.lost_element = None;
            let target = resolver::resolve(registry, host, related);
            self.move_to(target, related, false, &mut effects);
            return effects;
        }

        if preserve.applies()
            && let Some(target) = current.and_then(|id| registry.get(id))
        {
            return vec![Effect::Refocus(target.handle.clone())];
        }

        self.phase = FocusPhase::PendingLoss(current);
        self.lost_element = Some(event.target.clone());
        vec![Effect::ScheduleLoss]
    }

    /// Confirm a deferred loss. The caller has already verified that the
    /// firing task is the current one.
    pub fn resolve_loss(&mut self) -> Vec<Effect<E>> {
        let FocusPhase::PendingLoss(_) = self.phase else {
            return Vec::new();
        };
        self.phase = FocusPhase::Unfocused;
        match self.lost_element.take() {
            Some(element) => vec![Effect::Notify {
                target: None,
                element,
            }],
            None => Vec::new(),
        }
    }

    /// Handle a document-level pointer release.
    ///
    /// With the preserve policy enabled and a target active, real focus is
    /// returned to that target once.
    pub fn pointer_up(&self, registry: &TargetRegistry<E>, preserve: bool) -> Vec<Effect<E>> {
        if !preserve {
            return Vec::new();
        }
        self.phase
            .active_target()
            .and_then(|id| registry.get(id))
            .map(|target| vec![Effect::Refocus(target.handle.clone())])
            .unwrap_or_default()
    }

    /// Handle removal of a registration.
    ///
    /// Removing the active target clears the scope immediately.
    pub fn target_removed(&mut self, id: TargetId, handle: &E) -> Vec<Effect<E>> {
        if self.phase.active_target() != Some(id) {
            return Vec::new();
        }
        self.phase = FocusPhase::Unfocused;
        self.lost_element = None;
        vec![
            Effect::CancelLoss,
            Effect::Notify {
                target: None,
                element: handle.clone(),
            },
        ]
    }

    /// Enter `Focused(target)`, notifying unless the active target is
    /// unchanged. With `report_untargeted`, landing on an untargeted element
    /// while no target was active is always reported.
    fn move_to(
        &mut self,
        target: Option<TargetId>,
        element: &E,
        report_untargeted: bool,
        effects: &mut Vec<Effect<E>>,
    ) {
        let unchanged = match self.phase {
            FocusPhase::Unfocused => false,
            FocusPhase::Focused(current) | FocusPhase::PendingLoss(current) => {
                current == target && !(report_untargeted && target.is_none())
            }
        };
        self.phase = FocusPhase::Focused(target);
        if !unchanged {
            effects.push(Effect::Notify {
                target,
                element: element.clone(),
            });
        }
    }
}

impl<E: Element> Default for FocusMachine<E> {
    fn default() -> Self {
        Self::new()
    }
}
