//! The focus scope: the object a region instantiates once.
//!
//! A [`FocusScope`] owns the target registry, the state machine, the pointer
//! tracker and the deferred-loss slot for one region. The host feeds it
//! capturing focus events and pointer presses observed at the region root;
//! consumers register targets, query [`ScopeState`] and subscribe to
//! [`FocusChange`] notifications.
//!
//! # Locking
//!
//! Transitions run under the scope lock. Side effects that leave the engine
//! (re-focusing an element, notifying subscribers, triggering the update
//! channel) run after the lock is released, so a host whose `focus` call
//! dispatches focus events synchronously, or a subscriber that queries the
//! scope, can re-enter it safely.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_focus::{FocusHost, FocusInEvent, FocusOutEvent, FocusScope, FrameScheduler};
//!
//! struct Flat;
//! impl FocusHost<u32> for Flat {
//!     // Element 0 is the root; everything else is a direct child.
//!     fn contains(&self, ancestor: &u32, node: &u32) -> bool {
//!         *ancestor == 0 || ancestor == node
//!     }
//!     fn focus(&self, _element: &u32) {}
//! }
//!
//! let scheduler = Arc::new(FrameScheduler::new());
//! let scope = FocusScope::builder(0_u32, Arc::new(Flat), scheduler.clone()).build()?;
//! scope.register(1, "first")?;
//! scope.register(2, "second")?;
//!
//! scope.on_focus_in(&FocusInEvent::new(1));
//! scope.on_focus_out(&FocusOutEvent::new(1).with_related(2));
//! scope.on_focus_in(&FocusInEvent::new(2));
//! assert_eq!(scope.state().active_key.as_ref().map(|k| k.as_str()), Some("second"));
//!
//! scope.on_focus_out(&FocusOutEvent::new(2));
//! assert!(scope.state().is_focused);
//! scheduler.run_tick();
//! assert!(!scope.state().is_focused);
//! # Ok::<(), horizon_focus::FocusError>(())
//! ```

use std::fmt;
use std::sync::{Arc, Weak};

use horizon_focus_core::logging::span_names;
use horizon_focus_core::{ConnectionGuard, ConnectionId, PerfSpan, Signal, UpdateChannels};
use parking_lot::Mutex;

use crate::config::FocusScopeConfig;
use crate::context::ScopeStack;
use crate::deferred::{DeferredResolution, Generation};
use crate::error::Result;
use crate::event::{FocusChange, FocusInEvent, FocusOutEvent};
use crate::host::{DeferredTask, Element, EventScheduler, FocusHost};
use crate::key::FocusKey;
use crate::machine::{Effect, FocusMachine, FocusPhase, PreserveInput};
use crate::pointer::PointerTracker;
use crate::registry::{TargetId, TargetRegistry};

const TARGET: &str = "horizon_focus::scope";

/// Externally visible state of a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeState<E> {
    /// Key of the target believed to hold focus.
    pub active_key: Option<FocusKey>,
    /// Element of the target believed to hold focus.
    pub active_element: Option<E>,
    /// Whether something inside the root holds focus, including the window
    /// between a focus-out and its deferred confirmation.
    pub is_focused: bool,
    /// Whether a pointer went down inside the root and is still held.
    pub pointer_down: bool,
}

/// Mutable state guarded by the scope lock.
struct ScopeCore<E> {
    registry: TargetRegistry<E>,
    machine: FocusMachine<E>,
    pointer: PointerTracker,
    deferred: DeferredResolution,
}

struct ScopeInner<E: Element> {
    key: FocusKey,
    root: E,
    preserve: bool,
    host: Arc<dyn FocusHost<E>>,
    scheduler: Arc<dyn EventScheduler>,
    channels: Option<Arc<UpdateChannels<FocusKey>>>,
    changed: Arc<Signal<FocusChange<E>>>,
    core: Mutex<ScopeCore<E>>,
    /// Registration of this scope's root in its parent scope.
    parent_binding: Mutex<Option<FocusBinding<E>>>,
}

impl<E: Element> Drop for ScopeInner<E> {
    fn drop(&mut self) {
        let core = self.core.get_mut();
        core.deferred.cancel(&*self.scheduler);
        if let Some(listener) = core.pointer.on_pointer_up() {
            self.scheduler.remove_pointer_up_listener(listener);
        }
        tracing::debug!(target: TARGET, scope = %self.key, "scope dropped");
    }
}

/// Side effects carried out after the scope lock is released.
enum Outgoing<E> {
    Refocus(E),
    Notify(FocusChange<E>),
}

/// Focus tracking for one region.
///
/// Cloning a `FocusScope` yields another handle to the same scope.
pub struct FocusScope<E: Element> {
    inner: Arc<ScopeInner<E>>,
}

impl<E: Element> Clone for FocusScope<E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<E: Element> FocusScope<E> {
    /// Start building a scope rooted at `root`.
    pub fn builder(
        root: E,
        host: Arc<dyn FocusHost<E>>,
        scheduler: Arc<dyn EventScheduler>,
    ) -> FocusScopeBuilder<E> {
        FocusScopeBuilder {
            root,
            host,
            scheduler,
            config: FocusScopeConfig::default(),
            parent: None,
            channels: None,
        }
    }

    /// The scope key.
    pub fn key(&self) -> &FocusKey {
        &self.inner.key
    }

    /// The root element.
    pub fn root(&self) -> &E {
        &self.inner.root
    }

    /// Whether the preserve policy is enabled.
    pub fn preserve(&self) -> bool {
        self.inner.preserve
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register `handle` as a target of this scope.
    ///
    /// # Errors
    ///
    /// [`FocusError::DuplicateHandle`](crate::FocusError::DuplicateHandle) if
    /// the handle is already registered.
    pub fn register(&self, handle: E, key: impl Into<FocusKey>) -> Result<TargetId> {
        let key = key.into();
        let id = self.inner.core.lock().registry.register(handle.clone(), key.clone())?;
        tracing::debug!(target: TARGET, scope = %self.inner.key, ?handle, %key, "target registered");
        Ok(id)
    }

    /// Register `handle` for as long as the returned binding lives.
    ///
    /// A key is generated when `key` is `None`.
    pub fn register_scoped(&self, handle: E, key: Option<FocusKey>) -> Result<FocusBinding<E>> {
        let key = key.unwrap_or_else(FocusKey::random);
        self.register(handle.clone(), key.clone())?;
        Ok(FocusBinding {
            scope: Arc::downgrade(&self.inner),
            handle,
            key,
        })
    }

    /// Deregister `handle`. Does nothing if it is not registered.
    ///
    /// Removing the active target clears the scope immediately, without
    /// waiting for a focus-out. Returns whether a registration was removed.
    pub fn deregister(&self, handle: &E) -> bool {
        let outgoing = {
            let mut core = self.inner.core.lock();
            let Some((id, target)) = core.registry.deregister(handle) else {
                return false;
            };
            tracing::debug!(target: TARGET, scope = %self.inner.key, ?handle, key = %target.key, "target deregistered");
            let effects = core.machine.target_removed(id, &target.handle);
            self.apply(&mut core, effects)
        };
        self.dispatch(outgoing);
        true
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Snapshot of the scope state.
    pub fn state(&self) -> ScopeState<E> {
        let core = self.inner.core.lock();
        let phase = core.machine.phase();
        let active = phase.active_target().and_then(|id| core.registry.get(id));
        ScopeState {
            active_key: active.map(|target| target.key.clone()),
            active_element: active.map(|target| target.handle.clone()),
            is_focused: phase.is_focused(),
            pointer_down: core.pointer.is_pointer_down(),
        }
    }

    /// Current state-machine phase.
    pub fn phase(&self) -> FocusPhase {
        self.inner.core.lock().machine.phase()
    }

    /// Whether the target registered for `handle` is the active one.
    pub fn is_target_focused(&self, handle: &E) -> bool {
        let core = self.inner.core.lock();
        match (core.registry.id_of(handle), core.machine.phase().active_target()) {
            (Some(id), Some(active)) => id == active,
            _ => false,
        }
    }

    /// Number of registered targets.
    pub fn target_count(&self) -> usize {
        self.inner.core.lock().registry.len()
    }

    /// Whether a deferred loss is waiting for the next tick.
    pub fn has_pending_loss(&self) -> bool {
        self.inner.core.lock().deferred.is_pending()
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Subscribe to change notifications.
    pub fn subscribe<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&FocusChange<E>) + Send + Sync + 'static,
    {
        self.inner.changed.connect(slot)
    }

    /// Subscribe for as long as the returned guard lives.
    pub fn subscribe_scoped<F>(&self, slot: F) -> ConnectionGuard<FocusChange<E>>
    where
        F: Fn(&FocusChange<E>) + Send + Sync + 'static,
    {
        self.inner.changed.connect_scoped(slot)
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.changed.connection_count()
    }

    /// Remove a subscription. Returns `false` if it was already removed.
    pub fn unsubscribe(&self, id: ConnectionId) -> bool {
        self.inner.changed.disconnect(id)
    }

    /// Trigger this scope's update channel without a state change.
    ///
    /// Returns the number of hooks invoked; zero when no channel registry is
    /// attached.
    pub fn trigger_update(&self) -> usize {
        self.inner
            .channels
            .as_ref()
            .map_or(0, |channels| channels.trigger(&self.inner.key))
    }

    // =========================================================================
    // Host events
    // =========================================================================

    /// Handle a capturing focus-in observed at the root.
    #[tracing::instrument(skip_all, target = "horizon_focus::scope", level = "trace", fields(scope = %self.inner.key))]
    pub fn on_focus_in(&self, event: &FocusInEvent<E>) {
        let outgoing = {
            let mut core = self.inner.core.lock();
            let ScopeCore {
                registry, machine, ..
            } = &mut *core;
            let effects = machine.focus_in(registry, &*self.inner.host, event);
            self.apply(&mut core, effects)
        };
        self.dispatch(outgoing);
    }

    /// Handle a capturing focus-out observed at the root.
    #[tracing::instrument(skip_all, target = "horizon_focus::scope", level = "trace", fields(scope = %self.inner.key))]
    pub fn on_focus_out(&self, event: &FocusOutEvent<E>) {
        let outgoing = {
            let mut core = self.inner.core.lock();
            let preserve = PreserveInput {
                enabled: self.inner.preserve,
                pointer_down: core.pointer.is_pointer_down(),
            };
            let ScopeCore {
                registry, machine, ..
            } = &mut *core;
            let effects = machine.focus_out(
                registry,
                &*self.inner.host,
                &self.inner.root,
                event,
                preserve,
            );
            self.apply(&mut core, effects)
        };
        self.dispatch(outgoing);
    }

    /// Handle a pointer press whose target is `target`.
    ///
    /// Presses outside the root are ignored. A press inside arms a one-shot
    /// document-wide pointer-up listener.
    #[tracing::instrument(skip_all, target = "horizon_focus::scope", level = "trace", fields(scope = %self.inner.key))]
    pub fn on_pointer_down(&self, target: &E) {
        if !self.inner.host.contains(&self.inner.root, target) {
            return;
        }
        let mut core = self.inner.core.lock();
        if core.pointer.on_pointer_down() {
            let scope = Arc::downgrade(&self.inner);
            let listener = self.inner.scheduler.listen_pointer_up_once(Box::new(move || {
                if let Some(inner) = scope.upgrade() {
                    FocusScope { inner }.on_pointer_up();
                }
            }));
            core.pointer.arm(listener);
        }
    }

    /// Handle the release of a pointer pressed inside the root.
    ///
    /// Normally invoked by the listener armed in
    /// [`on_pointer_down`](Self::on_pointer_down); calling it directly
    /// disarms that listener. Does nothing if no press is being tracked.
    #[tracing::instrument(skip_all, target = "horizon_focus::scope", level = "trace", fields(scope = %self.inner.key))]
    pub fn on_pointer_up(&self) {
        let outgoing = {
            let mut core = self.inner.core.lock();
            if !core.pointer.is_pointer_down() {
                return;
            }
            if let Some(listener) = core.pointer.on_pointer_up() {
                self.inner.scheduler.remove_pointer_up_listener(listener);
            }
            let effects = core.machine.pointer_up(&core.registry, self.inner.preserve);
            self.apply(&mut core, effects)
        };
        self.dispatch(outgoing);
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    fn resolve_deferred_loss(&self, generation: Generation) {
        let _span = PerfSpan::new(span_names::DEFERRED_LOSS);
        let outgoing = {
            let mut core = self.inner.core.lock();
            if !core.deferred.settle(generation) {
                tracing::trace!(target: TARGET, scope = %self.inner.key, generation, "stale deferred loss ignored");
                return;
            }
            let effects = core.machine.resolve_loss();
            self.apply(&mut core, effects)
        };
        self.dispatch(outgoing);
    }

    /// Carry out scheduling effects under the lock and collect the rest.
    fn apply(&self, core: &mut ScopeCore<E>, effects: Vec<Effect<E>>) -> Vec<Outgoing<E>> {
        let mut outgoing = Vec::new();
        for effect in effects {
            match effect {
                Effect::CancelLoss => {
                    if core.deferred.cancel(&*self.inner.scheduler) {
                        tracing::trace!(target: TARGET, scope = %self.inner.key, "deferred loss cancelled");
                    }
                }
                Effect::ScheduleLoss => {
                    let scope = Arc::downgrade(&self.inner);
                    core.deferred.schedule(&*self.inner.scheduler, move |generation| -> DeferredTask {
                        Box::new(move || {
                            if let Some(inner) = scope.upgrade() {
                                FocusScope { inner }.resolve_deferred_loss(generation);
                            }
                        })
                    });
                    tracing::trace!(target: TARGET, scope = %self.inner.key, "deferred loss scheduled");
                }
                Effect::Refocus(element) => outgoing.push(Outgoing::Refocus(element)),
                Effect::Notify { target, element } => {
                    let key = target
                        .and_then(|id| core.registry.get(id))
                        .map(|target| target.key.clone());
                    outgoing.push(Outgoing::Notify(FocusChange { key, element }));
                }
            }
        }
        outgoing
    }

    /// Carry out effects that leave the engine. Must run without the lock.
    fn dispatch(&self, outgoing: Vec<Outgoing<E>>) {
        for item in outgoing {
            match item {
                Outgoing::Refocus(element) => {
                    tracing::debug!(target: TARGET, scope = %self.inner.key, ?element, "preserving focus");
                    self.inner.host.focus(&element);
                }
                Outgoing::Notify(change) => {
                    tracing::debug!(target: TARGET, scope = %self.inner.key, key = ?change.key, element = ?change.element, "focus changed");
                    self.inner.changed.emit(change);
                    self.trigger_update();
                }
            }
        }
    }
}

impl<E: Element> fmt::Debug for FocusScope<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FocusScope")
            .field("key", &self.inner.key)
            .field("root", &self.inner.root)
            .field("preserve", &self.inner.preserve)
            .field("state", &self.state())
            .finish()
    }
}

/// Builder for [`FocusScope`].
pub struct FocusScopeBuilder<E: Element> {
    root: E,
    host: Arc<dyn FocusHost<E>>,
    scheduler: Arc<dyn EventScheduler>,
    config: FocusScopeConfig,
    parent: Option<FocusScope<E>>,
    channels: Option<Arc<UpdateChannels<FocusKey>>>,
}

impl<E: Element> FocusScopeBuilder<E> {
    /// Use `config` for the scope options.
    pub fn config(mut self, config: FocusScopeConfig) -> Self {
        self.config = config;
        self
    }

    /// Enable or disable the preserve policy.
    pub fn preserve(mut self, preserve: bool) -> Self {
        self.config.preserve = preserve;
        self
    }

    /// Set the scope key.
    pub fn scope_key(mut self, key: impl Into<FocusKey>) -> Self {
        self.config.scope_key = Some(key.into());
        self
    }

    /// Nest the scope inside `parent`: the new root becomes a target of the
    /// parent, registered under the new scope's key.
    pub fn parent(mut self, parent: &FocusScope<E>) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    /// Trigger the scope key's channel in `channels` on every state change.
    pub fn channels(mut self, channels: Arc<UpdateChannels<FocusKey>>) -> Self {
        self.channels = Some(channels);
        self
    }

    /// Build the scope.
    ///
    /// # Errors
    ///
    /// [`FocusError::DuplicateHandle`](crate::FocusError::DuplicateHandle) if
    /// a parent is set and the root is already registered there.
    pub fn build(self) -> Result<FocusScope<E>> {
        let key = self.config.resolve_key();
        let parent_binding = match &self.parent {
            Some(parent) => Some(parent.register_scoped(self.root.clone(), Some(key.clone()))?),
            None => None,
        };
        tracing::debug!(target: TARGET, scope = %key, root = ?self.root, preserve = self.config.preserve, "scope created");
        Ok(FocusScope {
            inner: Arc::new(ScopeInner {
                key,
                root: self.root,
                preserve: self.config.preserve,
                host: self.host,
                scheduler: self.scheduler,
                channels: self.channels,
                changed: Arc::new(Signal::new()),
                core: Mutex::new(ScopeCore {
                    registry: TargetRegistry::new(),
                    machine: FocusMachine::new(),
                    pointer: PointerTracker::new(),
                    deferred: DeferredResolution::new(),
                }),
                parent_binding: Mutex::new(parent_binding),
            }),
        })
    }

    /// Build the scope nested in the innermost scope of `stack` (if any) and
    /// push it onto the stack.
    pub fn build_in(mut self, stack: &ScopeStack<E>) -> Result<FocusScope<E>> {
        if self.parent.is_none() {
            self.parent = stack.current().ok();
        }
        let scope = self.build()?;
        stack.push(scope.clone());
        Ok(scope)
    }
}

impl<E: Element> fmt::Debug for FocusScopeBuilder<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FocusScopeBuilder")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("parent", &self.parent.as_ref().map(FocusScope::key))
            .finish_non_exhaustive()
    }
}

/// A target registration that lasts as long as this value.
///
/// Dropping the binding deregisters the handle, mirroring a consumer that
/// unmounts. The binding does not keep its scope alive.
pub struct FocusBinding<E: Element> {
    scope: Weak<ScopeInner<E>>,
    handle: E,
    key: FocusKey,
}

impl<E: Element> FocusBinding<E> {
    /// The registered key.
    pub fn key(&self) -> &FocusKey {
        &self.key
    }

    /// The registered element.
    pub fn handle(&self) -> &E {
        &self.handle
    }

    /// The scope this binding belongs to, if it is still alive.
    pub fn scope(&self) -> Option<FocusScope<E>> {
        self.scope.upgrade().map(|inner| FocusScope { inner })
    }

    /// Whether this target is the scope's active target.
    pub fn is_focused(&self) -> bool {
        self.scope()
            .is_some_and(|scope| scope.is_target_focused(&self.handle))
    }
}

impl<E: Element> Drop for FocusBinding<E> {
    fn drop(&mut self) {
        if let Some(scope) = self.scope() {
            scope.deregister(&self.handle);
        }
    }
}

impl<E: Element> fmt::Debug for FocusBinding<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FocusBinding")
            .field("key", &self.key)
            .field("handle", &self.handle)
            .finish()
    }
}
