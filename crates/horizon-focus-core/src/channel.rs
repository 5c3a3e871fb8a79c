//! Channel-keyed update bindings.
//!
//! [`UpdateChannels`] maps a channel identifier to the hooks that want to be
//! told when something on that channel changed. A rendering layer attaches a
//! hook per consumer (typically "schedule a re-render"), and a producer
//! triggers the channel whenever its state changes.
//!
//! Channels have an explicit lifecycle: a channel exists from the first
//! [`attach`](UpdateChannels::attach) until its last binding is
//! [`detach`](UpdateChannels::detach)ed. The registry is an ordinary owned
//! value; share it with `Arc` between the scopes that should see each other's
//! updates.
//!
//! # Example
//!
//! ```
//! use horizon_focus_core::UpdateChannels;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let channels = UpdateChannels::<&'static str>::new();
//! let renders = Arc::new(AtomicUsize::new(0));
//!
//! let renders_clone = renders.clone();
//! let binding = channels.attach("toolbar", move || {
//!     renders_clone.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! assert_eq!(channels.trigger(&"toolbar"), 1);
//! assert_eq!(channels.trigger(&"sidebar"), 0);
//!
//! channels.detach(binding);
//! assert_eq!(channels.channel_count(), 0);
//! assert_eq!(renders.load(Ordering::SeqCst), 1);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use crate::logging::targets;

new_key_type! {
    /// Identifier for a hook attached to a channel.
    pub struct BindingId;
}

type Hook = Arc<dyn Fn() + Send + Sync>;

struct Binding<C> {
    channel: C,
    hook: Hook,
}

struct ChannelsInner<C> {
    bindings: SlotMap<BindingId, Binding<C>>,
    channels: HashMap<C, Vec<BindingId>>,
}

/// Registry of update hooks grouped by channel.
pub struct UpdateChannels<C> {
    inner: Mutex<ChannelsInner<C>>,
}

impl<C> UpdateChannels<C>
where
    C: Clone + Eq + Hash + fmt::Debug,
{
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(ChannelsInner {
                bindings: SlotMap::with_key(),
                channels: HashMap::new(),
            }),
        }
    }

    /// Attach a hook to `channel`, creating the channel if needed.
    pub fn attach<F>(&self, channel: C, hook: F) -> BindingId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock();
        let id = inner.bindings.insert(Binding {
            channel: channel.clone(),
            hook: Arc::new(hook),
        });
        let members = inner.channels.entry(channel).or_default();
        members.push(id);
        tracing::trace!(target: targets::CHANNEL, ?id, bindings = members.len(), "hook attached");
        id
    }

    /// Detach a hook. The channel is discarded once its last hook is gone.
    ///
    /// Returns `false` if the binding was already detached.
    pub fn detach(&self, id: BindingId) -> bool {
        let mut inner = self.inner.lock();
        let Some(binding) = inner.bindings.remove(id) else {
            return false;
        };
        let emptied = match inner.channels.get_mut(&binding.channel) {
            Some(members) => {
                members.retain(|member| *member != id);
                members.is_empty()
            }
            None => false,
        };
        if emptied {
            inner.channels.remove(&binding.channel);
            tracing::trace!(target: targets::CHANNEL, channel = ?binding.channel, "channel discarded");
        }
        true
    }

    /// Invoke every hook attached to `channel`.
    ///
    /// Hooks run after the registry lock is released, so a hook may attach or
    /// detach bindings. Returns the number of hooks invoked.
    pub fn trigger(&self, channel: &C) -> usize {
        let hooks: Vec<Hook> = {
            let inner = self.inner.lock();
            match inner.channels.get(channel) {
                Some(members) => members
                    .iter()
                    .filter_map(|id| inner.bindings.get(*id))
                    .map(|binding| binding.hook.clone())
                    .collect(),
                None => Vec::new(),
            }
        };
        tracing::trace!(target: targets::CHANNEL, ?channel, hooks = hooks.len(), "channel triggered");
        for hook in &hooks {
            hook();
        }
        hooks.len()
    }

    /// Number of live channels.
    pub fn channel_count(&self) -> usize {
        self.inner.lock().channels.len()
    }

    /// Number of hooks attached to `channel`.
    pub fn binding_count(&self, channel: &C) -> usize {
        self.inner
            .lock()
            .channels
            .get(channel)
            .map_or(0, Vec::len)
    }
}

impl<C> Default for UpdateChannels<C>
where
    C: Clone + Eq + Hash + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for UpdateChannels<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("UpdateChannels")
            .field("channels", &inner.channels.len())
            .field("bindings", &inner.bindings.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        (count, move || {
            count_clone.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_channel_created_on_first_attach() {
        let channels = UpdateChannels::<u32>::new();
        assert_eq!(channels.channel_count(), 0);

        let (_, hook) = counter();
        channels.attach(7, hook);
        assert_eq!(channels.channel_count(), 1);
        assert_eq!(channels.binding_count(&7), 1);
    }

    #[test]
    fn test_channel_discarded_when_last_binding_detaches() {
        let channels = UpdateChannels::<u32>::new();
        let (_, first) = counter();
        let (_, second) = counter();
        let a = channels.attach(1, first);
        let b = channels.attach(1, second);

        assert!(channels.detach(a));
        assert_eq!(channels.channel_count(), 1);
        assert!(channels.detach(b));
        assert_eq!(channels.channel_count(), 0);
        assert!(!channels.detach(b));
    }

    #[test]
    fn test_trigger_only_reaches_its_channel() {
        let channels = UpdateChannels::<&'static str>::new();
        let (menu_count, menu_hook) = counter();
        let (list_count, list_hook) = counter();
        channels.attach("menu", menu_hook);
        channels.attach("list", list_hook);

        assert_eq!(channels.trigger(&"menu"), 1);
        assert_eq!(channels.trigger(&"menu"), 1);
        assert_eq!(menu_count.load(Ordering::SeqCst), 2);
        assert_eq!(list_count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_hook_may_detach_during_trigger() {
        let channels = Arc::new(UpdateChannels::<u8>::new());
        let slot = Arc::new(Mutex::new(None::<BindingId>));

        let registry = channels.clone();
        let slot_clone = slot.clone();
        let id = channels.attach(0, move || {
            if let Some(id) = *slot_clone.lock() {
                registry.detach(id);
            }
        });
        *slot.lock() = Some(id);

        assert_eq!(channels.trigger(&0), 1);
        assert_eq!(channels.channel_count(), 0);
    }
}
