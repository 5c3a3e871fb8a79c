//! Core plumbing for Horizon Focus.
//!
//! This crate provides the host-independent building blocks the focus engine
//! is assembled from:
//!
//! - **Signal/Slot System**: Type-safe change notification ([`Signal`])
//! - **Tick Queue**: Cancelable next-tick deferred tasks ([`TickQueue`])
//! - **One-shot Listeners**: Global registrations that fire at most once ([`OnceListeners`])
//! - **Update Channels**: Channel-keyed re-render hooks ([`UpdateChannels`])
//! - **Logging**: `tracing` targets and performance spans ([`logging`])
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_focus_core::Signal;
//!
//! let focused = Signal::<bool>::new();
//! let conn_id = focused.connect(|is_focused| {
//!     println!("Focused: {}", is_focused);
//! });
//! focused.emit(true);
//! focused.disconnect(conn_id);
//! ```
//!
//! # Tick Queue Example
//!
//! ```
//! use horizon_focus_core::TickQueue;
//!
//! let queue = TickQueue::new();
//! let id = queue.post(|| println!("runs on the next tick"));
//! queue.cancel(id);
//! assert_eq!(queue.run_tick(), 0);
//! ```

pub mod channel;
pub mod logging;
pub mod once;
pub mod signal;
pub mod tick;

pub use channel::{BindingId, UpdateChannels};
pub use logging::PerfSpan;
pub use once::{ListenerId, OnceListener, OnceListeners};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use tick::{BoxedTask, TaskId, TickQueue};
