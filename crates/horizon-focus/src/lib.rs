//! Focus tracking and preservation for composite UI regions.
//!
//! A region (a toolbar, a list, a dialog) creates one [`FocusScope`] at its
//! root. Sub-elements register as named targets, and the scope reports which
//! target currently holds input focus:
//!
//! - **Resolution**: a focused element maps to the innermost registered
//!   target that contains it.
//! - **Deferred loss**: focus leaving the root is only confirmed on the next
//!   tick, so moves between siblings never report an intermediate `None`.
//! - **Preservation**: with `preserve` enabled, focus leaving the root while
//!   a pointer is held inside it is pulled back to the active target, and
//!   restored once more when the pointer is released.
//! - **Nesting**: a scope built with a parent registers its root in the
//!   parent under its own key.
//!
//! The engine is host agnostic. The host answers containment queries and
//! moves real focus through [`FocusHost`], schedules deferred work through
//! an [`EventScheduler`] (see [`FrameScheduler`]), and forwards capturing
//! focus and pointer events to the scope.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_focus::{FocusHost, FocusInEvent, FocusScope, FrameScheduler};
//!
//! struct Flat;
//! impl FocusHost<&'static str> for Flat {
//!     fn contains(&self, ancestor: &&'static str, node: &&'static str) -> bool {
//!         *ancestor == "toolbar" || ancestor == node
//!     }
//!     fn focus(&self, _element: &&'static str) {}
//! }
//!
//! let scope = FocusScope::builder("toolbar", Arc::new(Flat), Arc::new(FrameScheduler::new()))
//!     .preserve(true)
//!     .build()?;
//! scope.register("bold", "bold")?;
//! scope.subscribe(|change| println!("active target: {:?}", change.key));
//!
//! scope.on_focus_in(&FocusInEvent::new("bold"));
//! assert!(scope.is_target_focused(&"bold"));
//! # Ok::<(), horizon_focus::FocusError>(())
//! ```

pub mod config;
pub mod context;
pub mod deferred;
pub mod error;
pub mod event;
pub mod host;
pub mod key;
pub mod local;
pub mod machine;
pub mod pointer;
pub mod registry;
pub mod resolver;
pub mod scope;

pub use config::FocusScopeConfig;
pub use context::ScopeStack;
pub use error::{FocusError, Result};
pub use event::{FocusChange, FocusInEvent, FocusOutEvent};
pub use host::{DeferredTask, Element, EventScheduler, FocusHost, FrameScheduler, PointerUpListener};
pub use key::FocusKey;
pub use local::LocalFocus;
pub use machine::FocusPhase;
pub use registry::{Target, TargetId, TargetRegistry};
pub use scope::{FocusBinding, FocusScope, FocusScopeBuilder, ScopeState};

pub use horizon_focus_core::{ConnectionGuard, ConnectionId, UpdateChannels};

/// Prelude for hosts embedding the engine.
pub mod prelude {
    pub use crate::{
        EventScheduler, FocusBinding, FocusChange, FocusError, FocusHost, FocusInEvent, FocusKey,
        FocusOutEvent, FocusScope, FocusScopeConfig, FrameScheduler, LocalFocus, ScopeStack,
        ScopeState,
    };
}
