//! Logging facilities for Horizon Focus.
//!
//! Horizon Focus uses the `tracing` crate for instrumentation. The library
//! never installs a subscriber; to see logs, install one in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("horizon_focus=debug")
//!         .init();
//! }
//! ```

/// Span names used throughout Horizon Focus for tracing.
pub mod span_names {
    /// Tick processing span.
    pub const TICK: &str = "horizon_focus::tick";
    /// Confirmation of a deferred focus loss.
    pub const DEFERRED_LOSS: &str = "horizon_focus::deferred_loss";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core plumbing target.
    pub const CORE: &str = "horizon_focus_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_focus_core::signal";
    /// Next-tick task queue target.
    pub const TICK: &str = "horizon_focus_core::tick";
    /// One-shot listener target.
    pub const ONCE: &str = "horizon_focus_core::once";
    /// Update channel target.
    pub const CHANNEL: &str = "horizon_focus_core::channel";
    /// Performance spans.
    pub const PERF: &str = "horizon_focus::perf";
}

/// A guard for performance tracing spans.
///
/// Enters an `info`-level span on creation and exits it when dropped.
///
/// ```
/// use horizon_focus_core::logging::PerfSpan;
///
/// {
///     let _span = PerfSpan::new("resolve_containment");
///     // ...work...
/// }
/// ```
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create and enter a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_focus::perf", "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}

impl std::fmt::Debug for PerfSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerfSpan").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_span_with_subscriber() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let _span = PerfSpan::new("test_operation");
        tracing::debug!(target: targets::CORE, "inside perf span");
    }

    #[test]
    fn test_targets_share_prefix() {
        for target in [targets::SIGNAL, targets::TICK, targets::ONCE, targets::CHANNEL] {
            assert!(target.starts_with(targets::CORE), "{target} outside core prefix");
        }
    }
}
