//! Logging facilities for Horizon Controls.
//!
//! Horizon Controls logs through the `tracing` crate and never installs a
//! subscriber itself. To see logs, install one in the application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_controls=debug")
//!     .init();
//! ```
//!
//! The [`targets`] module lists every target used across the workspace so
//! filters can be written per subsystem.

/// Span names used throughout Horizon Controls.
pub mod span_names {
    /// Pointer event dispatch through a display.
    pub const POINTER_DISPATCH: &str = "horizon_controls::pointer_dispatch";
    /// Keyboard event dispatch through a display.
    pub const KEY_DISPATCH: &str = "horizon_controls::key_dispatch";
    /// Popup placement and opening.
    pub const POPUP_OPEN: &str = "horizon_controls::popup_open";
    /// Widget layout pass.
    pub const LAYOUT: &str = "horizon_controls::layout";
}

/// Target names for log filtering.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "horizon_controls_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_controls_core::signal";
    /// Property system target.
    pub const PROPERTY: &str = "horizon_controls_core::property";
    /// Display dispatch, focus and dismiss slot.
    pub const DISPLAY: &str = "horizon_controls::display";
    /// Scene graph nodes.
    pub const SCENE: &str = "horizon_controls::scene";
    /// Button models, derivation and appearance.
    pub const BUTTON: &str = "horizon_controls::button";
    /// Combo box popup protocol.
    pub const COMBO_BOX: &str = "horizon_controls::combo_box";
    /// Other widgets (switches, check boxes, accordion boxes, sliders).
    pub const WIDGET: &str = "horizon_controls::widget";
    /// Performance spans.
    pub const PERF: &str = "horizon_controls::perf";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Useful for measuring the duration of a dispatch or layout pass.
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Enter a new performance span for `name`.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: "horizon_controls::perf", "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}

#[doc(hidden)]
pub use tracing as __tracing;

/// Trace-level event on the core target.
#[macro_export]
macro_rules! controls_trace {
    ($($arg:tt)*) => {
        $crate::logging::__tracing::trace!(target: "horizon_controls_core", $($arg)*)
    };
}

/// Debug-level event on the core target.
#[macro_export]
macro_rules! controls_debug {
    ($($arg:tt)*) => {
        $crate::logging::__tracing::debug!(target: "horizon_controls_core", $($arg)*)
    };
}

/// Warn-level event on the core target.
#[macro_export]
macro_rules! controls_warn {
    ($($arg:tt)*) => {
        $crate::logging::__tracing::warn!(target: "horizon_controls_core", $($arg)*)
    };
}

/// Error-level event on the core target.
#[macro_export]
macro_rules! controls_error {
    ($($arg:tt)*) => {
        $crate::logging::__tracing::error!(target: "horizon_controls_core", $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_span_enters_and_drops() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let span = PerfSpan::new(span_names::LAYOUT);
        drop(span);
    }

    #[test]
    fn test_macros_expand() {
        crate::controls_trace!("trace {}", 1);
        crate::controls_debug!(value = 2, "debug");
        crate::controls_warn!("warn");
        crate::controls_error!("error");
    }

    #[test]
    fn test_targets_are_namespaced() {
        for target in [
            targets::SIGNAL,
            targets::PROPERTY,
            targets::DISPLAY,
            targets::BUTTON,
            targets::COMBO_BOX,
        ] {
            assert!(target.starts_with("horizon_controls"));
        }
    }
}
