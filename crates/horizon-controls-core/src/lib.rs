//! Core systems for Horizon Controls.
//!
//! This crate provides the reactive plumbing the widget crate is built on:
//!
//! - **Signal/Slot System**: ordered, synchronous, re-entrant notification
//! - **Subscriptions**: RAII handles that disconnect on drop
//! - **Property System**: shared observable cells with change detection and
//!   optional validation
//! - **Logging**: `tracing` targets, span names and helper macros
//!
//! # Example
//!
//! ```
//! use horizon_controls_core::{Property, Signal};
//!
//! let fired = Signal::<()>::new();
//! let count = Property::shared(0u32);
//!
//! let counter = count.clone();
//! let _subscription = fired.subscribe(move |_| {
//!     counter.set(counter.get() + 1);
//! });
//!
//! fired.emit(());
//! fired.emit(());
//! assert_eq!(count.get(), 2);
//! ```

mod error;
pub mod logging;
pub mod property;
pub mod signal;

pub use error::{PropertyError, PropertyResult};
pub use logging::PerfSpan;
pub use property::{Property, PropertyChange, SharedProperty};
pub use signal::{ConnectionId, Signal, Subscription};
