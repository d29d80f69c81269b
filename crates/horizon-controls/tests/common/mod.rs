//! Helpers shared by the integration tests.

#![allow(dead_code)]

use horizon_controls::prelude::*;
use tracing_subscriber::EnvFilter;

/// Install a test-writer subscriber once per test binary. Filter with
/// `RUST_LOG`, e.g. `RUST_LOG=horizon_controls::combo_box=debug`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

/// A plain rectangle standing in for a text label.
pub fn label(name: &str, width: f32, height: f32) -> Node {
    Node::rectangle(name.to_string(), Rect::new(0.0, 0.0, width, height))
}

pub fn display() -> Display {
    init_tracing();
    Display::new(Size::new(800.0, 600.0))
}
