//! Headless scene graph used by the widgets.
//!
//! Widgets build their look out of [`Node`]s carrying declarative style
//! records, and receive input through [`InputListener`]s attached to those
//! nodes. A [`Display`] owns the root, dispatches input and manages keyboard
//! focus and the popup dismiss slot.

mod debug;
mod display;
mod events;
mod node;

pub use debug::{SceneTreeDebug, TreeFormatOptions, TreeStyle};
pub use display::Display;
pub use events::{FnListener, InputListener, Key, KeyEvent, PointerEvent, PointerId, PointerKind};
pub use node::{ListenerId, Node, NodeId};
