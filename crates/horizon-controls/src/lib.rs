//! Horizon Controls - interactive widgets on a headless scene graph.
//!
//! The crate is organized in three layers:
//!
//! - [`scene`]: nodes, pointer and key events, and the [`Display`](scene::Display)
//!   that dispatches input, tracks focus and owns the popup dismiss slot
//! - [`button`]: the button model, toggle variants, interaction-state
//!   derivation and appearance strategies
//! - [`widgets`]: combo box, on/off switch, check boxes, accordion box and
//!   slider
//!
//! # Example
//!
//! ```
//! use horizon_controls::prelude::*;
//!
//! let display = Display::new(Size::new(200.0, 100.0));
//! let checked = Property::shared(false);
//! let label = Node::rectangle("label", Rect::new(0.0, 0.0, 40.0, 12.0));
//! let check_box = CheckBox::new(label, checked.clone(), CheckBoxOptions::default()).unwrap();
//! display.root().add_child(check_box.node());
//!
//! display.click(Point::new(5.0, 5.0));
//! assert!(checked.get());
//! ```

pub mod button;
mod error;
pub mod prelude;
pub mod scene;
pub mod widgets;

pub use error::{ControlError, ControlResult};
