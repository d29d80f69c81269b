//! Commonly used types, for glob import:
//!
//! ```
//! use horizon_controls::prelude::*;
//! ```

// ============================================================================
// Reactive primitives and geometry
// ============================================================================

pub use horizon_controls_core::{Property, SharedProperty, Signal, Subscription};
pub use horizon_controls_render::{Color, Paint, Point, Rect, Size, Stroke};

// ============================================================================
// Scene
// ============================================================================

pub use crate::scene::{Display, InputListener, Key, KeyEvent, Node, NodeId, PointerEvent, PointerId, PointerKind};

// ============================================================================
// Buttons
// ============================================================================

pub use crate::button::{
    AppearanceKind, Button, ButtonModel, ButtonOptions, ButtonShape, InteractionState, StickyToggleButtonModel,
    ToggleButtonModel,
};

// ============================================================================
// Widgets
// ============================================================================

pub use crate::widgets::{
    AccordionBox, AccordionBoxOptions, CheckBox, CheckBoxGroupOptions, CheckBoxOptions, ComboBox, ComboBoxItem,
    ComboBoxOptions, HSlider, ListPosition, OnOffSwitch, OnOffSwitchOptions, SliderOptions, VerticalCheckBoxGroup,
};

pub use crate::{ControlError, ControlResult};
