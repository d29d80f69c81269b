//! Composite widgets built on the button stack and the scene graph.

mod accordion_box;
mod checkbox;
mod checkbox_group;
mod combo_box;
mod on_off_switch;
mod slider;

pub use accordion_box::{AccordionBox, AccordionBoxOptions, ButtonAlign};
pub use checkbox::{CheckBox, CheckBoxOptions};
pub use checkbox_group::{CheckBoxGroupOptions, VerticalCheckBoxGroup};
pub use combo_box::{ComboBox, ComboBoxItem, ComboBoxOptions, ComboBoxValue, ListPosition};
pub use on_off_switch::{OnOffSwitch, OnOffSwitchOptions};
pub use slider::{HSlider, SliderOptions};
