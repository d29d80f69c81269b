//! Buttons: pointer state machine, toggle models, state derivation and
//! appearance.
//!
//! A [`Button`] is a composition rather than a hierarchy:
//!
//! - a [`ButtonBehavior`] (a plain [`ButtonModel`], a [`ToggleButtonModel`]
//!   or a [`StickyToggleButtonModel`]) decides what activation does,
//! - an [`InteractionStateProperty`] derives one of five
//!   [`InteractionState`]s from the model,
//! - an [`AppearanceStrategy`] precomputes a style per state, which an
//!   [`AppearanceBinder`] applies to the button's nodes.

mod appearance;
mod model;
mod options;
mod state;
mod sticky;
mod toggle;
mod widget;

pub use appearance::{
    AppearanceBinder, AppearanceColors, AppearanceStrategy, ContentFade, FlatAppearance, StyleRecord,
    StyleTable, ThreeDAppearance,
};
pub use model::ButtonModel;
pub use options::{AppearanceKind, ButtonOptions, ButtonShape};
pub use state::{InteractionState, InteractionStateProperty};
pub use sticky::{MidpointToggle, StickyToggleButtonModel};
pub use toggle::{ToggleButtonModel, ToggleValue};
pub use widget::{Button, ButtonBehavior};

pub(crate) use widget::ButtonInput;
