//! Interaction states and their derivation.

use std::fmt;

use horizon_controls_core::{Property, PropertyChange, SharedProperty, Subscription};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::model::ButtonModel;

/// The visual/interaction mode of a button. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InteractionState {
    Idle,
    Over,
    Pressed,
    Disabled,
    DisabledPressed,
}

impl InteractionState {
    /// All states, in table order.
    pub const ALL: [Self; 5] = [
        Self::Idle,
        Self::Over,
        Self::Pressed,
        Self::Disabled,
        Self::DisabledPressed,
    ];

    /// Derive the state from raw pointer flags.
    ///
    /// Priority: disabled-pressed, disabled, pressed, over, idle.
    pub fn derive(over: bool, down: bool, enabled: bool) -> Self {
        match (enabled, down, over) {
            (false, true, _) => Self::DisabledPressed,
            (false, false, _) => Self::Disabled,
            (true, true, _) => Self::Pressed,
            (true, false, true) => Self::Over,
            (true, false, false) => Self::Idle,
        }
    }

    /// Position in [`ALL`](Self::ALL).
    pub fn index(self) -> usize {
        match self {
            Self::Idle => 0,
            Self::Over => 1,
            Self::Pressed => 2,
            Self::Disabled => 3,
            Self::DisabledPressed => 4,
        }
    }

    pub fn is_disabled(self) -> bool {
        matches!(self, Self::Disabled | Self::DisabledPressed)
    }

    pub fn is_pressed(self) -> bool {
        matches!(self, Self::Pressed | Self::DisabledPressed)
    }
}

impl fmt::Display for InteractionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Over => "over",
            Self::Pressed => "pressed",
            Self::Disabled => "disabled",
            Self::DisabledPressed => "disabled-pressed",
        })
    }
}

/// Read-only [`InteractionState`] derived from a [`ButtonModel`].
///
/// Recomputed synchronously whenever `over`, `down`, `enabled` or the optional
/// held-down flag changes. Subscribers are notified only when the derived
/// state actually changes.
pub struct InteractionStateProperty {
    state: SharedProperty<InteractionState>,
    inputs: Mutex<Vec<Subscription>>,
}

impl InteractionStateProperty {
    pub fn new(model: &ButtonModel) -> Self {
        Self::build(model, None)
    }

    /// Derive with an extra flag that, while `true`, makes the button look
    /// pressed (the stuck-down look of toggles with a pressed-equivalent
    /// value).
    pub fn with_held_down(model: &ButtonModel, held_down: SharedProperty<bool>) -> Self {
        Self::build(model, Some(held_down))
    }

    fn build(model: &ButtonModel, held_down: Option<SharedProperty<bool>>) -> Self {
        let over = model.over_property().clone();
        let down = model.down_property().clone();
        let enabled = model.enabled_property().clone();

        let compute = {
            let (over, down, enabled, held_down) =
                (over.clone(), down.clone(), enabled.clone(), held_down.clone());
            move || {
                let held = held_down.as_ref().is_some_and(|h| h.get());
                InteractionState::derive(over.get(), down.get() || held, enabled.get())
            }
        };

        let state = Property::new(compute())
            .with_name("interaction_state")
            .into_shared();

        let recompute = {
            let state = state.clone();
            move |_: &PropertyChange<bool>| {
                let next = compute();
                if let Some(previous) = state.replace(next) {
                    tracing::trace!(target: "horizon_controls::button", %previous, %next, "interaction state");
                }
            }
        };
        let recompute = std::sync::Arc::new(recompute);

        let mut inputs = Vec::with_capacity(4);
        for input in [Some(&over), Some(&down), Some(&enabled), held_down.as_ref()]
            .into_iter()
            .flatten()
        {
            let recompute = recompute.clone();
            inputs.push(input.subscribe(move |change| recompute(change)));
        }

        Self {
            state,
            inputs: Mutex::new(inputs),
        }
    }

    pub fn get(&self) -> InteractionState {
        self.state.get()
    }

    /// Call `listener` now and on every state change.
    pub fn link<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&InteractionState) + Send + Sync + 'static,
    {
        self.state.link(listener)
    }

    /// Call `listener` on every state change.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&PropertyChange<InteractionState>) + Send + Sync + 'static,
    {
        self.state.subscribe(listener)
    }

    /// Stop following the model. The state keeps its last value.
    pub fn unbind(&self) {
        self.inputs.lock().clear();
    }

    /// The underlying property.
    pub fn property(&self) -> &SharedProperty<InteractionState> {
        &self.state
    }
}

impl fmt::Debug for InteractionStateProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionStateProperty")
            .field("state", &self.get())
            .finish()
    }
}

static_assertions::assert_impl_all!(InteractionStateProperty: Send, Sync);
