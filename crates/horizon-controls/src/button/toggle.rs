//! Two-valued toggle buttons.

use std::fmt;
use std::sync::{Arc, Weak};

use horizon_controls_core::{Property, SharedProperty, Signal, Subscription};
use parking_lot::Mutex;

use super::model::ButtonModel;
use crate::error::{ControlError, ControlResult};

/// Values a toggle can switch between.
pub trait ToggleValue: Clone + PartialEq + Send + Sync + fmt::Debug + 'static {}

impl<T> ToggleValue for T where T: Clone + PartialEq + Send + Sync + fmt::Debug + 'static {}

pub(crate) fn check_pair<T: ToggleValue>(first: &T, second: &T, cell: &SharedProperty<T>) -> ControlResult<()> {
    if first == second {
        return Err(ControlError::IndistinctToggleValues);
    }
    let current = cell.get();
    if current != *first && current != *second {
        return Err(ControlError::UnknownToggleValue {
            value: format!("{current:?}"),
        });
    }
    Ok(())
}

/// A button that flips a shared cell between two values on every fire.
///
/// The cell belongs to the caller: the model sets it but never drops or
/// resets it, and disposal leaves its value untouched.
///
/// # Example
///
/// ```
/// use horizon_controls::button::ToggleButtonModel;
/// use horizon_controls_core::Property;
///
/// let sound = Property::shared("off");
/// let model = ToggleButtonModel::new("off", "on", sound.clone()).unwrap();
///
/// model.button_model().fire().unwrap();
/// assert_eq!(sound.get(), "on");
/// ```
pub struct ToggleButtonModel<T: ToggleValue> {
    button: ButtonModel,
    value_off: T,
    value_on: T,
    cell: SharedProperty<T>,
    held_down: Option<SharedProperty<bool>>,
    toggled: Signal<T>,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl<T: ToggleValue> ToggleButtonModel<T> {
    /// A fire-on-up toggle without a pressed-equivalent value.
    pub fn new(value_off: T, value_on: T, cell: SharedProperty<T>) -> ControlResult<Arc<Self>> {
        Self::with_options(value_off, value_on, cell, None, false)
    }

    /// A toggle that looks pressed while the cell holds `pressed_value`.
    pub fn with_pressed_value(
        value_off: T,
        value_on: T,
        cell: SharedProperty<T>,
        pressed_value: T,
    ) -> ControlResult<Arc<Self>> {
        Self::with_options(value_off, value_on, cell, Some(pressed_value), false)
    }

    pub fn with_options(
        value_off: T,
        value_on: T,
        cell: SharedProperty<T>,
        pressed_value: Option<T>,
        fire_on_down: bool,
    ) -> ControlResult<Arc<Self>> {
        check_pair(&value_off, &value_on, &cell)?;
        if let Some(pressed) = &pressed_value
            && *pressed != value_off
            && *pressed != value_on
        {
            return Err(ControlError::UnknownToggleValue {
                value: format!("{pressed:?}"),
            });
        }

        let held_down = pressed_value.as_ref().map(|pressed| {
            Property::new(cell.get() == *pressed)
                .with_name("held_down")
                .into_shared()
        });

        Ok(Arc::new_cyclic(|weak: &Weak<Self>| {
            let button = ButtonModel::new(fire_on_down);
            let mut subscriptions = Vec::with_capacity(2);

            let weak_model = weak.clone();
            subscriptions.push(button.fired().subscribe(move |_| {
                if let Some(model) = weak_model.upgrade() {
                    model.toggle();
                }
            }));

            let (off, on, held) = (value_off.clone(), value_on.clone(), held_down.clone());
            subscriptions.push(cell.subscribe(move |change| {
                if change.new != off && change.new != on {
                    tracing::warn!(
                        target: "horizon_controls::button",
                        value = ?change.new,
                        "toggle cell set to a value outside its pair"
                    );
                }
                if let (Some(held), Some(pressed)) = (&held, &pressed_value) {
                    held.set(change.new == *pressed);
                }
            }));

            Self {
                button,
                value_off,
                value_on,
                cell,
                held_down,
                toggled: Signal::new(),
                subscriptions: Mutex::new(subscriptions),
            }
        }))
    }

    fn toggle(&self) {
        let current = self.cell.get();
        let next = if current == self.value_on {
            self.value_off.clone()
        } else if current == self.value_off {
            self.value_on.clone()
        } else {
            tracing::warn!(
                target: "horizon_controls::button",
                value = ?current,
                "toggle cell holds a value outside its pair, switching on"
            );
            self.value_on.clone()
        };
        tracing::debug!(target: "horizon_controls::button", value = ?next, "toggled");
        self.cell.set(next.clone());
        self.toggled.emit(next);
    }

    pub fn button_model(&self) -> &ButtonModel {
        &self.button
    }

    pub fn value(&self) -> T {
        self.cell.get()
    }

    pub fn is_on(&self) -> bool {
        self.cell.get() == self.value_on
    }

    pub fn value_off(&self) -> &T {
        &self.value_off
    }

    pub fn value_on(&self) -> &T {
        &self.value_on
    }

    pub fn cell(&self) -> &SharedProperty<T> {
        &self.cell
    }

    /// `true` while the cell holds the pressed-equivalent value. `None` if no
    /// such value was configured.
    pub fn held_down(&self) -> Option<&SharedProperty<bool>> {
        self.held_down.as_ref()
    }

    /// Emitted with the new value after every toggle.
    pub fn toggled(&self) -> &Signal<T> {
        &self.toggled
    }

    /// Release the button model and detach from the cell.
    pub fn dispose(&self) -> ControlResult<()> {
        self.button.dispose()?;
        self.subscriptions.lock().clear();
        self.toggled.disconnect_all();
        Ok(())
    }
}

impl<T: ToggleValue> fmt::Debug for ToggleButtonModel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToggleButtonModel")
            .field("value", &self.cell.get())
            .field("value_off", &self.value_off)
            .field("value_on", &self.value_on)
            .field("button", &self.button)
            .finish()
    }
}

static_assertions::assert_impl_all!(ToggleButtonModel<bool>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Mode {
        Slow,
        Fast,
        Paused,
    }

    #[test]
    fn test_fires_alternate_between_values() {
        let cell = Property::shared(Mode::Slow);
        let model = ToggleButtonModel::new(Mode::Slow, Mode::Fast, cell.clone()).unwrap();

        let mut seen = Vec::new();
        for _ in 0..5 {
            model.button_model().fire().unwrap();
            seen.push(cell.get());
        }
        assert_eq!(
            seen,
            vec![Mode::Fast, Mode::Slow, Mode::Fast, Mode::Slow, Mode::Fast]
        );
    }

    #[test]
    fn test_pointer_click_toggles() {
        let cell = Property::shared(false);
        let model = ToggleButtonModel::new(false, true, cell.clone()).unwrap();
        let button = model.button_model();

        button.pointer_enter().unwrap();
        button.pointer_down().unwrap();
        assert!(!cell.get());
        button.pointer_up().unwrap();
        assert!(cell.get());
    }

    #[test]
    fn test_rejects_bad_configuration() {
        let cell = Property::shared(Mode::Slow);
        assert_eq!(
            ToggleButtonModel::new(Mode::Slow, Mode::Slow, cell.clone()).unwrap_err(),
            ControlError::IndistinctToggleValues
        );
        assert!(matches!(
            ToggleButtonModel::new(Mode::Fast, Mode::Paused, cell).unwrap_err(),
            ControlError::UnknownToggleValue { .. }
        ));
    }

    #[test]
    fn test_third_value_is_replaced_by_on() {
        let cell = Property::shared(Mode::Slow);
        let model = ToggleButtonModel::new(Mode::Slow, Mode::Fast, cell.clone()).unwrap();
        cell.set(Mode::Paused);
        model.button_model().fire().unwrap();
        assert_eq!(cell.get(), Mode::Fast);
    }

    #[test]
    fn test_held_down_follows_cell() {
        let cell = Property::shared(false);
        let model = ToggleButtonModel::with_pressed_value(false, true, cell.clone(), true).unwrap();
        let held = model.held_down().unwrap().clone();

        assert!(!held.get());
        model.button_model().fire().unwrap();
        assert!(held.get());
        cell.set(false);
        assert!(!held.get());
    }

    #[test]
    fn test_toggled_signal() {
        let cell = Property::shared(0u8);
        let model = ToggleButtonModel::new(0, 1, cell).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let _sub = model.toggled().subscribe(move |v| seen_clone.lock().push(*v));

        model.button_model().fire().unwrap();
        model.button_model().fire().unwrap();
        assert_eq!(*seen.lock(), vec![1, 0]);
    }

    #[test]
    fn test_dispose_leaves_cell_alone() {
        let cell = Property::shared(true);
        let model = ToggleButtonModel::new(false, true, cell.clone()).unwrap();
        model.dispose().unwrap();

        assert!(cell.get());
        assert_eq!(cell.subscriber_count(), 0);
        assert!(model.button_model().fire().is_err());
        assert!(model.dispose().is_err());
    }
}
