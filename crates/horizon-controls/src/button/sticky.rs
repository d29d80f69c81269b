//! Sticky toggles and the midpoint release rule.

use std::fmt;
use std::sync::{Arc, Weak};

use horizon_controls_core::{Property, SharedProperty, Subscription};
use parking_lot::Mutex;

use super::model::ButtonModel;
use super::toggle::{ToggleValue, check_pair};
use crate::error::{ControlError, ControlResult};

/// The release rule of a two-position gesture.
///
/// A gesture starts at one side. While it runs, the indicator position is
/// reported side by side; the first time it differs from the starting side,
/// the midpoint counts as crossed and stays latched until the next gesture.
/// At release, an uncrossed gesture flips the value and a crossed one snaps
/// to the side the indicator rests on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MidpointToggle {
    active: bool,
    start_on: bool,
    position_on: bool,
    crossed: bool,
}

impl MidpointToggle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a gesture from the given side.
    pub fn begin(&mut self, on: bool) {
        *self = Self {
            active: true,
            start_on: on,
            position_on: on,
            crossed: false,
        };
    }

    /// Report the side the indicator is currently on. Returns whether the
    /// side changed.
    pub fn track(&mut self, on: bool) -> bool {
        if !self.active {
            return false;
        }
        let changed = self.position_on != on;
        self.position_on = on;
        if on != self.start_on {
            self.crossed = true;
        }
        changed
    }

    /// End the gesture and return the resulting side, or `None` if no
    /// gesture was running.
    pub fn finish(&mut self) -> Option<bool> {
        if !self.active {
            return None;
        }
        self.active = false;
        Some(if self.crossed {
            self.position_on
        } else {
            !self.start_on
        })
    }

    /// Abandon the gesture. Returns the starting side if one was running.
    pub fn cancel(&mut self) -> Option<bool> {
        let was_active = self.active;
        self.active = false;
        was_active.then_some(self.start_on)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the current (or last) gesture crossed the midpoint.
    pub fn crossed_midpoint(&self) -> bool {
        self.crossed
    }

    /// The side the indicator is on.
    pub fn position(&self) -> bool {
        self.position_on
    }
}

/// A toggle that stays pressed while its cell holds `value_down`.
///
/// A press starts a [`MidpointToggle`] gesture and a fire completes it, so a
/// plain click always flips the value. [`drag_to`](Self::drag_to) reports
/// the indicator position for drag-capable callers. A release outside the
/// button cancels the gesture and leaves the value as it was before the
/// press.
pub struct StickyToggleButtonModel<T: ToggleValue> {
    button: ButtonModel,
    value_up: T,
    value_down: T,
    cell: SharedProperty<T>,
    held_down: SharedProperty<bool>,
    gesture: Mutex<MidpointToggle>,
    toggle_while_dragging: bool,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl<T: ToggleValue> StickyToggleButtonModel<T> {
    pub fn new(value_up: T, value_down: T, cell: SharedProperty<T>) -> ControlResult<Arc<Self>> {
        Self::with_toggle_while_dragging(value_up, value_down, cell, false)
    }

    /// With `toggle_while_dragging`, the cell follows the indicator side live
    /// during a drag instead of only at release.
    pub fn with_toggle_while_dragging(
        value_up: T,
        value_down: T,
        cell: SharedProperty<T>,
        toggle_while_dragging: bool,
    ) -> ControlResult<Arc<Self>> {
        check_pair(&value_up, &value_down, &cell)?;
        let held_down = Property::new(cell.get() == value_down)
            .with_name("held_down")
            .into_shared();

        Ok(Arc::new_cyclic(|weak: &Weak<Self>| {
            let button = ButtonModel::new(false);
            let mut subscriptions = Vec::with_capacity(4);

            let w = weak.clone();
            subscriptions.push(button.pressed().subscribe(move |_| {
                if let Some(model) = w.upgrade() {
                    model.begin_gesture();
                }
            }));
            let w = weak.clone();
            subscriptions.push(button.fired().subscribe(move |_| {
                if let Some(model) = w.upgrade() {
                    model.complete_gesture();
                }
            }));
            let w = weak.clone();
            subscriptions.push(button.released().subscribe(move |&fired| {
                if !fired && let Some(model) = w.upgrade() {
                    model.cancel_gesture();
                }
            }));

            let (down, held) = (value_down.clone(), held_down.clone());
            subscriptions.push(cell.subscribe(move |change| {
                held.set(change.new == down);
            }));

            Self {
                button,
                value_up,
                value_down,
                cell,
                held_down,
                gesture: Mutex::new(MidpointToggle::new()),
                toggle_while_dragging,
                subscriptions: Mutex::new(subscriptions),
            }
        }))
    }

    // =========================================================================
    // Gesture
    // =========================================================================

    /// Start a gesture at the current value.
    pub fn press(&self) -> ControlResult<()> {
        self.ensure_live()?;
        self.begin_gesture();
        Ok(())
    }

    /// Report the indicator position as a fraction of its travel, `0.0` at
    /// `value_up` and `1.0` at `value_down`. Beyond `0.5` counts as down.
    pub fn drag_to(&self, fraction: f32) -> ControlResult<()> {
        self.ensure_live()?;
        let down = fraction > 0.5;
        let changed = self.gesture.lock().track(down);
        if changed && self.toggle_while_dragging {
            self.cell.set(self.side_value(down));
        }
        Ok(())
    }

    /// Complete the gesture.
    pub fn release(&self) -> ControlResult<()> {
        self.ensure_live()?;
        self.complete_gesture();
        Ok(())
    }

    /// Abandon the gesture, restoring the value it started from.
    pub fn cancel(&self) -> ControlResult<()> {
        self.ensure_live()?;
        self.cancel_gesture();
        Ok(())
    }

    fn begin_gesture(&self) {
        // A press on a disabled button goes down without starting a gesture.
        if !self.button.is_enabled() {
            return;
        }
        let down = self.is_down_value();
        self.gesture.lock().begin(down);
        tracing::debug!(target: "horizon_controls::button", down, "sticky gesture started");
    }

    fn complete_gesture(&self) {
        let result = {
            let mut gesture = self.gesture.lock();
            match gesture.finish() {
                Some(down) => down,
                // Keyboard or programmatic fire: flip.
                None => !self.is_down_value(),
            }
        };
        tracing::debug!(
            target: "horizon_controls::button",
            down = result,
            crossed = self.crossed_midpoint(),
            "sticky gesture released"
        );
        self.cell.set(self.side_value(result));
    }

    fn cancel_gesture(&self) {
        let start = self.gesture.lock().cancel();
        if let Some(down) = start {
            tracing::debug!(target: "horizon_controls::button", "sticky gesture cancelled");
            self.cell.set(self.side_value(down));
        }
    }

    fn side_value(&self, down: bool) -> T {
        if down {
            self.value_down.clone()
        } else {
            self.value_up.clone()
        }
    }

    fn is_down_value(&self) -> bool {
        self.cell.get() == self.value_down
    }

    // =========================================================================
    // State
    // =========================================================================

    pub fn button_model(&self) -> &ButtonModel {
        &self.button
    }

    pub fn value(&self) -> T {
        self.cell.get()
    }

    pub fn value_up(&self) -> &T {
        &self.value_up
    }

    pub fn value_down(&self) -> &T {
        &self.value_down
    }

    pub fn cell(&self) -> &SharedProperty<T> {
        &self.cell
    }

    /// Whether the current (or last) gesture crossed the midpoint.
    pub fn crossed_midpoint(&self) -> bool {
        self.gesture.lock().crossed_midpoint()
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.lock().is_active()
    }

    pub fn toggle_while_dragging(&self) -> bool {
        self.toggle_while_dragging
    }

    /// `true` while the cell holds `value_down`.
    pub fn held_down(&self) -> &SharedProperty<bool> {
        &self.held_down
    }

    pub fn dispose(&self) -> ControlResult<()> {
        self.button.dispose()?;
        self.subscriptions.lock().clear();
        self.gesture.lock().cancel();
        Ok(())
    }

    fn ensure_live(&self) -> ControlResult<()> {
        if self.button.is_disposed() {
            Err(ControlError::Disposed {
                widget: "StickyToggleButtonModel",
            })
        } else {
            Ok(())
        }
    }
}

impl<T: ToggleValue> fmt::Debug for StickyToggleButtonModel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StickyToggleButtonModel")
            .field("value", &self.cell.get())
            .field("value_up", &self.value_up)
            .field("value_down", &self.value_down)
            .field("gesture", &*self.gesture.lock())
            .finish()
    }
}

static_assertions::assert_impl_all!(StickyToggleButtonModel<bool>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Play {
        Running,
        Paused,
    }

    fn setup() -> (SharedProperty<Play>, Arc<StickyToggleButtonModel<Play>>) {
        let cell = Property::shared(Play::Running);
        let model = StickyToggleButtonModel::new(Play::Running, Play::Paused, cell.clone()).unwrap();
        (cell, model)
    }

    #[test]
    fn test_midpoint_rule() {
        let mut gesture = MidpointToggle::new();
        gesture.begin(false);
        assert_eq!(gesture.finish(), Some(true));

        gesture.begin(false);
        gesture.track(true);
        gesture.track(false);
        assert_eq!(gesture.finish(), Some(false));
        assert!(gesture.crossed_midpoint());

        gesture.begin(true);
        assert!(!gesture.crossed_midpoint());
        gesture.track(false);
        assert_eq!(gesture.finish(), Some(false));
        assert_eq!(gesture.finish(), None);
    }

    #[test]
    fn test_press_release_without_crossing_flips() {
        let (cell, model) = setup();
        model.press().unwrap();
        model.release().unwrap();
        assert_eq!(cell.get(), Play::Paused);
        assert!(!model.crossed_midpoint());
    }

    #[test]
    fn test_round_trip_drag_keeps_value() {
        let (cell, model) = setup();
        model.press().unwrap();
        model.drag_to(0.8).unwrap();
        model.drag_to(0.2).unwrap();
        model.release().unwrap();
        assert_eq!(cell.get(), Play::Running);
        assert!(model.crossed_midpoint());
    }

    #[test]
    fn test_drag_across_snaps_to_resting_side() {
        let (cell, model) = setup();
        model.press().unwrap();
        model.drag_to(1.0).unwrap();
        assert_eq!(cell.get(), Play::Running);
        model.release().unwrap();
        assert_eq!(cell.get(), Play::Paused);
    }

    #[test]
    fn test_toggle_while_dragging_follows_indicator() {
        let cell = Property::shared(false);
        let model = StickyToggleButtonModel::with_toggle_while_dragging(false, true, cell.clone(), true).unwrap();
        model.press().unwrap();
        model.drag_to(0.9).unwrap();
        assert!(cell.get());
        model.drag_to(0.1).unwrap();
        assert!(!cell.get());
        model.cancel().unwrap();
        assert!(!cell.get());
    }

    #[test]
    fn test_button_click_drives_gesture() {
        let (cell, model) = setup();
        let button = model.button_model();

        button.pointer_enter().unwrap();
        button.pointer_down().unwrap();
        assert!(model.is_dragging());
        button.pointer_up().unwrap();
        assert_eq!(cell.get(), Play::Paused);
        assert!(model.held_down().get());

        // Release outside: cancelled, value untouched.
        button.pointer_down().unwrap();
        button.pointer_exit().unwrap();
        button.pointer_up().unwrap();
        assert_eq!(cell.get(), Play::Paused);
        assert!(!model.is_dragging());
    }

    #[test]
    fn test_disabled_press_starts_no_gesture() {
        let (cell, model) = setup();
        let button = model.button_model();

        button.set_enabled(false).unwrap();
        button.pointer_enter().unwrap();
        button.pointer_down().unwrap();
        assert!(button.is_down());
        assert!(!model.is_dragging());
        button.pointer_up().unwrap();
        assert_eq!(cell.get(), Play::Running);

        // Re-enabled mid-press, the release flips like a click.
        button.pointer_down().unwrap();
        button.set_enabled(true).unwrap();
        button.pointer_up().unwrap();
        assert_eq!(cell.get(), Play::Paused);
    }

    #[test]
    fn test_keyboard_fire_flips() {
        let (cell, model) = setup();
        model.button_model().fire().unwrap();
        assert_eq!(cell.get(), Play::Paused);
        model.button_model().fire().unwrap();
        assert_eq!(cell.get(), Play::Running);
    }

    #[test]
    fn test_disposed_model_rejects_gestures() {
        let (cell, model) = setup();
        model.dispose().unwrap();
        assert!(model.press().is_err());
        assert_eq!(cell.get(), Play::Running);
        assert_eq!(cell.subscriber_count(), 0);
    }
}
