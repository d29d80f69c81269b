//! The pointer state machine shared by every button.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use horizon_controls_core::{Property, SharedProperty, Signal, Subscription};
use parking_lot::Mutex;

use crate::error::{ControlError, ControlResult};

/// Tracks `over`, `down` and `enabled` for one button and decides when it
/// fires.
///
/// With fire-on-up (the default) the button fires when a press is released
/// while the pointer is still over it and the button is enabled. With
/// fire-on-down it fires at the press. The policy is fixed at construction.
///
/// All flags are updated before [`fired`](Self::fired) is emitted, so a fire
/// handler always observes consistent state.
///
/// # Example
///
/// ```
/// use horizon_controls::button::ButtonModel;
///
/// let model = ButtonModel::new(false);
/// let _sub = model.fired().subscribe(|_| println!("fired"));
///
/// model.pointer_enter().unwrap();
/// model.pointer_down().unwrap();
/// model.pointer_up().unwrap(); // prints "fired"
/// ```
pub struct ButtonModel {
    over_count: Mutex<usize>,
    over: SharedProperty<bool>,
    down: SharedProperty<bool>,
    enabled: SharedProperty<bool>,
    fire_on_down: bool,
    disposed: AtomicBool,
    fired: Signal<()>,
    pressed: Signal<()>,
    released: Signal<bool>,
}

impl ButtonModel {
    pub fn new(fire_on_down: bool) -> Self {
        Self {
            over_count: Mutex::new(0),
            over: Property::new(false).with_name("over").into_shared(),
            down: Property::new(false).with_name("down").into_shared(),
            enabled: Property::new(true).with_name("enabled").into_shared(),
            fire_on_down,
            disposed: AtomicBool::new(false),
            fired: Signal::new(),
            pressed: Signal::new(),
            released: Signal::new(),
        }
    }

    pub fn fire_on_down(&self) -> bool {
        self.fire_on_down
    }

    // =========================================================================
    // Pointer input
    // =========================================================================

    /// A pointer entered the button.
    pub fn pointer_enter(&self) -> ControlResult<()> {
        self.ensure_live()?;
        let count = {
            let mut count = self.over_count.lock();
            *count += 1;
            *count
        };
        self.over.set(count > 0);
        Ok(())
    }

    /// A pointer left the button.
    pub fn pointer_exit(&self) -> ControlResult<()> {
        self.ensure_live()?;
        let count = {
            let mut count = self.over_count.lock();
            if *count == 0 {
                tracing::warn!(target: "horizon_controls::button", "pointer exit without matching enter");
            }
            *count = count.saturating_sub(1);
            *count
        };
        self.over.set(count > 0);
        Ok(())
    }

    /// A press started on the button.
    ///
    /// A press on a disabled button still goes down (disabled-pressed); only
    /// fire-on-down is suppressed. Ignored if already down.
    pub fn pointer_down(&self) -> ControlResult<()> {
        self.ensure_live()?;
        if self.down.get() {
            return Ok(());
        }
        self.down.set(true);
        tracing::debug!(target: "horizon_controls::button", "button pressed");
        self.pressed.emit(());
        if self.fire_on_down && self.enabled.get() {
            self.emit_fired();
        }
        Ok(())
    }

    /// The press ended. Without fire-on-down, fires iff the button is still
    /// enabled and the pointer is over it.
    ///
    /// Ignored if the button is not down.
    pub fn pointer_up(&self) -> ControlResult<()> {
        self.ensure_live()?;
        if !self.down.get() {
            return Ok(());
        }
        self.down.set(false);
        let fire = !self.fire_on_down && self.enabled.get() && self.over.get();
        tracing::debug!(target: "horizon_controls::button", fire, "button released");
        if fire {
            self.emit_fired();
        }
        self.released.emit(fire);
        Ok(())
    }

    /// Fire without a pointer gesture (keyboard or programmatic activation).
    ///
    /// Fires iff enabled.
    pub fn fire(&self) -> ControlResult<()> {
        self.ensure_live()?;
        if self.enabled.get() {
            self.emit_fired();
        }
        Ok(())
    }

    /// Abandon any gesture in progress without firing.
    pub fn interrupt(&self) -> ControlResult<()> {
        self.ensure_live()?;
        *self.over_count.lock() = 0;
        self.over.set(false);
        if self.down.set(false) {
            tracing::debug!(target: "horizon_controls::button", "button interrupted");
            self.released.emit(false);
        }
        Ok(())
    }

    /// Enable or disable the button.
    ///
    /// Disabling does not cancel a press in progress: the button shows as
    /// disabled-pressed until the release, which then does not fire.
    pub fn set_enabled(&self, enabled: bool) -> ControlResult<()> {
        self.ensure_live()?;
        if self.enabled.set(enabled) {
            tracing::debug!(target: "horizon_controls::button", enabled, "button enabled changed");
        }
        Ok(())
    }

    fn emit_fired(&self) {
        tracing::debug!(target: "horizon_controls::button", "button fired");
        self.fired.emit(());
    }

    // =========================================================================
    // State
    // =========================================================================

    pub fn is_over(&self) -> bool {
        self.over.get()
    }

    pub fn is_down(&self) -> bool {
        self.down.get()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn over_property(&self) -> &SharedProperty<bool> {
        &self.over
    }

    pub fn down_property(&self) -> &SharedProperty<bool> {
        &self.down
    }

    pub fn enabled_property(&self) -> &SharedProperty<bool> {
        &self.enabled
    }

    // =========================================================================
    // Signals
    // =========================================================================

    /// Emitted once per activation.
    pub fn fired(&self) -> &Signal<()> {
        &self.fired
    }

    /// Emitted when a press starts.
    pub fn pressed(&self) -> &Signal<()> {
        &self.pressed
    }

    /// Emitted when a press ends, with whether it fired.
    pub fn released(&self) -> &Signal<bool> {
        &self.released
    }

    /// Shorthand for `fired().subscribe(..)`.
    pub fn on_fire<F>(&self, action: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.fired.subscribe(move |_| action())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Disconnect every listener. Fails if already disposed.
    pub fn dispose(&self) -> ControlResult<()> {
        if self.disposed.swap(true, Ordering::AcqRel) {
            tracing::error!(target: "horizon_controls::button", "button model disposed twice");
            return Err(ControlError::Disposed {
                widget: "ButtonModel",
            });
        }
        self.fired.disconnect_all();
        self.pressed.disconnect_all();
        self.released.disconnect_all();
        Ok(())
    }

    fn ensure_live(&self) -> ControlResult<()> {
        if self.is_disposed() {
            tracing::error!(target: "horizon_controls::button", "button model used after dispose");
            Err(ControlError::Disposed {
                widget: "ButtonModel",
            })
        } else {
            Ok(())
        }
    }
}

impl Default for ButtonModel {
    fn default() -> Self {
        Self::new(false)
    }
}

impl fmt::Debug for ButtonModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ButtonModel")
            .field("over", &self.is_over())
            .field("down", &self.is_down())
            .field("enabled", &self.is_enabled())
            .field("fire_on_down", &self.fire_on_down)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

static_assertions::assert_impl_all!(ButtonModel: Send, Sync);
