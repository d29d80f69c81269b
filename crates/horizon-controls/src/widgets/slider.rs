//! Horizontal slider bound to an `f64` cell.

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use horizon_controls_core::{Property, SharedProperty, Signal, Subscription};
use horizon_controls_render::{Color, Rect, Size, Stroke};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult, ensure_non_negative, ensure_positive, ensure_unit_open};
use crate::scene::{FnListener, Key, KeyEvent, ListenerId, Node, PointerEvent, PointerId, PointerKind};

/// Options for [`HSlider`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliderOptions {
    pub track_size: Size,
    pub thumb_size: Size,
    /// Values are snapped to multiples of `step` above the range minimum.
    pub step: Option<f64>,
    /// Arrow-key increment. Defaults to `step`, or a tenth of the range.
    pub keyboard_step: Option<f64>,
    /// Page Up/Down increment. Defaults to a fifth of the range.
    pub page_step: Option<f64>,
    pub track_fill: Color,
    pub track_stroke: Color,
    pub thumb_fill: Color,
    pub thumb_stroke: Color,
    pub line_width: f32,
    pub disabled_opacity: f32,
}

impl Default for SliderOptions {
    fn default() -> Self {
        Self {
            track_size: Size::new(200.0, 5.0),
            thumb_size: Size::new(15.0, 30.0),
            step: None,
            keyboard_step: None,
            page_step: None,
            track_fill: Color::WHITE,
            track_stroke: Color::BLACK,
            thumb_fill: Color::from_rgb8(153, 206, 255),
            thumb_stroke: Color::BLACK,
            line_width: 1.0,
            disabled_opacity: 0.45,
        }
    }
}

impl SliderOptions {
    pub fn with_track_size(mut self, size: Size) -> Self {
        self.track_size = size;
        self
    }

    pub fn with_thumb_size(mut self, size: Size) -> Self {
        self.thumb_size = size;
        self
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    pub fn with_keyboard_step(mut self, step: f64) -> Self {
        self.keyboard_step = Some(step);
        self
    }

    pub fn with_page_step(mut self, step: f64) -> Self {
        self.page_step = Some(step);
        self
    }

    pub fn validate(&self) -> ControlResult<()> {
        ensure_positive("track_size.width", self.track_size.width)?;
        ensure_positive("track_size.height", self.track_size.height)?;
        ensure_positive("thumb_size.width", self.thumb_size.width)?;
        ensure_positive("thumb_size.height", self.thumb_size.height)?;
        ensure_non_negative("line_width", self.line_width)?;
        ensure_unit_open("disabled_opacity", self.disabled_opacity)?;
        for (option, step) in [
            ("step", self.step),
            ("keyboard_step", self.keyboard_step),
            ("page_step", self.page_step),
        ] {
            if let Some(step) = step
                && !(step.is_finite() && step > 0.0)
            {
                return Err(ControlError::invalid_option(
                    option,
                    format!("{step} must be a finite, positive number"),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    pointer: PointerId,
    start_x: f32,
    start_value: f64,
}

struct SliderInner {
    value: SharedProperty<f64>,
    min: f64,
    max: f64,
    node: Node,
    track: Node,
    thumb: Node,
    options: SliderOptions,
    enabled: SharedProperty<bool>,
    drag: Mutex<Option<Drag>>,
    drag_started: Signal<()>,
    drag_ended: Signal<()>,
}

impl SliderInner {
    fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Snap to the step grid and clamp to the range.
    fn constrain(&self, value: f64) -> f64 {
        let snapped = match self.options.step {
            Some(step) => self.min + ((value - self.min) / step).round() * step,
            None => value,
        };
        snapped.clamp(self.min, self.max)
    }

    fn value_to_x(&self, value: f64) -> f32 {
        let ratio = ((value - self.min) / self.span()).clamp(0.0, 1.0);
        (ratio * f64::from(self.options.track_size.width)) as f32
    }

    fn x_to_value(&self, x: f32) -> f64 {
        let width = self.options.track_size.width;
        self.min + f64::from(x.clamp(0.0, width)) * self.span() / f64::from(width)
    }

    fn show_value(&self, value: f64) {
        if !(self.min..=self.max).contains(&value) {
            tracing::warn!(
                target: "horizon_controls::widget",
                slider = %self.node.id(),
                value,
                "slider value outside its range"
            );
        }
        self.thumb.set_translation(self.value_to_x(value), 0.0);
    }

    fn set(&self, value: f64) {
        self.value.set(self.constrain(value));
    }

    fn pointer_event(&self, event: &PointerEvent) {
        match event.kind() {
            PointerKind::Down => self.start_drag(event),
            PointerKind::Move => self.continue_drag(event),
            PointerKind::Up => self.end_drag(Some(event.pointer())),
            _ => {}
        }
    }

    fn start_drag(&self, event: &PointerEvent) {
        if !self.enabled.get() || self.drag.lock().is_some() {
            return;
        }
        let x = event.local_pos(&self.node).x;
        // A press on the track jumps the thumb there before dragging.
        if !event.trail_contains(&self.thumb) {
            self.set(self.x_to_value(x));
        }
        *self.drag.lock() = Some(Drag {
            pointer: event.pointer(),
            start_x: x,
            start_value: self.value.get(),
        });
        tracing::debug!(target: "horizon_controls::widget", slider = %self.node.id(), "slider drag started");
        self.drag_started.emit(());
    }

    fn continue_drag(&self, event: &PointerEvent) {
        let Some(drag) = *self.drag.lock() else {
            return;
        };
        if drag.pointer != event.pointer() {
            return;
        }
        let dx = event.local_pos(&self.node).x - drag.start_x;
        let delta = f64::from(dx) * self.span() / f64::from(self.options.track_size.width);
        self.set(drag.start_value + delta);
    }

    /// End the drag of `pointer`, or any drag when `None`.
    fn end_drag(&self, pointer: Option<PointerId>) {
        {
            let mut drag = self.drag.lock();
            match *drag {
                Some(d) if pointer.is_none_or(|p| p == d.pointer) => *drag = None,
                _ => return,
            }
        }
        tracing::debug!(target: "horizon_controls::widget", slider = %self.node.id(), value = self.value.get(), "slider drag ended");
        self.drag_ended.emit(());
    }

    fn keyboard_step(&self) -> f64 {
        self.options
            .keyboard_step
            .or(self.options.step)
            .unwrap_or(self.span() / 10.0)
    }

    fn key_down(&self, event: &KeyEvent, node: &Node) {
        if event.target() != Some(node) {
            return;
        }
        let current = self.value.get();
        let page = self.options.page_step.unwrap_or(self.span() / 5.0);
        let target = match event.key() {
            Key::ArrowLeft | Key::ArrowDown => current - self.keyboard_step(),
            Key::ArrowRight | Key::ArrowUp => current + self.keyboard_step(),
            Key::PageDown => current - page,
            Key::PageUp => current + page,
            Key::Home => self.min,
            Key::End => self.max,
            _ => return,
        };
        if self.enabled.get() {
            self.set(target);
        }
        event.abort();
    }
}

/// A horizontal slider.
///
/// The thumb's center sits at the position of the value along the track.
/// Pressing on the track jumps there and starts a drag; dragging the thumb
/// moves it relative to where it was grabbed.
pub struct HSlider {
    inner: Arc<SliderInner>,
    listener: ListenerId,
    subscriptions: Mutex<Vec<Subscription>>,
    disposed: AtomicBool,
}

impl HSlider {
    pub fn new(value: SharedProperty<f64>, range: RangeInclusive<f64>, options: SliderOptions) -> ControlResult<Self> {
        options.validate()?;
        let (min, max) = range.into_inner();
        if !(min.is_finite() && max.is_finite() && min < max) {
            return Err(ControlError::invalid_option(
                "range",
                format!("{min}..={max} is not a finite, non-empty range"),
            ));
        }
        let initial = value.get();
        if !(min..=max).contains(&initial) {
            return Err(ControlError::invalid_option(
                "value",
                format!("{initial} is outside {min}..={max}"),
            ));
        }

        let SliderOptions {
            track_size: track,
            thumb_size: thumb,
            ..
        } = options;
        let node = Node::named("h-slider").with_focusable(true);
        let track_node = Node::rectangle(
            "slider-track",
            Rect::new(0.0, (thumb.height - track.height) / 2.0, track.width, track.height),
        )
        .with_fill(options.track_fill)
        .with_stroke(Stroke::new(options.track_stroke, options.line_width));
        // Widen the track's hit area to the thumb height.
        track_node.set_touch_area(Some(Rect::new(0.0, 0.0, track.width, thumb.height)));
        let thumb_node = Node::rectangle(
            "slider-thumb",
            Rect::new(-thumb.width / 2.0, 0.0, thumb.width, thumb.height),
        )
        .with_fill(options.thumb_fill)
        .with_stroke(Stroke::new(options.thumb_stroke, options.line_width));
        node.add_child(&track_node);
        node.add_child(&thumb_node);

        let inner = Arc::new(SliderInner {
            value,
            min,
            max,
            node,
            track: track_node,
            thumb: thumb_node,
            options,
            enabled: Property::new(true).with_name("enabled").into_shared(),
            drag: Mutex::new(None),
            drag_started: Signal::new(),
            drag_ended: Signal::new(),
        });

        let mut subscriptions = Vec::with_capacity(2);
        let weak = Arc::downgrade(&inner);
        subscriptions.push(inner.value.link(move |&value| {
            if let Some(inner) = weak.upgrade() {
                inner.show_value(value);
            }
        }));
        let (faded, opacity) = (inner.node.clone(), inner.options.disabled_opacity);
        subscriptions.push(inner.enabled.link(move |&enabled| {
            faded.set_opacity(if enabled { 1.0 } else { opacity });
        }));

        let (on_pointer, on_key) = (Arc::downgrade(&inner), Arc::downgrade(&inner));
        let listener = inner.node.add_input_listener(Arc::new(
            FnListener::new()
                .on_pointer(move |event, _node| {
                    if let Some(inner) = on_pointer.upgrade() {
                        inner.pointer_event(event);
                    }
                })
                .on_key(move |event, node| {
                    if let Some(inner) = on_key.upgrade() {
                        inner.key_down(event, node);
                    }
                }),
        ));

        Ok(Self {
            inner,
            listener,
            subscriptions: Mutex::new(subscriptions),
            disposed: AtomicBool::new(false),
        })
    }

    pub fn node(&self) -> &Node {
        &self.inner.node
    }

    pub fn track(&self) -> &Node {
        &self.inner.track
    }

    pub fn thumb(&self) -> &Node {
        &self.inner.thumb
    }

    pub fn value(&self) -> f64 {
        self.inner.value.get()
    }

    pub fn range(&self) -> RangeInclusive<f64> {
        self.inner.min..=self.inner.max
    }

    /// Set the value, snapped and clamped.
    pub fn set_value(&self, value: f64) -> ControlResult<()> {
        self.ensure_live()?;
        self.inner.set(value);
        Ok(())
    }

    pub fn is_dragging(&self) -> bool {
        self.inner.drag.lock().is_some()
    }

    pub fn drag_started(&self) -> &Signal<()> {
        &self.inner.drag_started
    }

    pub fn drag_ended(&self) -> &Signal<()> {
        &self.inner.drag_ended
    }

    pub fn set_enabled(&self, enabled: bool) -> ControlResult<()> {
        self.ensure_live()?;
        if !enabled {
            self.inner.end_drag(None);
        }
        self.inner.enabled.set(enabled);
        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.get()
    }

    pub fn dispose(&self) -> ControlResult<()> {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return Err(ControlError::Disposed { widget: "HSlider" });
        }
        self.subscriptions.lock().clear();
        self.inner.node.remove_input_listener(self.listener);
        self.inner.drag_started.disconnect_all();
        self.inner.drag_ended.disconnect_all();
        self.inner.node.detach();
        Ok(())
    }

    fn ensure_live(&self) -> ControlResult<()> {
        if self.disposed.load(Ordering::Acquire) {
            Err(ControlError::Disposed { widget: "HSlider" })
        } else {
            Ok(())
        }
    }
}

impl fmt::Debug for HSlider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HSlider")
            .field("node", &self.inner.node.id())
            .field("value", &self.value())
            .field("range", &self.range())
            .finish()
    }
}

static_assertions::assert_impl_all!(HSlider: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Display;
    use horizon_controls_render::Point;
    use std::sync::atomic::AtomicUsize;

    const MOUSE: PointerId = PointerId::MOUSE;

    /// Slider over 0..=100 on a 200 wide track, placed at (20, 20).
    fn setup(options: SliderOptions) -> (Display, HSlider, SharedProperty<f64>) {
        let display = Display::new(Size::new(400.0, 200.0));
        let value = Property::shared(50.0);
        let slider = HSlider::new(value.clone(), 0.0..=100.0, options).unwrap();
        slider.node().set_translation(20.0, 20.0);
        display.root().add_child(slider.node());
        (display, slider, value)
    }

    #[test]
    fn test_invalid_construction() {
        let opts = SliderOptions::default;
        assert!(HSlider::new(Property::shared(0.0), 1.0..=1.0, opts()).is_err());
        assert!(HSlider::new(Property::shared(0.0), 0.0..=f64::INFINITY, opts()).is_err());
        assert!(HSlider::new(Property::shared(5.0), 0.0..=1.0, opts()).is_err());
        assert!(HSlider::new(Property::shared(0.5), 0.0..=1.0, opts().with_step(0.0)).is_err());
    }

    #[test]
    fn test_thumb_follows_value() {
        let (_display, slider, value) = setup(SliderOptions::default());
        assert_eq!(slider.thumb().translation().x, 100.0);
        value.set(25.0);
        assert_eq!(slider.thumb().translation().x, 50.0);
    }

    #[test]
    fn test_track_press_jumps_and_drags() {
        let (display, slider, value) = setup(SliderOptions::default());
        let started = Arc::new(AtomicUsize::new(0));
        let ended = Arc::new(AtomicUsize::new(0));
        let s = started.clone();
        let _a = slider.drag_started().subscribe(move |_| {
            s.fetch_add(1, Ordering::SeqCst);
        });
        let e = ended.clone();
        let _b = slider.drag_ended().subscribe(move |_| {
            e.fetch_add(1, Ordering::SeqCst);
        });

        display.pointer_down(MOUSE, Point::new(60.0, 35.0));
        assert_eq!(value.get(), 20.0);
        assert!(slider.is_dragging());
        display.pointer_move(MOUSE, Point::new(80.0, 35.0));
        assert_eq!(value.get(), 30.0);
        // Dragging past the end clamps.
        display.pointer_move(MOUSE, Point::new(390.0, 35.0));
        assert_eq!(value.get(), 100.0);
        display.pointer_up(MOUSE, Point::new(390.0, 35.0));

        assert!(!slider.is_dragging());
        assert_eq!(started.load(Ordering::SeqCst), 1);
        assert_eq!(ended.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_thumb_drag_is_relative() {
        let (display, _slider, value) = setup(SliderOptions::default());
        // Grab the thumb off center: the value must not jump.
        display.pointer_down(MOUSE, Point::new(124.0, 30.0));
        assert_eq!(value.get(), 50.0);
        display.pointer_move(MOUSE, Point::new(144.0, 30.0));
        assert_eq!(value.get(), 60.0);
        display.pointer_up(MOUSE, Point::new(144.0, 30.0));
    }

    #[test]
    fn test_step_snapping() {
        let (display, _slider, value) = setup(SliderOptions::default().with_step(25.0));
        display.pointer_down(MOUSE, Point::new(71.0, 35.0));
        assert_eq!(value.get(), 25.0);
        display.pointer_move(MOUSE, Point::new(101.0, 35.0));
        assert_eq!(value.get(), 50.0);
        display.pointer_up(MOUSE, Point::new(101.0, 35.0));
    }

    #[test]
    fn test_keyboard() {
        let (display, slider, value) = setup(SliderOptions::default());
        assert!(display.focus(slider.node()));
        display.key_down(Key::ArrowRight, false);
        assert_eq!(value.get(), 60.0);
        display.key_down(Key::ArrowDown, false);
        display.key_down(Key::ArrowLeft, false);
        assert_eq!(value.get(), 40.0);
        display.key_down(Key::PageUp, false);
        assert_eq!(value.get(), 60.0);
        display.key_down(Key::End, false);
        assert_eq!(value.get(), 100.0);
        display.key_down(Key::ArrowRight, false);
        assert_eq!(value.get(), 100.0);
        display.key_down(Key::Home, false);
        assert_eq!(value.get(), 0.0);
    }

    #[test]
    fn test_disabled_ignores_input() {
        let (display, slider, value) = setup(SliderOptions::default());
        slider.set_enabled(false).unwrap();
        assert_eq!(slider.node().opacity(), 0.45);
        display.click(Point::new(60.0, 35.0));
        display.focus(slider.node());
        display.key_down(Key::End, false);
        assert_eq!(value.get(), 50.0);
    }

    #[test]
    fn test_disable_mid_drag_ends_drag() {
        let (display, slider, value) = setup(SliderOptions::default());
        display.pointer_down(MOUSE, Point::new(60.0, 35.0));
        slider.set_enabled(false).unwrap();
        assert!(!slider.is_dragging());
        display.pointer_move(MOUSE, Point::new(120.0, 35.0));
        assert_eq!(value.get(), 20.0);
    }

    #[test]
    fn test_dispose() {
        let (display, slider, value) = setup(SliderOptions::default());
        slider.dispose().unwrap();
        assert_eq!(display.root().child_count(), 0);
        assert_eq!(value.subscriber_count(), 0);
        assert!(slider.set_value(1.0).is_err());
        assert!(slider.dispose().is_err());
    }
}
