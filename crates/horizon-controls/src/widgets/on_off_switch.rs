//! On/off switch: a thumb that slides along a track.
//!
//! A click anywhere on the switch flips it. A drag moves the thumb with the
//! pointer; at release the [`MidpointToggle`] rule decides: a drag that
//! never crossed the middle of the track still flips the value, one that did
//! snaps to the side the thumb rests on.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use horizon_controls_core::{Property, SharedProperty, Subscription};
use horizon_controls_render::{Color, Paint, Rect, Size, Stroke};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::button::MidpointToggle;
use crate::error::{ControlError, ControlResult, ensure_non_negative, ensure_positive, ensure_unit_open};
use crate::scene::{FnListener, KeyEvent, ListenerId, Node, PointerEvent, PointerId, PointerKind};

/// Options for [`OnOffSwitch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnOffSwitchOptions {
    /// Track size. The thumb is half as wide.
    pub size: Size,
    pub track_off_fill: Color,
    pub track_on_fill: Color,
    pub track_stroke: Color,
    pub thumb_fill: Color,
    pub thumb_stroke: Color,
    pub line_width: f32,
    /// Let the value follow the thumb side during a drag.
    pub toggle_while_dragging: bool,
    pub disabled_opacity: f32,
}

impl Default for OnOffSwitchOptions {
    fn default() -> Self {
        Self {
            size: Size::new(60.0, 30.0),
            track_off_fill: Color::WHITE,
            track_on_fill: Color::from_rgb8(0, 200, 0),
            track_stroke: Color::BLACK,
            thumb_fill: Color::from_rgb8(220, 220, 220),
            thumb_stroke: Color::BLACK,
            line_width: 1.0,
            toggle_while_dragging: false,
            disabled_opacity: 0.45,
        }
    }
}

impl OnOffSwitchOptions {
    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    pub fn with_toggle_while_dragging(mut self, toggle: bool) -> Self {
        self.toggle_while_dragging = toggle;
        self
    }

    pub fn with_track_fills(mut self, off: Color, on: Color) -> Self {
        self.track_off_fill = off;
        self.track_on_fill = on;
        self
    }

    pub fn validate(&self) -> ControlResult<()> {
        ensure_positive("size.width", self.size.width)?;
        ensure_positive("size.height", self.size.height)?;
        ensure_non_negative("line_width", self.line_width)?;
        ensure_unit_open("disabled_opacity", self.disabled_opacity)
    }
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    pointer: PointerId,
    pointer_start_x: f32,
    thumb_start_x: f32,
}

struct SwitchInner {
    value: SharedProperty<bool>,
    node: Node,
    track: Node,
    thumb: Node,
    options: OnOffSwitchOptions,
    enabled: SharedProperty<bool>,
    gesture: Mutex<MidpointToggle>,
    drag: Mutex<Option<Drag>>,
}

impl SwitchInner {
    fn travel(&self) -> f32 {
        self.options.size.width / 2.0
    }

    fn snap(&self, on: bool) {
        self.thumb.set_translation(if on { self.travel() } else { 0.0 }, 0.0);
    }

    fn show_value(&self, on: bool) {
        let fill = if on {
            self.options.track_on_fill
        } else {
            self.options.track_off_fill
        };
        self.track.set_fill(Some(Paint::solid(fill)));
        if self.drag.lock().is_none() {
            self.snap(on);
        }
    }

    fn pointer_event(&self, event: &PointerEvent) {
        match event.kind() {
            PointerKind::Down => self.start_drag(event),
            PointerKind::Move => self.continue_drag(event),
            PointerKind::Up => self.end_drag(event.pointer()),
            _ => {}
        }
    }

    fn start_drag(&self, event: &PointerEvent) {
        if !self.enabled.get() {
            return;
        }
        {
            let mut drag = self.drag.lock();
            if drag.is_some() {
                return;
            }
            *drag = Some(Drag {
                pointer: event.pointer(),
                pointer_start_x: event.local_pos(&self.node).x,
                thumb_start_x: self.thumb.translation().x,
            });
        }
        self.gesture.lock().begin(self.value.get());
        tracing::debug!(target: "horizon_controls::widget", switch = %self.node.id(), "switch drag started");
    }

    fn continue_drag(&self, event: &PointerEvent) {
        let Some(drag) = *self.drag.lock() else {
            return;
        };
        if drag.pointer != event.pointer() {
            return;
        }
        let travel = self.travel();
        let dx = event.local_pos(&self.node).x - drag.pointer_start_x;
        let x = (drag.thumb_start_x + dx).clamp(0.0, travel);
        self.thumb.set_translation(x, 0.0);

        let on = x / travel > 0.5;
        let changed = self.gesture.lock().track(on);
        if changed && self.options.toggle_while_dragging {
            self.value.set(on);
        }
    }

    fn end_drag(&self, pointer: PointerId) {
        {
            let mut drag = self.drag.lock();
            if drag.is_none_or(|d| d.pointer != pointer) {
                return;
            }
            *drag = None;
        }
        let result = self.gesture.lock().finish();
        if let Some(on) = result {
            tracing::debug!(
                target: "horizon_controls::widget",
                switch = %self.node.id(),
                on,
                crossed = self.gesture.lock().crossed_midpoint(),
                "switch drag released"
            );
            self.value.set(on);
        }
        self.snap(self.value.get());
    }

    fn key_down(&self, event: &KeyEvent, node: &Node) {
        if event.key().is_activation() && event.target() == Some(node) {
            if self.enabled.get() {
                self.value.set(!self.value.get());
            }
            event.abort();
        }
    }
}

/// A two-position switch bound to a `bool` cell.
pub struct OnOffSwitch {
    inner: Arc<SwitchInner>,
    listener: ListenerId,
    subscriptions: Mutex<Vec<Subscription>>,
    disposed: AtomicBool,
}

impl OnOffSwitch {
    pub fn new(value: SharedProperty<bool>, options: OnOffSwitchOptions) -> ControlResult<Self> {
        options.validate()?;
        let Size { width, height } = options.size;

        let node = Node::named("on-off-switch").with_focusable(true);
        let track = Node::rectangle("switch-track", Rect::new(0.0, 0.0, width, height))
            .with_stroke(Stroke::new(options.track_stroke, options.line_width));
        let thumb = Node::rectangle("switch-thumb", Rect::new(0.0, 0.0, width / 2.0, height))
            .with_fill(options.thumb_fill)
            .with_stroke(Stroke::new(options.thumb_stroke, options.line_width));
        node.add_child(&track);
        node.add_child(&thumb);

        let inner = Arc::new(SwitchInner {
            value,
            node,
            track,
            thumb,
            options,
            enabled: Property::new(true).with_name("enabled").into_shared(),
            gesture: Mutex::new(MidpointToggle::new()),
            drag: Mutex::new(None),
        });

        let mut subscriptions = Vec::with_capacity(2);
        let weak = Arc::downgrade(&inner);
        subscriptions.push(inner.value.link(move |&on| {
            if let Some(inner) = weak.upgrade() {
                inner.show_value(on);
            }
        }));
        let (node, opacity) = (inner.node.clone(), inner.options.disabled_opacity);
        subscriptions.push(inner.enabled.link(move |&enabled| {
            node.set_opacity(if enabled { 1.0 } else { opacity });
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

    pub fn thumb(&self) -> &Node {
        &self.inner.thumb
    }

    pub fn track(&self) -> &Node {
        &self.inner.track
    }

    pub fn is_on(&self) -> bool {
        self.inner.value.get()
    }

    pub fn is_dragging(&self) -> bool {
        self.inner.drag.lock().is_some()
    }

    /// Whether the current (or last) drag crossed the middle of the track.
    pub fn crossed_midpoint(&self) -> bool {
        self.inner.gesture.lock().crossed_midpoint()
    }

    pub fn set_enabled(&self, enabled: bool) -> ControlResult<()> {
        self.ensure_live()?;
        if !enabled {
            // Abandon a drag in progress.
            self.inner.drag.lock().take();
            self.inner.gesture.lock().cancel();
            self.inner.snap(self.inner.value.get());
        }
        self.inner.enabled.set(enabled);
        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.get()
    }

    pub fn dispose(&self) -> ControlResult<()> {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return Err(ControlError::Disposed { widget: "OnOffSwitch" });
        }
        self.subscriptions.lock().clear();
        self.inner.node.remove_input_listener(self.listener);
        self.inner.node.detach();
        Ok(())
    }

    fn ensure_live(&self) -> ControlResult<()> {
        if self.disposed.load(Ordering::Acquire) {
            Err(ControlError::Disposed { widget: "OnOffSwitch" })
        } else {
            Ok(())
        }
    }
}

impl fmt::Debug for OnOffSwitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnOffSwitch")
            .field("node", &self.inner.node.id())
            .field("on", &self.is_on())
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

static_assertions::assert_impl_all!(OnOffSwitch: Send, Sync);
