//! Check box: a square box, a check mark and a label.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use horizon_controls_core::{SharedProperty, Subscription};
use horizon_controls_render::{Color, Rect, Stroke};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::button::{ButtonInput, ButtonModel};
use crate::error::{ControlError, ControlResult, ensure_non_negative, ensure_positive, ensure_unit_open};
use crate::scene::{ListenerId, Node};

/// Options for [`CheckBox`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckBoxOptions {
    /// Side length of the box.
    pub box_width: f32,
    /// Gap between the box and the content.
    pub spacing: f32,
    pub box_fill: Color,
    pub box_stroke: Color,
    pub check_color: Color,
    pub line_width: f32,
    pub disabled_opacity: f32,
    /// Extra touch area around the whole check box.
    pub touch_expansion: f32,
}

impl Default for CheckBoxOptions {
    fn default() -> Self {
        Self {
            box_width: 21.0,
            spacing: 6.0,
            box_fill: Color::WHITE,
            box_stroke: Color::BLACK,
            check_color: Color::BLACK,
            line_width: 1.0,
            disabled_opacity: 0.3,
            touch_expansion: 0.0,
        }
    }
}

impl CheckBoxOptions {
    pub fn with_box_width(mut self, width: f32) -> Self {
        self.box_width = width;
        self
    }

    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_check_color(mut self, color: Color) -> Self {
        self.check_color = color;
        self
    }

    pub fn with_disabled_opacity(mut self, opacity: f32) -> Self {
        self.disabled_opacity = opacity;
        self
    }

    pub fn with_touch_expansion(mut self, expansion: f32) -> Self {
        self.touch_expansion = expansion;
        self
    }

    pub fn validate(&self) -> ControlResult<()> {
        ensure_positive("box_width", self.box_width)?;
        ensure_non_negative("spacing", self.spacing)?;
        ensure_non_negative("line_width", self.line_width)?;
        ensure_non_negative("touch_expansion", self.touch_expansion)?;
        ensure_unit_open("disabled_opacity", self.disabled_opacity)
    }
}

/// A check box bound to a `bool` cell.
///
/// Clicking anywhere on the box or the content toggles the cell, as does
/// Enter or Space while the check box has focus.
pub struct CheckBox {
    node: Node,
    check_box: Node,
    check_mark: Node,
    content: Node,
    value: SharedProperty<bool>,
    model: Arc<ButtonModel>,
    options: CheckBoxOptions,
    listener: ListenerId,
    subscriptions: Mutex<Vec<Subscription>>,
    disposed: AtomicBool,
}

impl CheckBox {
    pub fn new(content: Node, value: SharedProperty<bool>, options: CheckBoxOptions) -> ControlResult<Self> {
        options.validate()?;
        let bw = options.box_width;

        let node = Node::named("check-box").with_focusable(true);
        let check_box = Node::rectangle("check-box-box", Rect::new(0.0, 0.0, bw, bw))
            .with_fill(options.box_fill)
            .with_stroke(Stroke::new(options.box_stroke, options.line_width));
        // The mark is drawn inset by a fifth of the box.
        let inset = bw / 5.0;
        let check_mark = Node::rectangle("check-box-mark", Rect::new(inset, inset, bw - 2.0 * inset, bw - 2.0 * inset))
            .with_fill(options.check_color);
        check_mark.set_pickable(false);
        check_box.add_child(&check_mark);
        node.add_child(&check_box);
        node.add_child(&content);

        let model = Arc::new(ButtonModel::new(false));
        let listener = node.add_input_listener(Arc::new(ButtonInput::new(model.clone())));

        let mut subscriptions = Vec::with_capacity(3);
        let cell = value.clone();
        subscriptions.push(model.on_fire(move || {
            cell.set(!cell.get());
        }));
        let mark = check_mark.clone();
        subscriptions.push(value.link(move |&checked| mark.set_visible(checked)));
        let (faded, opacity) = (node.clone(), options.disabled_opacity);
        subscriptions.push(model.enabled_property().link(move |&enabled| {
            faded.set_opacity(if enabled { 1.0 } else { opacity });
        }));

        let check_box = Self {
            node,
            check_box,
            check_mark,
            content,
            value,
            model,
            options,
            listener,
            subscriptions: Mutex::new(subscriptions),
            disposed: AtomicBool::new(false),
        };
        check_box.layout(0.0);
        Ok(check_box)
    }

    fn layout(&self, min_content_width: f32) {
        let bw = self.options.box_width;
        let content_bounds = self.content.local_bounds();
        let height = bw.max(content_bounds.height());
        self.check_box.set_translation(0.0, (height - bw) / 2.0);
        let x = bw + self.options.spacing;
        self.content.set_translation(
            x - content_bounds.left(),
            (height - content_bounds.height()) / 2.0 - content_bounds.top(),
        );

        let width = x + content_bounds.width().max(min_content_width);
        let area = Rect::new(0.0, 0.0, width, height);
        self.node.set_self_bounds(area);
        self.node.set_touch_area(Some(area.dilated(self.options.touch_expansion)));
    }

    /// Reserve room for content at least `width` wide, so the touch areas of
    /// check boxes stacked in a column line up.
    pub fn set_min_content_width(&self, width: f32) {
        self.layout(width);
    }

    pub fn content_width(&self) -> f32 {
        self.content.local_bounds().width()
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn check_mark(&self) -> &Node {
        &self.check_mark
    }

    pub fn content(&self) -> &Node {
        &self.content
    }

    pub fn model(&self) -> &ButtonModel {
        &self.model
    }

    pub fn is_checked(&self) -> bool {
        self.value.get()
    }

    pub fn value(&self) -> &SharedProperty<bool> {
        &self.value
    }

    pub fn set_enabled(&self, enabled: bool) -> ControlResult<()> {
        self.model.set_enabled(enabled)
    }

    pub fn is_enabled(&self) -> bool {
        self.model.is_enabled()
    }

    pub fn dispose(&self) -> ControlResult<()> {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return Err(ControlError::Disposed { widget: "CheckBox" });
        }
        self.node.remove_input_listener(self.listener);
        self.subscriptions.lock().clear();
        self.node.detach();
        self.model.dispose()
    }
}

impl fmt::Debug for CheckBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckBox")
            .field("node", &self.node.id())
            .field("checked", &self.is_checked())
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

static_assertions::assert_impl_all!(CheckBox: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Display, Key};
    use horizon_controls_core::Property;
    use horizon_controls_render::{Point, Size};

    fn setup() -> (Display, CheckBox, SharedProperty<bool>) {
        let display = Display::new(Size::new(200.0, 100.0));
        let value = Property::shared(false);
        let label = Node::rectangle("label", Rect::new(0.0, 0.0, 50.0, 12.0));
        let check_box = CheckBox::new(label, value.clone(), CheckBoxOptions::default()).unwrap();
        display.root().add_child(check_box.node());
        (display, check_box, value)
    }

    #[test]
    fn test_layout() {
        let (_display, check_box, _value) = setup();
        assert_eq!(check_box.content().translation(), Point::new(27.0, 4.5));
        assert_eq!(check_box.node().self_bounds(), Rect::new(0.0, 0.0, 77.0, 21.0));
    }

    #[test]
    fn test_click_box_and_label_toggle() {
        let (display, check_box, value) = setup();
        assert!(!check_box.check_mark().is_visible());
        display.click(Point::new(10.0, 10.0));
        assert!(value.get());
        assert!(check_box.check_mark().is_visible());
        display.click(Point::new(40.0, 10.0));
        assert!(!value.get());
    }

    #[test]
    fn test_external_change_moves_mark() {
        let (_display, check_box, value) = setup();
        value.set(true);
        assert!(check_box.check_mark().is_visible());
    }

    #[test]
    fn test_keyboard_toggles() {
        let (display, check_box, value) = setup();
        assert!(display.focus(check_box.node()));
        display.key_down(Key::Space, false);
        assert!(value.get());
    }

    #[test]
    fn test_disabled_fades_and_ignores_clicks() {
        let (display, check_box, value) = setup();
        check_box.set_enabled(false).unwrap();
        assert_eq!(check_box.node().opacity(), 0.3);
        display.click(Point::new(10.0, 10.0));
        assert!(!value.get());
        check_box.set_enabled(true).unwrap();
        assert_eq!(check_box.node().opacity(), 1.0);
    }

    #[test]
    fn test_min_content_width_extends_touch_area() {
        let (display, check_box, value) = setup();
        check_box.set_min_content_width(100.0);
        assert_eq!(check_box.node().touch_area(), Some(Rect::new(0.0, 0.0, 127.0, 21.0)));
        display.click(Point::new(120.0, 10.0));
        assert!(value.get());
    }

    #[test]
    fn test_invalid_options() {
        let label = Node::rectangle("label", Rect::new(0.0, 0.0, 10.0, 10.0));
        let options = CheckBoxOptions::default().with_box_width(0.0);
        assert!(CheckBox::new(label, Property::shared(false), options).is_err());
    }

    #[test]
    fn test_dispose() {
        let (display, check_box, value) = setup();
        check_box.dispose().unwrap();
        assert_eq!(display.root().child_count(), 0);
        assert_eq!(value.subscriber_count(), 0);
        assert!(check_box.set_enabled(false).is_err());
        assert!(check_box.dispose().is_err());
    }
}
