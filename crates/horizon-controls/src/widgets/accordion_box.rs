//! Accordion box: a titled panel whose content can be collapsed.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use horizon_controls_core::{SharedProperty, Subscription};
use horizon_controls_render::{Color, Rect, Size, Stroke};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::button::{AppearanceKind, Button, ButtonInput, ButtonModel, ButtonOptions, ToggleButtonModel};
use crate::error::{ControlError, ControlResult, ensure_non_negative, ensure_positive};
use crate::scene::{ListenerId, Node};

/// Which side of the title bar holds the expand/collapse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ButtonAlign {
    #[default]
    Left,
    Right,
}

/// Options for [`AccordionBox`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccordionBoxOptions {
    pub button_align: ButtonAlign,
    /// Clicking anywhere on the title bar toggles the box.
    pub title_bar_expand_collapse: bool,
    pub expand_button_size: f32,
    pub button_x_margin: f32,
    pub button_y_margin: f32,
    pub title_x_margin: f32,
    pub title_y_margin: f32,
    /// Gap between the button and the title.
    pub title_x_spacing: f32,
    pub content_x_margin: f32,
    pub content_y_margin: f32,
    pub min_width: f32,
    pub fill: Color,
    pub stroke: Color,
    pub line_width: f32,
}

impl Default for AccordionBoxOptions {
    fn default() -> Self {
        Self {
            button_align: ButtonAlign::Left,
            title_bar_expand_collapse: true,
            expand_button_size: 16.0,
            button_x_margin: 4.0,
            button_y_margin: 2.0,
            title_x_margin: 10.0,
            title_y_margin: 2.0,
            title_x_spacing: 5.0,
            content_x_margin: 15.0,
            content_y_margin: 8.0,
            min_width: 0.0,
            fill: Color::from_rgb8(238, 238, 238),
            stroke: Color::BLACK,
            line_width: 1.0,
        }
    }
}

impl AccordionBoxOptions {
    pub fn with_button_align(mut self, align: ButtonAlign) -> Self {
        self.button_align = align;
        self
    }

    pub fn with_title_bar_expand_collapse(mut self, enabled: bool) -> Self {
        self.title_bar_expand_collapse = enabled;
        self
    }

    pub fn with_content_margins(mut self, x_margin: f32, y_margin: f32) -> Self {
        self.content_x_margin = x_margin;
        self.content_y_margin = y_margin;
        self
    }

    pub fn with_min_width(mut self, width: f32) -> Self {
        self.min_width = width;
        self
    }

    pub fn with_expand_button_size(mut self, size: f32) -> Self {
        self.expand_button_size = size;
        self
    }

    pub fn validate(&self) -> ControlResult<()> {
        ensure_positive("expand_button_size", self.expand_button_size)?;
        for (option, value) in [
            ("button_x_margin", self.button_x_margin),
            ("button_y_margin", self.button_y_margin),
            ("title_x_margin", self.title_x_margin),
            ("title_y_margin", self.title_y_margin),
            ("title_x_spacing", self.title_x_spacing),
            ("content_x_margin", self.content_x_margin),
            ("content_y_margin", self.content_y_margin),
            ("min_width", self.min_width),
            ("line_width", self.line_width),
        ] {
            ensure_non_negative(option, value)?;
        }
        Ok(())
    }
}

struct AccordionLayout {
    node: Node,
    background: Node,
    title_bar: Node,
    title: Node,
    content: Node,
    button: Node,
    options: AccordionBoxOptions,
}

impl AccordionLayout {
    fn layout(&self, expanded: bool) {
        let o = &self.options;
        let s = o.expand_button_size;
        let title_bounds = self.title.local_bounds();
        let content_bounds = self.content.local_bounds();

        let bar_height = (s + 2.0 * o.button_y_margin).max(title_bounds.height() + 2.0 * o.title_y_margin);
        let title_row = o.button_x_margin + s + o.title_x_spacing + title_bounds.width() + o.title_x_margin;
        // Width does not change when collapsing.
        let width = o
            .min_width
            .max(title_row)
            .max(content_bounds.width() + 2.0 * o.content_x_margin);
        let height = if expanded {
            bar_height + content_bounds.height() + 2.0 * o.content_y_margin
        } else {
            bar_height
        };

        self.background.set_self_bounds(Rect::new(0.0, 0.0, width, height));
        self.title_bar.set_self_bounds(Rect::new(0.0, 0.0, width, bar_height));

        let button_y = (bar_height - s) / 2.0;
        let title_y = (bar_height - title_bounds.height()) / 2.0 - title_bounds.top();
        match o.button_align {
            ButtonAlign::Left => {
                self.button.set_translation(o.button_x_margin, button_y);
                self.title.set_translation(
                    o.button_x_margin + s + o.title_x_spacing - title_bounds.left(),
                    title_y,
                );
            }
            ButtonAlign::Right => {
                self.button.set_translation(width - o.button_x_margin - s, button_y);
                self.title
                    .set_translation(o.title_x_margin - title_bounds.left(), title_y);
            }
        }

        self.content.set_translation(
            o.content_x_margin - content_bounds.left(),
            bar_height + o.content_y_margin - content_bounds.top(),
        );
        self.content.set_visible(expanded);

        tracing::trace!(
            target: "horizon_controls::widget",
            accordion = %self.node.id(),
            expanded,
            width,
            height,
            "accordion box laid out"
        );
    }
}

/// A box with a title bar and collapsible content.
///
/// The `expanded` cell is the single source of truth: the expand/collapse
/// button and the title bar both flip it, and every change re-lays out the
/// box.
pub struct AccordionBox {
    layout: Arc<AccordionLayout>,
    expanded: SharedProperty<bool>,
    expand_button: Button<ToggleButtonModel<bool>>,
    title_model: Arc<ButtonModel>,
    title_listener: Option<ListenerId>,
    subscriptions: Mutex<Vec<Subscription>>,
    disposed: AtomicBool,
}

impl AccordionBox {
    pub fn new(
        title: Node,
        content: Node,
        expanded: SharedProperty<bool>,
        options: AccordionBoxOptions,
    ) -> ControlResult<Self> {
        options.validate()?;
        let s = options.expand_button_size;

        let expand_button = Button::toggle(
            false,
            true,
            expanded.clone(),
            None,
            ButtonOptions::default()
                .with_appearance(AppearanceKind::Flat)
                .with_size(Size::new(s, s)),
        )?;
        expand_button.node().set_name("accordion-expand-button");

        let node = Node::named("accordion-box");
        let background = Node::named("accordion-background")
            .with_fill(options.fill)
            .with_stroke(Stroke::new(options.stroke, options.line_width));
        let title_bar = Node::named("accordion-title-bar");
        title_bar.add_child(&title);
        node.add_child(&background);
        node.add_child(&title_bar);
        node.add_child(expand_button.node());
        node.add_child(&content);

        let title_model = Arc::new(ButtonModel::new(false));
        let title_listener = options
            .title_bar_expand_collapse
            .then(|| title_bar.add_input_listener(Arc::new(ButtonInput::new(title_model.clone()))));

        let layout = Arc::new(AccordionLayout {
            node,
            background,
            title_bar,
            title,
            content,
            button: expand_button.node().clone(),
            options,
        });

        let mut subscriptions = Vec::with_capacity(2);
        let cell = expanded.clone();
        subscriptions.push(title_model.on_fire(move || {
            cell.set(!cell.get());
        }));
        let weak = Arc::downgrade(&layout);
        subscriptions.push(expanded.link(move |&expanded| {
            if let Some(layout) = weak.upgrade() {
                layout.layout(expanded);
            }
        }));

        Ok(Self {
            layout,
            expanded,
            expand_button,
            title_model,
            title_listener,
            subscriptions: Mutex::new(subscriptions),
            disposed: AtomicBool::new(false),
        })
    }

    pub fn node(&self) -> &Node {
        &self.layout.node
    }

    pub fn background(&self) -> &Node {
        &self.layout.background
    }

    pub fn title_bar(&self) -> &Node {
        &self.layout.title_bar
    }

    pub fn content(&self) -> &Node {
        &self.layout.content
    }

    pub fn expand_button(&self) -> &Button<ToggleButtonModel<bool>> {
        &self.expand_button
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded.get()
    }

    pub fn set_expanded(&self, expanded: bool) -> ControlResult<()> {
        self.ensure_live()?;
        self.expanded.set(expanded);
        Ok(())
    }

    pub fn set_enabled(&self, enabled: bool) -> ControlResult<()> {
        self.expand_button.set_enabled(enabled)?;
        self.title_model.set_enabled(enabled)
    }

    pub fn is_enabled(&self) -> bool {
        self.expand_button.is_enabled()
    }

    pub fn dispose(&self) -> ControlResult<()> {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return Err(ControlError::Disposed { widget: "AccordionBox" });
        }
        self.subscriptions.lock().clear();
        if let Some(id) = self.title_listener {
            self.layout.title_bar.remove_input_listener(id);
        }
        self.title_model.dispose()?;
        self.expand_button.dispose()?;
        self.layout.node.detach();
        Ok(())
    }

    fn ensure_live(&self) -> ControlResult<()> {
        if self.disposed.load(Ordering::Acquire) {
            Err(ControlError::Disposed { widget: "AccordionBox" })
        } else {
            Ok(())
        }
    }
}

impl fmt::Debug for AccordionBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccordionBox")
            .field("node", &self.layout.node.id())
            .field("expanded", &self.is_expanded())
            .finish()
    }
}

static_assertions::assert_impl_all!(AccordionBox: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Display, Key};
    use horizon_controls_core::Property;
    use horizon_controls_render::Point;

    fn setup(options: AccordionBoxOptions) -> (Display, AccordionBox, SharedProperty<bool>) {
        let display = Display::new(Size::new(400.0, 400.0));
        let expanded = Property::shared(true);
        let title = Node::rectangle("title", Rect::new(0.0, 0.0, 60.0, 14.0));
        let content = Node::rectangle("content", Rect::new(0.0, 0.0, 100.0, 50.0));
        let accordion = AccordionBox::new(title, content, expanded.clone(), options).unwrap();
        display.root().add_child(accordion.node());
        (display, accordion, expanded)
    }

    #[test]
    fn test_expanded_layout() {
        let (_display, accordion, _expanded) = setup(AccordionBoxOptions::default());
        // Title bar: max(16 + 4, 14 + 4) = 20. Width: max(4+16+5+60+10, 100+30) = 130.
        assert_eq!(accordion.background().self_bounds(), Rect::new(0.0, 0.0, 130.0, 86.0));
        assert_eq!(accordion.content().translation(), Point::new(15.0, 28.0));
        assert_eq!(accordion.expand_button().node().translation(), Point::new(4.0, 2.0));
        assert!(accordion.content().is_visible());
    }

    #[test]
    fn test_collapse_shrinks_background() {
        let (_display, accordion, expanded) = setup(AccordionBoxOptions::default());
        expanded.set(false);
        assert_eq!(accordion.background().self_bounds(), Rect::new(0.0, 0.0, 130.0, 20.0));
        assert!(!accordion.content().is_visible());
        assert_eq!(accordion.node().local_bounds().height(), 20.0);
    }

    #[test]
    fn test_expand_button_toggles() {
        let (display, accordion, expanded) = setup(AccordionBoxOptions::default());
        display.click(Point::new(10.0, 10.0));
        assert!(!expanded.get());
        assert!(!accordion.is_expanded());
        display.click(Point::new(10.0, 10.0));
        assert!(expanded.get());
    }

    #[test]
    fn test_title_bar_click_toggles() {
        let (display, _accordion, expanded) = setup(AccordionBoxOptions::default());
        display.click(Point::new(60.0, 10.0));
        assert!(!expanded.get());
        display.click(Point::new(125.0, 10.0));
        assert!(expanded.get());
    }

    #[test]
    fn test_title_bar_click_disabled_by_option() {
        let (display, _accordion, expanded) =
            setup(AccordionBoxOptions::default().with_title_bar_expand_collapse(false));
        display.click(Point::new(60.0, 10.0));
        assert!(expanded.get());
    }

    #[test]
    fn test_right_aligned_button() {
        let (_display, accordion, _expanded) =
            setup(AccordionBoxOptions::default().with_button_align(ButtonAlign::Right));
        assert_eq!(accordion.expand_button().node().translation(), Point::new(110.0, 2.0));
    }

    #[test]
    fn test_keyboard_on_expand_button() {
        let (display, accordion, expanded) = setup(AccordionBoxOptions::default());
        assert!(display.focus(accordion.expand_button().node()));
        display.key_down(Key::Enter, false);
        assert!(!expanded.get());
    }

    #[test]
    fn test_disabled_ignores_clicks() {
        let (display, accordion, expanded) = setup(AccordionBoxOptions::default());
        accordion.set_enabled(false).unwrap();
        display.click(Point::new(10.0, 10.0));
        display.click(Point::new(60.0, 10.0));
        assert!(expanded.get());
    }

    #[test]
    fn test_dispose() {
        let (display, accordion, expanded) = setup(AccordionBoxOptions::default());
        accordion.dispose().unwrap();
        assert_eq!(display.root().child_count(), 0);
        assert_eq!(expanded.subscriber_count(), 0);
        assert!(accordion.set_expanded(false).is_err());
        assert!(accordion.dispose().is_err());
    }
}
