//! ComboBox widget: a button showing the current choice and a popup list.
//!
//! The popup lives under a caller-chosen `list_parent` node (usually a layer
//! above the rest of the scene) so it can overlap other content. Its position
//! is recomputed from the button's bounds on every open.
//!
//! While open, the combo box holds its display's dismiss slot: the click that
//! opened it only arms the slot, and any later press outside the list and the
//! button closes the list without changing the value. Opening a second combo
//! box on the same display force-closes the first.
//!
//! # Keyboard
//!
//! | key | button focused | list open |
//! |---|---|---|
//! | Enter / Space | open, focusing the current item | choose the focused item |
//! | Up / Down | | move focus one item, no wraparound |
//! | Escape | close | close and focus the button |
//! | Tab | | close, focus moves on |
//!
//! # Example
//!
//! ```
//! use horizon_controls::scene::{Display, Node};
//! use horizon_controls::widgets::{ComboBox, ComboBoxItem, ComboBoxOptions};
//! use horizon_controls_core::Property;
//! use horizon_controls_render::{Rect, Size};
//!
//! let display = Display::new(Size::new(400.0, 300.0));
//! let layer = Node::named("popups");
//! display.root().add_child(&layer);
//!
//! let speed = Property::shared("slow");
//! let items = ["slow", "fast"]
//!     .into_iter()
//!     .map(|v| ComboBoxItem::new(v, move || Node::rectangle(v, Rect::new(0.0, 0.0, 50.0, 14.0))))
//!     .collect();
//! let combo = ComboBox::new(items, speed, &layer, &display, ComboBoxOptions::default()).unwrap();
//! display.root().add_child(combo.node());
//! ```

use std::fmt;
use std::sync::{Arc, Weak};

use horizon_controls_core::logging::span_names;
use horizon_controls_core::{PerfSpan, SharedProperty, Signal, Subscription};
use horizon_controls_render::{Color, Paint, Rect, Size, Stroke};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::button::{AppearanceKind, Button, ButtonModel, ButtonOptions, ButtonShape};
use crate::error::{ControlError, ControlResult, ensure_non_negative, ensure_unit_open};
use crate::scene::{Display, FnListener, Key, KeyEvent, ListenerId, Node, PointerEvent, PointerKind};

/// Values a combo box can choose between.
pub trait ComboBoxValue: Clone + PartialEq + Send + Sync + fmt::Debug + 'static {}

impl<T> ComboBoxValue for T where T: Clone + PartialEq + Send + Sync + fmt::Debug + 'static {}

// ============================================================================
// Items and options
// ============================================================================

/// A choice: a value and a factory for the node that shows it.
///
/// The factory is called once for the list row and again whenever the
/// button needs to show this item.
pub struct ComboBoxItem<T> {
    value: T,
    create_node: Arc<dyn Fn() -> Node + Send + Sync>,
}

impl<T> ComboBoxItem<T> {
    pub fn new<F>(value: T, create_node: F) -> Self
    where
        F: Fn() -> Node + Send + Sync + 'static,
    {
        Self {
            value,
            create_node: Arc::new(create_node),
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn create_node(&self) -> Node {
        (self.create_node)()
    }
}

impl<T: fmt::Debug> fmt::Debug for ComboBoxItem<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComboBoxItem").field("value", &self.value).finish()
    }
}

/// Where the list opens relative to the button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListPosition {
    /// List bottom edge on the button's top edge.
    Above,
    /// List top edge on the button's bottom edge.
    #[default]
    Below,
}

/// Options for [`ComboBox`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboBoxOptions {
    pub list_position: ListPosition,
    /// Horizontal margin inside the button.
    pub x_margin: f32,
    /// Vertical margin inside the button.
    pub y_margin: f32,
    pub item_x_margin: f32,
    pub item_y_margin: f32,
    pub corner_radius: f32,
    pub button_fill: Color,
    pub button_stroke: Color,
    pub button_line_width: f32,
    pub arrow_color: Color,
    pub list_fill: Color,
    pub list_stroke: Color,
    pub list_line_width: f32,
    /// Fill of the row under the pointer or keyboard focus.
    pub highlight_fill: Color,
    /// Content opacity of a disabled button, in (0, 1).
    pub disabled_opacity: f32,
}

impl Default for ComboBoxOptions {
    fn default() -> Self {
        Self {
            list_position: ListPosition::Below,
            x_margin: 12.0,
            y_margin: 8.0,
            item_x_margin: 6.0,
            item_y_margin: 6.0,
            corner_radius: 4.0,
            button_fill: Color::WHITE,
            button_stroke: Color::BLACK,
            button_line_width: 1.0,
            arrow_color: Color::BLACK,
            list_fill: Color::WHITE,
            list_stroke: Color::BLACK,
            list_line_width: 1.0,
            highlight_fill: Color::from_rgb8(200, 230, 255),
            disabled_opacity: 0.5,
        }
    }
}

impl ComboBoxOptions {
    pub fn with_list_position(mut self, position: ListPosition) -> Self {
        self.list_position = position;
        self
    }

    pub fn with_margins(mut self, x_margin: f32, y_margin: f32) -> Self {
        self.x_margin = x_margin;
        self.y_margin = y_margin;
        self
    }

    pub fn with_item_margins(mut self, x_margin: f32, y_margin: f32) -> Self {
        self.item_x_margin = x_margin;
        self.item_y_margin = y_margin;
        self
    }

    pub fn with_highlight_fill(mut self, color: Color) -> Self {
        self.highlight_fill = color;
        self
    }

    pub fn with_disabled_opacity(mut self, opacity: f32) -> Self {
        self.disabled_opacity = opacity;
        self
    }

    pub fn validate(&self) -> ControlResult<()> {
        ensure_non_negative("x_margin", self.x_margin)?;
        ensure_non_negative("y_margin", self.y_margin)?;
        ensure_non_negative("item_x_margin", self.item_x_margin)?;
        ensure_non_negative("item_y_margin", self.item_y_margin)?;
        ensure_non_negative("corner_radius", self.corner_radius)?;
        ensure_non_negative("button_line_width", self.button_line_width)?;
        ensure_non_negative("list_line_width", self.list_line_width)?;
        ensure_unit_open("disabled_opacity", self.disabled_opacity)
    }

    fn button_options(&self) -> ButtonOptions {
        ButtonOptions::default()
            .with_shape(ButtonShape::Rectangular {
                corner_radius: self.corner_radius,
            })
            .with_appearance(AppearanceKind::Flat)
            .with_base_color(self.button_fill)
            .with_stroke(Some(self.button_stroke))
            .with_line_width(self.button_line_width)
            .with_margins(self.x_margin, self.y_margin)
            .with_fire_on_down(true)
            .with_disabled_content_opacity(self.disabled_opacity)
    }
}

// ============================================================================
// Controller
// ============================================================================

struct Row<T> {
    item: ComboBoxItem<T>,
    node: Node,
}

#[derive(Debug, Default)]
struct ComboState {
    open: bool,
    focused_item: Option<usize>,
    disposed: bool,
}

struct ComboInner<T: ComboBoxValue> {
    this: Weak<Self>,
    rows: Vec<Row<T>>,
    value: SharedProperty<T>,
    node: Node,
    button: Button<ButtonModel>,
    selection: Node,
    list_box: Node,
    display: Display,
    list_position: ListPosition,
    highlight_fill: Color,
    state: Mutex<ComboState>,
    open_changed: Signal<bool>,
    subscriptions: Mutex<Vec<Subscription>>,
    button_key_listener: Mutex<Option<ListenerId>>,
}

impl<T: ComboBoxValue> ComboInner<T> {
    fn index_of(&self, value: &T) -> Option<usize> {
        self.rows.iter().position(|row| row.item.value == *value)
    }

    fn is_open(&self) -> bool {
        self.state.lock().open
    }

    fn on_button_fired(&self) {
        // Fire-on-down: a pointer activation fires while the model is down.
        let keyboard = !self.button.model().is_down();
        if self.is_open() {
            self.hide();
        } else {
            self.open(keyboard);
        }
    }

    fn open(&self, keyboard: bool) {
        {
            let mut state = self.state.lock();
            if state.open || state.disposed {
                return;
            }
            state.open = true;
            state.focused_item = None;
        }
        let _span = PerfSpan::new(span_names::POPUP_OPEN);

        let list_parent = self.list_box.parent().unwrap_or_else(|| self.display.root().clone());
        let button_bounds = list_parent.global_to_local_rect(&self.button.node().global_bounds());
        let list_height = self.list_box.self_bounds().height();
        let top = match self.list_position {
            ListPosition::Above => button_bounds.top() - list_height,
            ListPosition::Below => button_bounds.bottom(),
        };
        self.list_box.set_translation(button_bounds.left(), top);
        self.list_box.set_visible(true);
        self.list_box.move_to_front();

        let weak = self.this.clone();
        self.display.acquire_dismiss(
            self.node.id(),
            vec![self.list_box.clone(), self.button.node().clone()],
            move || {
                if let Some(combo) = weak.upgrade() {
                    combo.dismiss();
                }
            },
        );

        tracing::debug!(
            target: "horizon_controls::combo_box",
            combo = %self.node.id(),
            keyboard,
            x = button_bounds.left(),
            y = top,
            "list opened"
        );
        self.open_changed.emit(true);

        if keyboard && let Some(index) = self.index_of(&self.value.get()) {
            self.focus_item(index);
        }
    }

    fn hide(&self) {
        let was_open = {
            let mut state = self.state.lock();
            state.focused_item = None;
            std::mem::replace(&mut state.open, false)
        };
        if !was_open {
            return;
        }
        self.list_box.set_visible(false);
        self.display.release_dismiss(self.node.id());
        self.highlight(None);
        tracing::debug!(target: "horizon_controls::combo_box", combo = %self.node.id(), "list closed");
        self.open_changed.emit(false);
    }

    /// Outside press: close without touching the value.
    fn dismiss(&self) {
        self.hide();
        if self
            .display
            .focused()
            .is_some_and(|focused| self.list_box.is_ancestor_of(&focused))
        {
            self.display.blur();
        }
    }

    fn select(&self, index: usize) {
        let Some(row) = self.rows.get(index) else {
            return;
        };
        tracing::debug!(
            target: "horizon_controls::combo_box",
            combo = %self.node.id(),
            index,
            value = ?row.item.value,
            "item selected"
        );
        self.value.set(row.item.value.clone());
        self.hide();
        self.focus_button();
    }

    fn focus_button(&self) {
        if self.button.node().is_focusable() {
            self.display.focus(self.button.node());
        }
    }

    fn focus_item(&self, index: usize) {
        let Some(row) = self.rows.get(index) else {
            return;
        };
        self.state.lock().focused_item = Some(index);
        self.display.focus(&row.node);
        self.highlight(Some(index));
    }

    fn move_focus(&self, down: bool) {
        let next = {
            let state = self.state.lock();
            if !state.open {
                return;
            }
            match (state.focused_item, down) {
                (None, true) => Some(0),
                (None, false) => None,
                (Some(i), true) => (i + 1 < self.rows.len()).then_some(i + 1),
                (Some(i), false) => i.checked_sub(1),
            }
        };
        if let Some(index) = next {
            self.focus_item(index);
        }
    }

    fn highlight(&self, index: Option<usize>) {
        for (i, row) in self.rows.iter().enumerate() {
            let fill = (Some(i) == index).then(|| Paint::solid(self.highlight_fill));
            row.node.set_fill(fill);
        }
    }

    fn show_value(&self, value: &T) {
        let Some(index) = self.index_of(value) else {
            tracing::warn!(
                target: "horizon_controls::combo_box",
                value = ?value,
                "value has no matching item, keeping the displayed item"
            );
            return;
        };
        let slot = self.selection.self_bounds();
        let shown = self.rows[index].item.create_node();
        let b = shown.local_bounds();
        shown.set_translation(-b.left(), (slot.height() - b.height()) / 2.0 - b.top());
        shown.set_pickable(false);
        for child in self.selection.children() {
            self.selection.remove_child(&child);
        }
        self.selection.add_child(&shown);
    }

    fn list_key(&self, event: &KeyEvent) {
        match event.key() {
            Key::ArrowDown => {
                self.move_focus(true);
                event.abort();
            }
            Key::ArrowUp => {
                self.move_focus(false);
                event.abort();
            }
            key if key.is_activation() => {
                let focused = self.state.lock().focused_item;
                if let Some(index) = focused {
                    self.select(index);
                }
                event.abort();
            }
            Key::Escape => {
                self.hide();
                self.focus_button();
                event.abort();
            }
            // Close and let the display move focus on.
            Key::Tab => self.hide(),
            _ => {}
        }
    }

    fn button_key(&self, event: &KeyEvent) {
        if event.key() == Key::Escape && self.is_open() {
            self.hide();
            self.focus_button();
            event.abort();
        }
    }

    fn row_pointer(&self, index: usize, event: &PointerEvent, row: &Node) {
        match event.kind() {
            PointerKind::Enter => self.highlight(Some(index)),
            PointerKind::Exit => {
                let focused = self.state.lock().focused_item;
                self.highlight(focused);
            }
            PointerKind::Up if self.is_open() && row.global_bounds().contains(event.global_pos()) => {
                self.select(index);
            }
            _ => {}
        }
    }
}

/// A drop-down chooser bound to a shared value.
pub struct ComboBox<T: ComboBoxValue> {
    inner: Arc<ComboInner<T>>,
}

impl<T: ComboBoxValue> ComboBox<T> {
    /// Build a combo box over `items`, bound to `value`.
    ///
    /// The list is added to `list_parent` (hidden). Fails if `items` is
    /// empty or no item matches the current value.
    pub fn new(
        items: Vec<ComboBoxItem<T>>,
        value: SharedProperty<T>,
        list_parent: &Node,
        display: &Display,
        options: ComboBoxOptions,
    ) -> ControlResult<Self> {
        options.validate()?;
        if items.is_empty() {
            return Err(ControlError::NoItems { widget: "ComboBox" });
        }
        let current = value.get();
        if !items.iter().any(|item| item.value == current) {
            return Err(ControlError::NoMatchingItem {
                value: format!("{current:?}"),
            });
        }

        let contents: Vec<Node> = items.iter().map(ComboBoxItem::create_node).collect();
        let (max_width, max_height) = contents.iter().fold((0.0_f32, 0.0_f32), |(w, h), node| {
            let b = node.local_bounds();
            (w.max(b.width()), h.max(b.height()))
        });

        // Button: a fixed-size slot for the current item, then an arrow.
        let selection = Node::rectangle("combo-selection", Rect::new(0.0, 0.0, max_width, max_height));
        selection.set_pickable(false);
        let arrow_height = (max_height * 0.5).max(4.0);
        let arrow = Node::rectangle("combo-arrow", Rect::new(0.0, 0.0, arrow_height * 1.2, arrow_height))
            .with_fill(options.arrow_color)
            .with_translation(max_width + options.x_margin, (max_height - arrow_height) / 2.0);
        arrow.set_pickable(false);
        let content = Node::named("combo-button-content")
            .with_child(&selection)
            .with_child(&arrow);
        let button = Button::push(Some(content), options.button_options())?;
        let node = Node::named("combo-box").with_child(button.node());

        // List: one focusable row per item.
        let row_width = (max_width + 2.0 * options.item_x_margin).max(button.size().width);
        let row_height = max_height + 2.0 * options.item_y_margin;
        let list_box = Node::rectangle(
            "combo-list",
            Rect::new(0.0, 0.0, row_width, row_height * items.len() as f32),
        )
        .with_fill(options.list_fill)
        .with_stroke(Stroke::new(options.list_stroke, options.list_line_width));
        list_box.set_visible(false);

        let rows: Vec<Row<T>> = items
            .into_iter()
            .zip(contents)
            .enumerate()
            .map(|(i, (item, content))| {
                let row = Node::rectangle(format!("combo-item-{i}"), Rect::new(0.0, 0.0, row_width, row_height))
                    .with_translation(0.0, i as f32 * row_height)
                    .with_focusable(true);
                let b = content.local_bounds();
                content.set_translation(
                    options.item_x_margin - b.left(),
                    (row_height - b.height()) / 2.0 - b.top(),
                );
                row.add_child(&content);
                list_box.add_child(&row);
                Row { item, node: row }
            })
            .collect();
        list_parent.add_child(&list_box);

        let inner = Arc::new_cyclic(|this| ComboInner {
            this: this.clone(),
            rows,
            value,
            node,
            button,
            selection,
            list_box,
            display: display.clone(),
            list_position: options.list_position,
            highlight_fill: options.highlight_fill,
            state: Mutex::new(ComboState::default()),
            open_changed: Signal::new(),
            subscriptions: Mutex::new(Vec::new()),
            button_key_listener: Mutex::new(None),
        });
        inner.show_value(&current);
        Self::connect(&inner);

        tracing::debug!(
            target: "horizon_controls::combo_box",
            combo = %inner.node.id(),
            items = inner.rows.len(),
            "combo box created"
        );
        Ok(Self { inner })
    }

    fn connect(inner: &Arc<ComboInner<T>>) {
        let mut subscriptions = inner.subscriptions.lock();

        let weak = Arc::downgrade(inner);
        subscriptions.push(inner.button.model().on_fire(move || {
            if let Some(combo) = weak.upgrade() {
                combo.on_button_fired();
            }
        }));

        let weak = Arc::downgrade(inner);
        subscriptions.push(inner.value.subscribe(move |change| {
            if let Some(combo) = weak.upgrade() {
                combo.show_value(&change.new);
            }
        }));

        let weak = Arc::downgrade(inner);
        let key_listener = inner
            .button
            .node()
            .add_input_listener(Arc::new(FnListener::new().on_key(move |event, _node| {
                if let Some(combo) = weak.upgrade() {
                    combo.button_key(event);
                }
            })));
        *inner.button_key_listener.lock() = Some(key_listener);

        let weak = Arc::downgrade(inner);
        inner
            .list_box
            .add_input_listener(Arc::new(FnListener::new().on_key(move |event, _node| {
                if let Some(combo) = weak.upgrade() {
                    combo.list_key(event);
                }
            })));

        for (index, row) in inner.rows.iter().enumerate() {
            let weak = Arc::downgrade(inner);
            row.node
                .add_input_listener(Arc::new(FnListener::new().on_pointer(move |event, node| {
                    if let Some(combo) = weak.upgrade() {
                        combo.row_pointer(index, event, node);
                    }
                })));
        }
    }

    // =========================================================================
    // State
    // =========================================================================

    /// The combo box's node. Add it to the scene and position it.
    pub fn node(&self) -> &Node {
        &self.inner.node
    }

    pub fn button(&self) -> &Button<ButtonModel> {
        &self.inner.button
    }

    /// The popup list node.
    pub fn list_box(&self) -> &Node {
        &self.inner.list_box
    }

    /// The row node of item `index`.
    pub fn item_node(&self, index: usize) -> Option<&Node> {
        self.inner.rows.get(index).map(|row| &row.node)
    }

    pub fn item_count(&self) -> usize {
        self.inner.rows.len()
    }

    pub fn value(&self) -> T {
        self.inner.value.get()
    }

    /// Index of the first item matching the current value.
    pub fn selected_index(&self) -> Option<usize> {
        self.inner.index_of(&self.inner.value.get())
    }

    pub fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    /// The keyboard-focused row while open.
    pub fn focused_item_index(&self) -> Option<usize> {
        self.inner.state.lock().focused_item
    }

    /// Emitted with `true` on open and `false` on close.
    pub fn open_changed(&self) -> &Signal<bool> {
        &self.inner.open_changed
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Open the list as a pointer activation would (no item focused).
    pub fn open(&self) -> ControlResult<()> {
        self.ensure_live()?;
        self.inner.open(false);
        Ok(())
    }

    /// Close the list without changing the value.
    pub fn hide(&self) -> ControlResult<()> {
        self.ensure_live()?;
        self.inner.hide();
        Ok(())
    }

    /// Enable or disable the button. Disabling closes the list.
    pub fn set_enabled(&self, enabled: bool) -> ControlResult<()> {
        self.ensure_live()?;
        if !enabled {
            self.inner.hide();
        }
        self.inner.button.set_enabled(enabled)
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.button.is_enabled()
    }

    /// Close the list, remove it and the button from the scene and release
    /// every listener. The bound value is left as it is.
    pub fn dispose(&self) -> ControlResult<()> {
        self.ensure_live()?;
        self.inner.hide();
        self.inner.state.lock().disposed = true;
        self.inner.subscriptions.lock().clear();
        if let Some(id) = self.inner.button_key_listener.lock().take() {
            self.inner.button.node().remove_input_listener(id);
        }
        self.inner.list_box.clear_input_listeners();
        for row in &self.inner.rows {
            row.node.clear_input_listeners();
        }
        self.inner.list_box.detach();
        self.inner.node.detach();
        tracing::debug!(target: "horizon_controls::combo_box", combo = %self.inner.node.id(), "combo box disposed");
        self.inner.button.dispose()
    }

    fn ensure_live(&self) -> ControlResult<()> {
        if self.inner.state.lock().disposed {
            tracing::error!(target: "horizon_controls::combo_box", combo = %self.inner.node.id(), "combo box used after dispose");
            Err(ControlError::Disposed { widget: "ComboBox" })
        } else {
            Ok(())
        }
    }
}

impl<T: ComboBoxValue> fmt::Debug for ComboBox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("ComboBox")
            .field("node", &self.inner.node.id())
            .field("value", &self.inner.value.get())
            .field("open", &state.open)
            .field("focused_item", &state.focused_item)
            .finish()
    }
}

static_assertions::assert_impl_all!(ComboBox<String>: Send, Sync);
