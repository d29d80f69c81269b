//! The composed button widget.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use horizon_controls_core::{SharedProperty, Subscription};
use horizon_controls_render::{Rect, Size};
use parking_lot::Mutex;

use super::appearance::{AppearanceBinder, AppearanceColors, AppearanceStrategy, ContentFade};
use super::model::ButtonModel;
use super::options::{ButtonOptions, ButtonShape};
use super::state::{InteractionState, InteractionStateProperty};
use super::sticky::StickyToggleButtonModel;
use super::toggle::{ToggleButtonModel, ToggleValue};
use crate::error::{ControlError, ControlResult};
use crate::scene::{InputListener, KeyEvent, ListenerId, Node, PointerEvent, PointerId, PointerKind};

/// What a [`Button`] does when activated.
pub trait ButtonBehavior: Send + Sync + 'static {
    fn button_model(&self) -> &ButtonModel;

    /// A flag that makes the button look pressed while `true`.
    fn held_down(&self) -> Option<SharedProperty<bool>> {
        None
    }

    fn dispose(&self) -> ControlResult<()>;
}

impl ButtonBehavior for ButtonModel {
    fn button_model(&self) -> &ButtonModel {
        self
    }

    fn dispose(&self) -> ControlResult<()> {
        ButtonModel::dispose(self)
    }
}

impl<T: ToggleValue> ButtonBehavior for ToggleButtonModel<T> {
    fn button_model(&self) -> &ButtonModel {
        ToggleButtonModel::button_model(self)
    }

    fn held_down(&self) -> Option<SharedProperty<bool>> {
        ToggleButtonModel::held_down(self).cloned()
    }

    fn dispose(&self) -> ControlResult<()> {
        ToggleButtonModel::dispose(self)
    }
}

impl<T: ToggleValue> ButtonBehavior for StickyToggleButtonModel<T> {
    fn button_model(&self) -> &ButtonModel {
        StickyToggleButtonModel::button_model(self)
    }

    fn held_down(&self) -> Option<SharedProperty<bool>> {
        Some(StickyToggleButtonModel::held_down(self).clone())
    }

    fn dispose(&self) -> ControlResult<()> {
        StickyToggleButtonModel::dispose(self)
    }
}

/// Maps scene input on a node to a button model.
///
/// Enter/Exit drive `over`, a Down/Up pair from the same pointer drives
/// `down`, and Enter or Space fires when the node itself has focus.
pub(crate) struct ButtonInput<B: ButtonBehavior> {
    behavior: Arc<B>,
    pressing: Mutex<Option<PointerId>>,
}

impl<B: ButtonBehavior> ButtonInput<B> {
    pub(crate) fn new(behavior: Arc<B>) -> Self {
        Self {
            behavior,
            pressing: Mutex::new(None),
        }
    }

    fn report(result: ControlResult<()>) {
        if let Err(err) = result {
            tracing::warn!(target: "horizon_controls::button", %err, "ignoring input");
        }
    }
}

impl<B: ButtonBehavior> InputListener for ButtonInput<B> {
    fn pointer_event(&self, event: &PointerEvent, _node: &Node) {
        let model = self.behavior.button_model();
        match event.kind() {
            PointerKind::Enter => Self::report(model.pointer_enter()),
            PointerKind::Exit => Self::report(model.pointer_exit()),
            PointerKind::Down => {
                let mut pressing = self.pressing.lock();
                if pressing.is_none() {
                    *pressing = Some(event.pointer());
                    drop(pressing);
                    Self::report(model.pointer_down());
                }
            }
            PointerKind::Up => {
                let mut pressing = self.pressing.lock();
                if *pressing == Some(event.pointer()) {
                    *pressing = None;
                    drop(pressing);
                    Self::report(model.pointer_up());
                }
            }
            PointerKind::Move => {}
        }
    }

    fn key_down(&self, event: &KeyEvent, node: &Node) {
        if event.key().is_activation() && event.target() == Some(node) {
            Self::report(self.behavior.button_model().fire());
            event.abort();
        }
    }
}

/// A button: a behavior, an appearance strategy and a few scene nodes.
///
/// The button's [`node`](Self::node) holds a background, an overlay (used by
/// layered strategies) and the optional content, centered. Add the node to
/// the scene and position it with [`Node::set_translation`].
///
/// # Example
///
/// ```
/// use horizon_controls::button::{Button, ButtonOptions};
/// use horizon_controls::scene::Node;
/// use horizon_controls_render::Rect;
///
/// let label = Node::rectangle("label", Rect::new(0.0, 0.0, 40.0, 12.0));
/// let button = Button::push(Some(label), ButtonOptions::default()).unwrap();
/// assert_eq!(button.size().width, 56.0);
/// ```
pub struct Button<B: ButtonBehavior> {
    node: Node,
    background: Node,
    overlay: Node,
    content: Option<Node>,
    behavior: Arc<B>,
    state: InteractionStateProperty,
    binder: AppearanceBinder,
    fade: Option<ContentFade>,
    strategy: Mutex<Arc<dyn AppearanceStrategy>>,
    options: ButtonOptions,
    listener: ListenerId,
    listeners: Mutex<Vec<Subscription>>,
    disposed: AtomicBool,
}

impl Button<ButtonModel> {
    /// A push button.
    pub fn push(content: Option<Node>, options: ButtonOptions) -> ControlResult<Self> {
        let model = Arc::new(ButtonModel::new(options.fire_on_down));
        Self::new(model, content, options)
    }
}

impl<T: ToggleValue> Button<ToggleButtonModel<T>> {
    /// A button that flips `cell` between `value_off` and `value_on`.
    pub fn toggle(
        value_off: T,
        value_on: T,
        cell: SharedProperty<T>,
        content: Option<Node>,
        options: ButtonOptions,
    ) -> ControlResult<Self> {
        let model = ToggleButtonModel::with_options(value_off, value_on, cell, None, options.fire_on_down)?;
        Self::new(model, content, options)
    }
}

impl<T: ToggleValue> Button<StickyToggleButtonModel<T>> {
    /// A button that stays pressed while `cell` holds `value_down`.
    pub fn sticky(
        value_up: T,
        value_down: T,
        cell: SharedProperty<T>,
        content: Option<Node>,
        options: ButtonOptions,
    ) -> ControlResult<Self> {
        if options.fire_on_down {
            return Err(ControlError::invalid_option(
                "fire_on_down",
                "sticky buttons complete their gesture on release",
            ));
        }
        let model = StickyToggleButtonModel::new(value_up, value_down, cell)?;
        Self::new(model, content, options)
    }
}

impl<B: ButtonBehavior> Button<B> {
    /// Build a button around an existing behavior.
    pub fn new(behavior: Arc<B>, content: Option<Node>, options: ButtonOptions) -> ControlResult<Self> {
        options.validate()?;
        let size = Self::measure(content.as_ref(), &options)?;
        let bounds = Rect::from_size(size);

        let node = Node::named("button").with_focusable(options.focusable);
        let background = Node::rectangle("button-background", bounds);
        let overlay = Node::rectangle("button-overlay", bounds);
        overlay.set_pickable(false);
        node.add_child(&background);
        node.add_child(&overlay);
        if let Some(content) = &content {
            let center = content.local_bounds().center();
            content.set_translation(size.width / 2.0 - center.x, size.height / 2.0 - center.y);
            node.add_child(content);
        }
        if options.touch_expansion > 0.0 {
            node.set_touch_area(Some(bounds.dilated(options.touch_expansion)));
        }

        let model = behavior.button_model();
        let state = match behavior.held_down() {
            Some(held) => InteractionStateProperty::with_held_down(model, held),
            None => InteractionStateProperty::new(model),
        };

        let strategy = options.appearance.strategy();
        let table = strategy.style_table(options.shape, bounds, &AppearanceColors::from_options(&options));
        let binder = AppearanceBinder::new(&state, table, background.clone(), Some(overlay.clone()));
        let fade = content
            .as_ref()
            .map(|content| ContentFade::new(&state, content.clone(), options.disabled_content_opacity));

        let listener = node.add_input_listener(Arc::new(ButtonInput::new(behavior.clone())));

        tracing::debug!(
            target: "horizon_controls::button",
            node = %node.id(),
            width = size.width,
            height = size.height,
            strategy = strategy.name(),
            "button created"
        );

        Ok(Self {
            node,
            background,
            overlay,
            content,
            behavior,
            state,
            binder,
            fade,
            strategy: Mutex::new(strategy),
            options,
            listener,
            listeners: Mutex::new(Vec::new()),
            disposed: AtomicBool::new(false),
        })
    }

    fn measure(content: Option<&Node>, options: &ButtonOptions) -> ControlResult<Size> {
        let content_size = content.map(|c| {
            let b = c.local_bounds();
            Size::new(b.width(), b.height())
        });
        match options.shape {
            ButtonShape::Rectangular { .. } => {
                let size = match (options.size, content_size) {
                    (Some(size), _) => size,
                    (None, Some(c)) => Size::new(c.width + 2.0 * options.x_margin, c.height + 2.0 * options.y_margin),
                    (None, None) => return Err(ControlError::MissingContent { widget: "Button" }),
                };
                Ok(Size::new(
                    size.width.max(options.min_width),
                    size.height.max(options.min_height),
                ))
            }
            ButtonShape::Round => {
                let radius = match (options.radius, content_size) {
                    (Some(radius), _) => radius,
                    (None, Some(c)) => c.width.max(c.height) / 2.0 + options.x_margin.max(options.y_margin),
                    (None, None) => return Err(ControlError::MissingContent { widget: "Button" }),
                };
                let radius = radius.max(options.min_width / 2.0).max(options.min_height / 2.0);
                Ok(Size::new(radius * 2.0, radius * 2.0))
            }
        }
    }

    /// Run `action` on every fire.
    pub fn with_listener<F>(self, action: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let sub = self.model().on_fire(action);
        self.listeners.lock().push(sub);
        self
    }

    /// Swap the appearance strategy. The model and state are untouched.
    pub fn set_strategy(&self, strategy: Arc<dyn AppearanceStrategy>) {
        let bounds = self.background.self_bounds();
        let table = strategy.style_table(self.options.shape, bounds, &AppearanceColors::from_options(&self.options));
        tracing::debug!(target: "horizon_controls::button", strategy = strategy.name(), "appearance strategy changed");
        self.binder.set_table(table);
        *self.strategy.lock() = strategy;
    }

    pub fn with_strategy(self, strategy: Arc<dyn AppearanceStrategy>) -> Self {
        self.set_strategy(strategy);
        self
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.lock().name()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn background(&self) -> &Node {
        &self.background
    }

    pub fn overlay(&self) -> &Node {
        &self.overlay
    }

    pub fn content(&self) -> Option<&Node> {
        self.content.as_ref()
    }

    pub fn behavior(&self) -> &Arc<B> {
        &self.behavior
    }

    pub fn model(&self) -> &ButtonModel {
        self.behavior.button_model()
    }

    pub fn interaction_state(&self) -> InteractionState {
        self.state.get()
    }

    pub fn state_property(&self) -> &InteractionStateProperty {
        &self.state
    }

    pub fn options(&self) -> &ButtonOptions {
        &self.options
    }

    pub fn size(&self) -> Size {
        let b = self.background.self_bounds();
        Size::new(b.width(), b.height())
    }

    pub fn set_enabled(&self, enabled: bool) -> ControlResult<()> {
        self.model().set_enabled(enabled)
    }

    pub fn is_enabled(&self) -> bool {
        self.model().is_enabled()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Detach the button from the scene and release its model. Fails if
    /// already disposed.
    pub fn dispose(&self) -> ControlResult<()> {
        if self.disposed.swap(true, Ordering::AcqRel) {
            tracing::error!(target: "horizon_controls::button", node = %self.node.id(), "button disposed twice");
            return Err(ControlError::Disposed { widget: "Button" });
        }
        self.node.remove_input_listener(self.listener);
        self.listeners.lock().clear();
        self.binder.unbind();
        if let Some(fade) = &self.fade {
            fade.unbind();
        }
        self.state.unbind();
        self.node.detach();
        self.behavior.dispose()
    }
}

impl<B: ButtonBehavior> fmt::Debug for Button<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Button")
            .field("node", &self.node.id())
            .field("state", &self.state.get())
            .field("strategy", &self.strategy_name())
            .field("size", &self.size())
            .finish()
    }
}

static_assertions::assert_impl_all!(Button<ButtonModel>: Send, Sync);
