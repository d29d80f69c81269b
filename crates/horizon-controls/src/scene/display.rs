//! The top-level display: input dispatch, keyboard focus and the dismiss slot.
//!
//! A [`Display`] owns the root node of a scene and turns raw pointer and
//! keyboard input into per-node events:
//!
//! - Hover is tracked per pointer. Moving from one node to another produces
//!   Exit events (deepest first) and Enter events (shallowest first) for the
//!   nodes that left or joined the hover trail.
//! - A Down event captures its trail. Later Move and Up events for the same
//!   pointer are delivered to that trail, so a button still sees its release
//!   after the pointer has left it.
//! - Key events bubble from the focused node. An unaborted Tab moves focus.
//!
//! # Dismiss slot
//!
//! A display has exactly one dismiss slot, used by popups that close when the
//! user clicks elsewhere. [`acquire_dismiss`](Display::acquire_dismiss)
//! force-closes the current holder before installing the new one, so popups
//! never stack. After node dispatch, every Down event is offered to the slot:
//! the first Down observed after acquisition only arms it, and each later Down
//! outside the registered nodes calls the holder's dismiss callback.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use horizon_controls_core::logging::span_names;
use horizon_controls_core::{PerfSpan, Signal};
use horizon_controls_render::{Point, Rect, Size};
use parking_lot::Mutex;

use super::events::{Key, KeyEvent, PointerEvent, PointerId, PointerKind};
use super::node::{Node, NodeId};

type DismissCallback = Arc<dyn Fn() + Send + Sync>;

struct DismissSlot {
    owner: NodeId,
    inside: Vec<Node>,
    on_dismiss: DismissCallback,
    armed: bool,
}

#[derive(Default)]
struct DisplayState {
    focused: Option<Node>,
    hover: HashMap<PointerId, Vec<Node>>,
    captured: HashMap<PointerId, Vec<Node>>,
    dismiss: Option<DismissSlot>,
}

struct DisplayInner {
    root: Node,
    size: Size,
    state: Mutex<DisplayState>,
    focus_changed: Signal<Option<NodeId>>,
}

/// A top-level display. Clones share the same display.
#[derive(Clone)]
pub struct Display {
    inner: Arc<DisplayInner>,
}

impl Display {
    /// Create a display of the given size with a fresh root node.
    pub fn new(size: Size) -> Self {
        Self::with_root(Node::named("display-root"), size)
    }

    /// Create a display around an existing root node.
    pub fn with_root(root: Node, size: Size) -> Self {
        Self {
            inner: Arc::new(DisplayInner {
                root,
                size,
                state: Mutex::new(DisplayState::default()),
                focus_changed: Signal::new(),
            }),
        }
    }

    pub fn root(&self) -> &Node {
        &self.inner.root
    }

    pub fn size(&self) -> Size {
        self.inner.size
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.inner.size)
    }

    /// Emitted with the newly focused node's ID (or `None`) on every focus
    /// change.
    pub fn focus_changed(&self) -> &Signal<Option<NodeId>> {
        &self.inner.focus_changed
    }

    // =========================================================================
    // Pointer input
    // =========================================================================

    pub fn pointer_move(&self, pointer: PointerId, pos: Point) {
        self.update_hover(pointer, pos);
        let trail = {
            let state = self.inner.state.lock();
            state
                .captured
                .get(&pointer)
                .or_else(|| state.hover.get(&pointer))
                .cloned()
                .unwrap_or_default()
        };
        dispatch_pointer(&PointerEvent::new(PointerKind::Move, pointer, pos, trail));
    }

    pub fn pointer_down(&self, pointer: PointerId, pos: Point) {
        let _span = PerfSpan::new(span_names::POINTER_DISPATCH);
        self.update_hover(pointer, pos);
        let trail = self.hit_trail(pos);
        self.inner
            .state
            .lock()
            .captured
            .insert(pointer, trail.clone());

        let event = PointerEvent::new(PointerKind::Down, pointer, pos, trail);
        dispatch_pointer(&event);
        self.offer_to_dismiss_slot(&event);
    }

    pub fn pointer_up(&self, pointer: PointerId, pos: Point) {
        self.update_hover(pointer, pos);
        let captured = self.inner.state.lock().captured.remove(&pointer);
        let trail = captured.unwrap_or_else(|| self.hit_trail(pos));
        dispatch_pointer(&PointerEvent::new(PointerKind::Up, pointer, pos, trail));
    }

    /// The pointer left the display (or a touch ended): exit everything it
    /// was hovering.
    pub fn pointer_leave(&self, pointer: PointerId, pos: Point) {
        let old = self
            .inner
            .state
            .lock()
            .hover
            .remove(&pointer)
            .unwrap_or_default();
        send_exits(pointer, pos, &old, &[]);
    }

    /// Move the mouse to `pos`, press and release it.
    pub fn click(&self, pos: Point) {
        self.pointer_move(PointerId::MOUSE, pos);
        self.pointer_down(PointerId::MOUSE, pos);
        self.pointer_up(PointerId::MOUSE, pos);
    }

    /// Nodes currently hovered by `pointer`, root first.
    pub fn hover_trail(&self, pointer: PointerId) -> Vec<Node> {
        self.inner
            .state
            .lock()
            .hover
            .get(&pointer)
            .cloned()
            .unwrap_or_default()
    }

    fn hit_trail(&self, pos: Point) -> Vec<Node> {
        self.inner
            .root
            .hit_test(pos)
            .map(|node| node.trail())
            .unwrap_or_default()
    }

    fn update_hover(&self, pointer: PointerId, pos: Point) {
        let new_trail = self.hit_trail(pos);
        let old_trail = self
            .inner
            .state
            .lock()
            .hover
            .insert(pointer, new_trail.clone())
            .unwrap_or_default();

        send_exits(pointer, pos, &old_trail, &new_trail);
        for (depth, node) in new_trail.iter().enumerate() {
            if !old_trail.contains(node) {
                let event = PointerEvent::new(
                    PointerKind::Enter,
                    pointer,
                    pos,
                    new_trail[..=depth].to_vec(),
                );
                deliver_pointer(&event, node);
            }
        }
    }

    // =========================================================================
    // Dismiss slot
    // =========================================================================

    /// Install `owner` as the holder of the dismiss slot.
    ///
    /// A Down on any node in `inside` (or a descendant) never dismisses. If
    /// another owner held the slot, its callback runs first so it can close.
    pub fn acquire_dismiss<F>(&self, owner: NodeId, inside: Vec<Node>, on_dismiss: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let previous = self.inner.state.lock().dismiss.replace(DismissSlot {
            owner,
            inside,
            on_dismiss: Arc::new(on_dismiss),
            armed: false,
        });
        tracing::debug!(target: "horizon_controls::display", %owner, "dismiss slot acquired");

        if let Some(previous) = previous
            && previous.owner != owner
        {
            tracing::debug!(
                target: "horizon_controls::display",
                previous = %previous.owner,
                %owner,
                "force-closing previous dismiss holder"
            );
            (previous.on_dismiss)();
        }
    }

    /// Release the slot if `owner` holds it. Returns whether it did.
    pub fn release_dismiss(&self, owner: NodeId) -> bool {
        let mut state = self.inner.state.lock();
        if state.dismiss.as_ref().is_some_and(|slot| slot.owner == owner) {
            state.dismiss = None;
            tracing::debug!(target: "horizon_controls::display", %owner, "dismiss slot released");
            true
        } else {
            false
        }
    }

    /// The current holder of the dismiss slot.
    pub fn dismiss_owner(&self) -> Option<NodeId> {
        self.inner.state.lock().dismiss.as_ref().map(|slot| slot.owner)
    }

    /// Number of registered dismiss listeners (0 or 1).
    pub fn dismiss_listener_count(&self) -> usize {
        usize::from(self.inner.state.lock().dismiss.is_some())
    }

    fn offer_to_dismiss_slot(&self, event: &PointerEvent) {
        let dismiss = {
            let mut state = self.inner.state.lock();
            match state.dismiss.as_mut() {
                None => None,
                Some(slot) if !slot.armed => {
                    slot.armed = true;
                    None
                }
                Some(slot) => {
                    let inside = slot.inside.iter().any(|node| event.trail_contains(node));
                    (!inside).then(|| (slot.owner, slot.on_dismiss.clone()))
                }
            }
        };

        if let Some((owner, on_dismiss)) = dismiss {
            tracing::debug!(target: "horizon_controls::display", %owner, "outside click, dismissing");
            on_dismiss();
            if self.release_dismiss(owner) {
                tracing::warn!(
                    target: "horizon_controls::display",
                    %owner,
                    "dismiss holder did not release the slot when closing"
                );
            }
        }
    }

    // =========================================================================
    // Focus
    // =========================================================================

    pub fn focused(&self) -> Option<Node> {
        self.inner.state.lock().focused.clone()
    }

    /// Focus `node`. Fails (returns `false`) if the node is not focusable, not
    /// visible, or not part of this display.
    pub fn focus(&self, node: &Node) -> bool {
        let in_display = node.trail().first() == Some(&self.inner.root);
        if !node.is_focusable() || !node.is_effectively_visible() || !in_display {
            return false;
        }
        self.set_focus(Some(node.clone()));
        true
    }

    /// Clear keyboard focus.
    pub fn blur(&self) {
        self.set_focus(None);
    }

    fn set_focus(&self, node: Option<Node>) {
        let changed = {
            let mut state = self.inner.state.lock();
            if state.focused == node {
                false
            } else {
                state.focused = node.clone();
                true
            }
        };
        if changed {
            tracing::trace!(target: "horizon_controls::display", focused = ?node.as_ref().map(Node::id), "focus changed");
            self.inner.focus_changed.emit(node.as_ref().map(Node::id));
        }
    }

    /// Focus the next focusable, visible node in depth-first order, wrapping
    /// around. Returns the newly focused node.
    pub fn focus_next(&self) -> Option<Node> {
        self.move_focus(true)
    }

    /// Focus the previous focusable, visible node, wrapping around.
    pub fn focus_previous(&self) -> Option<Node> {
        self.move_focus(false)
    }

    fn move_focus(&self, forward: bool) -> Option<Node> {
        let mut order = self.inner.root.descendants();
        if !forward {
            order.reverse();
        }
        let current = self.focused();
        // Position is taken among all nodes so a focused node that was just
        // hidden still anchors the search.
        let start = current
            .as_ref()
            .and_then(|node| order.iter().position(|n| n == node))
            .map_or(0, |index| index + 1);

        let len = order.len();
        let next = (0..len)
            .map(|offset| &order[(start + offset) % len])
            .find(|node| {
                Some(*node) != current.as_ref()
                    && node.is_focusable()
                    && node.is_effectively_visible()
            })
            .cloned();

        if let Some(node) = &next {
            self.set_focus(Some(node.clone()));
        }
        next
    }

    // =========================================================================
    // Keyboard input
    // =========================================================================

    /// Deliver a key press to the focused node and its ancestors.
    pub fn key_down(&self, key: Key, shift: bool) {
        let _span = PerfSpan::new(span_names::KEY_DISPATCH);
        let trail = self.focused().map(|node| node.trail()).unwrap_or_default();
        let event = KeyEvent::new(key, shift, trail);

        'bubble: for node in event.trail().iter().rev() {
            for listener in node.input_listeners() {
                listener.key_down(&event, node);
            }
            if event.is_aborted() {
                break 'bubble;
            }
        }

        if key == Key::Tab && !event.is_aborted() {
            if shift {
                self.focus_previous();
            } else {
                self.focus_next();
            }
        }
    }
}

impl fmt::Debug for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Display")
            .field("root", &self.inner.root.id())
            .field("focused", &state.focused.as_ref().map(Node::id))
            .field("dismiss_owner", &state.dismiss.as_ref().map(|s| s.owner))
            .finish()
    }
}

fn deliver_pointer(event: &PointerEvent, node: &Node) {
    for listener in node.input_listeners() {
        listener.pointer_event(event, node);
    }
}

fn dispatch_pointer(event: &PointerEvent) {
    tracing::trace!(target: "horizon_controls::display", ?event, "dispatching pointer event");
    for node in event.trail().iter().rev() {
        deliver_pointer(event, node);
        if event.is_aborted() {
            break;
        }
    }
}

fn send_exits(pointer: PointerId, pos: Point, old_trail: &[Node], new_trail: &[Node]) {
    for (depth, node) in old_trail.iter().enumerate().rev() {
        if !new_trail.contains(node) {
            let event = PointerEvent::new(
                PointerKind::Exit,
                pointer,
                pos,
                old_trail[..=depth].to_vec(),
            );
            deliver_pointer(&event, node);
        }
    }
}

static_assertions::assert_impl_all!(Display: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::events::FnListener;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn recorder(node: &Node, log: &Arc<Mutex<Vec<String>>>) {
        let log = log.clone();
        let name = node.name();
        node.add_input_listener(Arc::new(FnListener::new().on_pointer(
            move |event, _node| {
                log.lock().push(format!("{}:{:?}", name, event.kind()));
            },
        )));
    }

    fn setup() -> (Display, Node, Node) {
        let display = Display::new(Size::new(200.0, 200.0));
        let a = Node::rectangle("a", Rect::new(0.0, 0.0, 50.0, 50.0));
        let b = Node::rectangle("b", Rect::new(0.0, 0.0, 50.0, 50.0)).with_translation(100.0, 0.0);
        display.root().add_child(&a);
        display.root().add_child(&b);
        (display, a, b)
    }

    #[test]
    fn test_enter_exit_on_move() {
        let (display, a, b) = setup();
        let log = Arc::new(Mutex::new(Vec::new()));
        recorder(&a, &log);
        recorder(&b, &log);

        display.pointer_move(PointerId::MOUSE, Point::new(10.0, 10.0));
        display.pointer_move(PointerId::MOUSE, Point::new(20.0, 10.0));
        display.pointer_move(PointerId::MOUSE, Point::new(110.0, 10.0));

        assert_eq!(
            *log.lock(),
            vec!["a:Enter", "a:Move", "a:Move", "a:Exit", "b:Enter", "b:Move"]
        );
    }

    #[test]
    fn test_capture_routes_up_to_pressed_node() {
        let (display, a, b) = setup();
        let log = Arc::new(Mutex::new(Vec::new()));
        recorder(&a, &log);
        recorder(&b, &log);

        display.pointer_move(PointerId::MOUSE, Point::new(10.0, 10.0));
        display.pointer_down(PointerId::MOUSE, Point::new(10.0, 10.0));
        display.pointer_up(PointerId::MOUSE, Point::new(110.0, 10.0));

        assert_eq!(
            *log.lock(),
            vec!["a:Enter", "a:Move", "a:Down", "a:Exit", "b:Enter", "a:Up"]
        );
    }

    #[test]
    fn test_abort_stops_bubbling() {
        let display = Display::new(Size::new(100.0, 100.0));
        let parent = Node::named("parent");
        let child = Node::rectangle("child", Rect::new(0.0, 0.0, 10.0, 10.0));
        parent.add_child(&child);
        display.root().add_child(&parent);

        let parent_hits = Arc::new(AtomicUsize::new(0));
        let hits = parent_hits.clone();
        parent.add_input_listener(Arc::new(FnListener::new().on_pointer(move |event, _| {
            if event.kind() == PointerKind::Down {
                hits.fetch_add(1, Ordering::SeqCst);
            }
        })));
        child.add_input_listener(Arc::new(FnListener::new().on_pointer(|event, _| {
            if event.kind() == PointerKind::Down {
                event.abort();
            }
        })));

        display.click(Point::new(5.0, 5.0));
        assert_eq!(parent_hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_dismiss_slot_arm_delay() {
        let (display, a, _b) = setup();
        let dismissed = Arc::new(AtomicUsize::new(0));
        let owner = a.id();

        let counter = dismissed.clone();
        let display_clone = display.clone();
        display.acquire_dismiss(owner, vec![a.clone()], move || {
            counter.fetch_add(1, Ordering::SeqCst);
            display_clone.release_dismiss(owner);
        });

        // The first click only arms the slot.
        display.click(Point::new(150.0, 150.0));
        assert_eq!(dismissed.load(Ordering::SeqCst), 0);

        // Clicks inside never dismiss.
        display.click(Point::new(10.0, 10.0));
        assert_eq!(dismissed.load(Ordering::SeqCst), 0);

        display.click(Point::new(150.0, 150.0));
        assert_eq!(dismissed.load(Ordering::SeqCst), 1);
        assert_eq!(display.dismiss_listener_count(), 0);
    }

    #[test]
    fn test_acquire_force_closes_previous_holder() {
        let (display, a, b) = setup();
        let closed = Arc::new(AtomicUsize::new(0));

        let counter = closed.clone();
        display.acquire_dismiss(a.id(), vec![a.clone()], move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        display.acquire_dismiss(b.id(), vec![b.clone()], || {});

        assert_eq!(closed.load(Ordering::SeqCst), 1);
        assert_eq!(display.dismiss_owner(), Some(b.id()));
        assert_eq!(display.dismiss_listener_count(), 1);

        // Releasing with the wrong owner is a no-op.
        assert!(!display.release_dismiss(a.id()));
        assert!(display.release_dismiss(b.id()));
    }

    #[test]
    fn test_unreleased_slot_is_cleared_after_dismiss() {
        let (display, a, _b) = setup();
        display.acquire_dismiss(a.id(), vec![a.clone()], || {});
        display.click(Point::new(150.0, 150.0));
        display.click(Point::new(150.0, 150.0));
        assert_eq!(display.dismiss_listener_count(), 0);
    }

    #[test]
    fn test_tab_cycles_focus() {
        let (display, a, b) = setup();
        let hidden = Node::rectangle("hidden", Rect::new(0.0, 0.0, 5.0, 5.0)).with_focusable(true);
        hidden.set_visible(false);
        a.set_focusable(true);
        b.set_focusable(true);
        display.root().insert_child(1, &hidden);

        display.key_down(Key::Tab, false);
        assert_eq!(display.focused(), Some(a.clone()));
        display.key_down(Key::Tab, false);
        assert_eq!(display.focused(), Some(b.clone()));
        display.key_down(Key::Tab, false);
        assert_eq!(display.focused(), Some(a.clone()));
        display.key_down(Key::Tab, true);
        assert_eq!(display.focused(), Some(b));
    }

    #[test]
    fn test_focus_requires_focusable_visible_node() {
        let (display, a, _b) = setup();
        assert!(!display.focus(&a));
        a.set_focusable(true);
        assert!(display.focus(&a));

        let orphan = Node::named("orphan").with_focusable(true);
        assert!(!display.focus(&orphan));
    }
}
