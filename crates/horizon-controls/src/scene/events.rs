//! Input events delivered to scene nodes.
//!
//! Events are produced by a [`Display`](super::Display) and delivered to the
//! [`InputListener`]s attached to nodes. Pointer Down/Up/Move and key events
//! bubble from the target node toward the root; a listener stops the bubbling
//! by calling `abort()`. Enter and Exit are delivered only to the node being
//! entered or exited.

use std::cell::Cell;
use std::fmt;

use horizon_controls_render::Point;

use super::node::Node;

/// Identifies a pointer (mouse or a single touch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PointerId(pub u32);

impl PointerId {
    /// The mouse pointer.
    pub const MOUSE: Self = Self(0);
}

/// The kind of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// The pointer started hovering the node (or one of its descendants).
    Enter,
    /// The pointer stopped hovering the node and all of its descendants.
    Exit,
    /// A press.
    Down,
    /// A release.
    Up,
    /// A move.
    Move,
}

/// A pointer event.
pub struct PointerEvent {
    kind: PointerKind,
    pointer: PointerId,
    global_pos: Point,
    trail: Vec<Node>,
    aborted: Cell<bool>,
}

impl PointerEvent {
    pub(crate) fn new(kind: PointerKind, pointer: PointerId, global_pos: Point, trail: Vec<Node>) -> Self {
        Self {
            kind,
            pointer,
            global_pos,
            trail,
            aborted: Cell::new(false),
        }
    }

    pub fn kind(&self) -> PointerKind {
        self.kind
    }

    pub fn pointer(&self) -> PointerId {
        self.pointer
    }

    /// Pointer position in display coordinates.
    pub fn global_pos(&self) -> Point {
        self.global_pos
    }

    /// Pointer position in `node`'s local coordinates.
    pub fn local_pos(&self, node: &Node) -> Point {
        node.global_to_local_point(self.global_pos)
    }

    /// The nodes from the root down to the target.
    pub fn trail(&self) -> &[Node] {
        &self.trail
    }

    /// The deepest node the event was aimed at.
    pub fn target(&self) -> Option<&Node> {
        self.trail.last()
    }

    /// Whether `node` lies on the event's trail.
    pub fn trail_contains(&self, node: &Node) -> bool {
        self.trail.iter().any(|n| n == node)
    }

    /// Stop delivering this event to ancestors.
    pub fn abort(&self) {
        self.aborted.set(true);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.get()
    }
}

impl fmt::Debug for PointerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerEvent")
            .field("kind", &self.kind)
            .field("pointer", &self.pointer)
            .field("global_pos", &self.global_pos)
            .field("target", &self.target().map(Node::id))
            .field("aborted", &self.aborted.get())
            .finish()
    }
}

/// Keys the widgets react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Enter,
    Space,
    Escape,
    Tab,
    Home,
    End,
    PageUp,
    PageDown,
    Character(char),
}

impl Key {
    /// Enter or Space.
    pub fn is_activation(self) -> bool {
        matches!(self, Key::Enter | Key::Space)
    }
}

/// A key press delivered to the focused node and its ancestors.
pub struct KeyEvent {
    key: Key,
    shift: bool,
    trail: Vec<Node>,
    aborted: Cell<bool>,
}

impl KeyEvent {
    pub(crate) fn new(key: Key, shift: bool, trail: Vec<Node>) -> Self {
        Self {
            key,
            shift,
            trail,
            aborted: Cell::new(false),
        }
    }

    pub fn key(&self) -> Key {
        self.key
    }

    /// Whether Shift was held.
    pub fn shift(&self) -> bool {
        self.shift
    }

    /// The focused node the event was aimed at.
    pub fn target(&self) -> Option<&Node> {
        self.trail.last()
    }

    pub fn trail(&self) -> &[Node] {
        &self.trail
    }

    /// Stop delivering this event to ancestors. An aborted Tab does not move
    /// focus.
    pub fn abort(&self) {
        self.aborted.set(true);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.get()
    }
}

impl fmt::Debug for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyEvent")
            .field("key", &self.key)
            .field("shift", &self.shift)
            .field("target", &self.target().map(Node::id))
            .field("aborted", &self.aborted.get())
            .finish()
    }
}

/// Receives input for a node.
///
/// `node` is the node the listener is attached to, which may be an ancestor
/// of the event's target.
pub trait InputListener: Send + Sync {
    fn pointer_event(&self, _event: &PointerEvent, _node: &Node) {}

    fn key_down(&self, _event: &KeyEvent, _node: &Node) {}
}

/// An [`InputListener`] built from closures.
#[derive(Default)]
pub struct FnListener {
    on_pointer: Option<Box<dyn Fn(&PointerEvent, &Node) + Send + Sync>>,
    on_key: Option<Box<dyn Fn(&KeyEvent, &Node) + Send + Sync>>,
}

impl FnListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_pointer<F>(mut self, f: F) -> Self
    where
        F: Fn(&PointerEvent, &Node) + Send + Sync + 'static,
    {
        self.on_pointer = Some(Box::new(f));
        self
    }

    pub fn on_key<F>(mut self, f: F) -> Self
    where
        F: Fn(&KeyEvent, &Node) + Send + Sync + 'static,
    {
        self.on_key = Some(Box::new(f));
        self
    }
}

impl InputListener for FnListener {
    fn pointer_event(&self, event: &PointerEvent, node: &Node) {
        if let Some(f) = &self.on_pointer {
            f(event, node);
        }
    }

    fn key_down(&self, event: &KeyEvent, node: &Node) {
        if let Some(f) = &self.on_key {
            f(event, node);
        }
    }
}

impl fmt::Debug for FnListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnListener")
            .field("on_pointer", &self.on_pointer.is_some())
            .field("on_key", &self.on_key.is_some())
            .finish()
    }
}
