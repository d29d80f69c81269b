//! Retained scene graph nodes.
//!
//! A [`Node`] is a cheap, clonable handle to a shared tree element. Parents own
//! their children; children keep a weak back-reference to their parent. Each
//! node carries a transform into its parent's coordinate frame, a local shape
//! rectangle, declarative style records, and a list of input listeners.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use horizon_controls_render::{Paint, Point, Rect, Stroke, Transform2D};
use parking_lot::RwLock;

use super::events::InputListener;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// A unique node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifies an input listener attached to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct NodeState {
    name: String,
    transform: Transform2D,
    self_bounds: Rect,
    touch_area: Option<Rect>,
    fill: Option<Paint>,
    stroke: Option<Stroke>,
    opacity: f32,
    visible: bool,
    pickable: bool,
    focusable: bool,
    children: Vec<Node>,
    parent: Weak<NodeInner>,
    listeners: Vec<(ListenerId, Arc<dyn InputListener>)>,
}

struct NodeInner {
    id: NodeId,
    state: RwLock<NodeState>,
}

/// A handle to a scene graph node.
#[derive(Clone)]
pub struct Node {
    inner: Arc<NodeInner>,
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

impl Node {
    /// Create an empty, visible, pickable node.
    pub fn new() -> Self {
        Self::named("")
    }

    /// Create an empty node with a debug name.
    pub fn named(name: impl Into<String>) -> Self {
        let id = NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed));
        Self {
            inner: Arc::new(NodeInner {
                id,
                state: RwLock::new(NodeState {
                    name: name.into(),
                    transform: Transform2D::IDENTITY,
                    self_bounds: Rect::ZERO,
                    touch_area: None,
                    fill: None,
                    stroke: None,
                    opacity: 1.0,
                    visible: true,
                    pickable: true,
                    focusable: false,
                    children: Vec::new(),
                    parent: Weak::new(),
                    listeners: Vec::new(),
                }),
            }),
        }
    }

    /// Create a node whose shape is `rect`.
    pub fn rectangle(name: impl Into<String>, rect: Rect) -> Self {
        let node = Self::named(name);
        node.set_self_bounds(rect);
        node
    }

    pub fn id(&self) -> NodeId {
        self.inner.id
    }

    pub fn name(&self) -> String {
        self.inner.state.read().name.clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.inner.state.write().name = name.into();
    }

    // =========================================================================
    // Builders
    // =========================================================================

    pub fn with_fill(self, fill: impl Into<Paint>) -> Self {
        self.set_fill(Some(fill.into()));
        self
    }

    pub fn with_stroke(self, stroke: Stroke) -> Self {
        self.set_stroke(Some(stroke));
        self
    }

    pub fn with_translation(self, x: f32, y: f32) -> Self {
        self.set_translation(x, y);
        self
    }

    pub fn with_focusable(self, focusable: bool) -> Self {
        self.set_focusable(focusable);
        self
    }

    pub fn with_child(self, child: &Node) -> Self {
        self.add_child(child);
        self
    }

    // =========================================================================
    // Tree
    // =========================================================================

    /// Append `child` as the top-most child, detaching it from any previous
    /// parent. Adding a node to itself or to one of its descendants is ignored.
    pub fn add_child(&self, child: &Node) {
        let index = self.child_count();
        self.insert_child(index, child);
    }

    /// Insert `child` at `index` (clamped to the child count).
    pub fn insert_child(&self, index: usize, child: &Node) {
        if child == self || child.is_ancestor_of(self) {
            tracing::warn!(
                target: "horizon_controls::scene",
                parent = %self.id(),
                child = %child.id(),
                "refusing to create a cycle in the scene graph"
            );
            return;
        }
        child.detach();
        child.inner.state.write().parent = Arc::downgrade(&self.inner);
        let mut state = self.inner.state.write();
        let index = index.min(state.children.len());
        state.children.insert(index, child.clone());
    }

    /// Remove `child`. Returns `false` if it was not a child of this node.
    pub fn remove_child(&self, child: &Node) -> bool {
        let removed = {
            let mut state = self.inner.state.write();
            let before = state.children.len();
            state.children.retain(|c| c != child);
            before != state.children.len()
        };
        if removed {
            child.inner.state.write().parent = Weak::new();
        }
        removed
    }

    /// Remove this node from its parent, if any.
    pub fn detach(&self) {
        if let Some(parent) = self.parent() {
            parent.remove_child(self);
        }
    }

    /// Move this node above its siblings.
    pub fn move_to_front(&self) {
        if let Some(parent) = self.parent() {
            parent.add_child(self);
        }
    }

    pub fn children(&self) -> Vec<Node> {
        self.inner.state.read().children.clone()
    }

    pub fn child_count(&self) -> usize {
        self.inner.state.read().children.len()
    }

    pub fn parent(&self) -> Option<Node> {
        self.inner
            .state
            .read()
            .parent
            .upgrade()
            .map(|inner| Node { inner })
    }

    /// Whether this node is a strict ancestor of `other`.
    pub fn is_ancestor_of(&self, other: &Node) -> bool {
        let mut current = other.parent();
        while let Some(node) = current {
            if node == *self {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// The nodes from the root of this node's tree down to this node.
    pub fn trail(&self) -> Vec<Node> {
        let mut trail = vec![self.clone()];
        let mut current = self.parent();
        while let Some(node) = current {
            current = node.parent();
            trail.push(node);
        }
        trail.reverse();
        trail
    }

    /// Depth-first, pre-order list of this node and its descendants.
    pub fn descendants(&self) -> Vec<Node> {
        let mut out = Vec::new();
        self.collect_descendants(&mut out);
        out
    }

    fn collect_descendants(&self, out: &mut Vec<Node>) {
        out.push(self.clone());
        for child in self.children() {
            child.collect_descendants(out);
        }
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    /// The node's own shape in local coordinates.
    pub fn self_bounds(&self) -> Rect {
        self.inner.state.read().self_bounds
    }

    pub fn set_self_bounds(&self, rect: Rect) {
        self.inner.state.write().self_bounds = rect;
    }

    pub fn transform(&self) -> Transform2D {
        self.inner.state.read().transform
    }

    pub fn set_transform(&self, transform: Transform2D) {
        self.inner.state.write().transform = transform;
    }

    /// Replace the translation, keeping any scale or rotation.
    pub fn set_translation(&self, x: f32, y: f32) {
        let mut state = self.inner.state.write();
        state.transform = state.transform.with_translation(x, y);
    }

    pub fn translation(&self) -> Point {
        self.transform().translation_part()
    }

    /// Self bounds united with the bounds of visible children, in local
    /// coordinates. `None` for a node with no extent.
    fn local_extent(&self) -> Option<Rect> {
        let (self_bounds, children) = {
            let state = self.inner.state.read();
            (state.self_bounds, state.children.clone())
        };
        let mut extent = (!self_bounds.is_empty()).then_some(self_bounds);
        for child in children {
            if !child.is_visible() {
                continue;
            }
            if let Some(child_extent) = child.parent_extent() {
                extent = Some(match extent {
                    Some(e) => e.union(&child_extent),
                    None => child_extent,
                });
            }
        }
        extent
    }

    fn parent_extent(&self) -> Option<Rect> {
        let transform = self.transform();
        self.local_extent().map(|r| transform.transform_rect(&r))
    }

    /// Bounds in local coordinates (self bounds plus visible children).
    pub fn local_bounds(&self) -> Rect {
        self.local_extent().unwrap_or(Rect::ZERO)
    }

    /// Bounds in the parent's coordinates.
    pub fn bounds(&self) -> Rect {
        self.parent_extent().unwrap_or(Rect::ZERO)
    }

    pub fn width(&self) -> f32 {
        self.bounds().width()
    }

    pub fn height(&self) -> f32 {
        self.bounds().height()
    }

    /// Transform from local coordinates to the root's parent frame.
    pub fn global_transform(&self) -> Transform2D {
        let mut transform = self.transform();
        let mut current = self.parent();
        while let Some(node) = current {
            transform = node.transform().then(&transform);
            current = node.parent();
        }
        transform
    }

    /// Bounds in global (display) coordinates.
    pub fn global_bounds(&self) -> Rect {
        self.global_transform().transform_rect(&self.local_bounds())
    }

    pub fn local_to_global_point(&self, point: Point) -> Point {
        self.global_transform().transform_point(point)
    }

    /// Map a global point into local coordinates. A singular transform leaves
    /// the point unchanged.
    pub fn global_to_local_point(&self, point: Point) -> Point {
        self.global_transform()
            .inverse()
            .map_or(point, |inverse| inverse.transform_point(point))
    }

    /// Map a global rectangle into local coordinates (axis-aligned bounds).
    pub fn global_to_local_rect(&self, rect: &Rect) -> Rect {
        self.global_transform()
            .inverse()
            .map_or(*rect, |inverse| inverse.transform_rect(rect))
    }

    // =========================================================================
    // Style
    // =========================================================================

    pub fn fill(&self) -> Option<Paint> {
        self.inner.state.read().fill.clone()
    }

    pub fn set_fill(&self, fill: Option<Paint>) {
        self.inner.state.write().fill = fill;
    }

    pub fn stroke(&self) -> Option<Stroke> {
        self.inner.state.read().stroke.clone()
    }

    pub fn set_stroke(&self, stroke: Option<Stroke>) {
        self.inner.state.write().stroke = stroke;
    }

    pub fn opacity(&self) -> f32 {
        self.inner.state.read().opacity
    }

    /// Set the opacity, clamped to 0.0-1.0.
    pub fn set_opacity(&self, opacity: f32) {
        self.inner.state.write().opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn is_visible(&self) -> bool {
        self.inner.state.read().visible
    }

    pub fn set_visible(&self, visible: bool) {
        self.inner.state.write().visible = visible;
    }

    /// Visible, and every ancestor visible.
    pub fn is_effectively_visible(&self) -> bool {
        self.trail().iter().all(Node::is_visible)
    }

    pub fn is_pickable(&self) -> bool {
        self.inner.state.read().pickable
    }

    /// A non-pickable node and its whole subtree are ignored by hit testing.
    pub fn set_pickable(&self, pickable: bool) {
        self.inner.state.write().pickable = pickable;
    }

    pub fn is_focusable(&self) -> bool {
        self.inner.state.read().focusable
    }

    pub fn set_focusable(&self, focusable: bool) {
        self.inner.state.write().focusable = focusable;
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Extra local-coordinate area that counts as a hit on this node.
    pub fn touch_area(&self) -> Option<Rect> {
        self.inner.state.read().touch_area
    }

    pub fn set_touch_area(&self, area: Option<Rect>) {
        self.inner.state.write().touch_area = area;
    }

    pub fn add_input_listener(&self, listener: Arc<dyn InputListener>) -> ListenerId {
        let id = ListenerId(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed));
        self.inner.state.write().listeners.push((id, listener));
        id
    }

    /// Remove a listener. Returns `false` if it was not attached.
    pub fn remove_input_listener(&self, id: ListenerId) -> bool {
        let mut state = self.inner.state.write();
        let before = state.listeners.len();
        state.listeners.retain(|(lid, _)| *lid != id);
        before != state.listeners.len()
    }

    pub fn clear_input_listeners(&self) {
        self.inner.state.write().listeners.clear();
    }

    pub fn input_listener_count(&self) -> usize {
        self.inner.state.read().listeners.len()
    }

    /// Snapshot of the attached listeners, in attachment order.
    pub fn input_listeners(&self) -> Vec<Arc<dyn InputListener>> {
        self.inner
            .state
            .read()
            .listeners
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect()
    }

    /// The deepest visible, pickable node under a global point. Later
    /// children are hit before earlier ones.
    pub fn hit_test(&self, global: Point) -> Option<Node> {
        self.hit_test_local(self.global_to_local_point(global))
    }

    fn hit_test_local(&self, point: Point) -> Option<Node> {
        let (visible, pickable, self_bounds, touch_area, children) = {
            let state = self.inner.state.read();
            (
                state.visible,
                state.pickable,
                state.self_bounds,
                state.touch_area,
                state.children.clone(),
            )
        };
        if !visible || !pickable {
            return None;
        }
        for child in children.iter().rev() {
            let Some(inverse) = child.transform().inverse() else {
                continue;
            };
            if let Some(hit) = child.hit_test_local(inverse.transform_point(point)) {
                return Some(hit);
            }
        }
        let touched = touch_area.is_some_and(|area| area.contains(point));
        (self_bounds.contains(point) || touched).then(|| self.clone())
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.read();
        f.debug_struct("Node")
            .field("id", &self.inner.id)
            .field("name", &state.name)
            .field("children", &state.children.len())
            .field("visible", &state.visible)
            .finish()
    }
}

static_assertions::assert_impl_all!(Node: Send, Sync);
