//! Signal/slot system for Horizon Controls.
//!
//! Signals notify connected slots synchronously, in the order the slots were
//! connected. Emission works on a snapshot of the connection table and never
//! holds a lock while a slot runs, so slots are free to connect, disconnect or
//! emit again (re-entrancy is allowed and not guarded against).
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The signal type for emitting notifications
//! - [`ConnectionId`] - Identifier returned by [`Signal::connect`]
//! - [`Subscription`] - RAII handle returned by [`Signal::subscribe`]
//!
//! # Example
//!
//! ```
//! use horizon_controls_core::Signal;
//!
//! let fired = Signal::<u32>::new();
//! let subscription = fired.subscribe(|count| println!("fired {count} times"));
//!
//! fired.emit(1);
//! subscription.unsubscribe();
//! fired.emit(2); // nobody listening
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// The ID stays valid until the connection is removed through
    /// [`Signal::disconnect`], a [`Subscription`], or the signal is dropped.
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

struct Connection<Args> {
    /// Connection order, used to keep notification ordered across slot reuse.
    sequence: u64,
    slot: Slot<Args>,
}

/// The connection table shared between a signal and its subscriptions.
struct SlotTable<Args> {
    connections: Mutex<SlotMap<ConnectionId, Connection<Args>>>,
    next_sequence: AtomicU64,
}

impl<Args> SlotTable<Args> {
    fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            next_sequence: AtomicU64::new(0),
        }
    }
}

/// Type-erased removal of a connection, so [`Subscription`] needs no type
/// parameter.
trait Detach: Send + Sync {
    fn detach(&self, id: ConnectionId) -> bool;
}

impl<Args: 'static> Detach for SlotTable<Args> {
    fn detach(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }
}

/// A type-safe signal that can have multiple connected slots.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots by reference. Use `()`
///   for signals with no arguments, or a tuple for several.
///
/// # Thread Safety
///
/// `Signal<Args>` is `Send + Sync`. Slots run on the emitting thread.
pub struct Signal<Args> {
    table: Arc<SlotTable<Args>>,
    /// Whether signal emission is temporarily blocked.
    blocked: AtomicBool,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            table: Arc::new(SlotTable::new()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// The connection lives until [`disconnect`](Self::disconnect) is called
    /// with the returned ID, or the signal is dropped.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let sequence = self.table.next_sequence.fetch_add(1, Ordering::Relaxed);
        self.table.connections.lock().insert(Connection {
            sequence,
            slot: Arc::new(slot),
        })
    }

    /// Connect a slot and return a [`Subscription`] that disconnects it when
    /// dropped or explicitly unsubscribed.
    pub fn subscribe<F>(&self, slot: F) -> Subscription
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connect(slot);
        let table: Arc<dyn Detach> = self.table.clone();
        Subscription {
            table: Arc::downgrade(&table),
            id: Some(id),
        }
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.table.connections.lock().remove(id).is_some()
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        self.table.connections.lock().clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.table.connections.lock().len()
    }

    /// Check whether a connection is still live.
    pub fn is_connected(&self, id: ConnectionId) -> bool {
        self.table.connections.lock().contains_key(id)
    }

    /// Block signal emission temporarily.
    ///
    /// While blocked, calls to `emit()` do nothing.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if signal emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking all connected slots in connection order.
    ///
    /// A slot disconnected by an earlier slot during the same emission is
    /// skipped. Slots connected during emission are first called on the next
    /// emission. Panics raised by a slot propagate to the caller.
    #[tracing::instrument(skip_all, target = "horizon_controls_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: "horizon_controls_core::signal", "signal blocked, skipping emit");
            return;
        }

        let mut snapshot: Vec<(u64, ConnectionId, Slot<Args>)> = {
            let connections = self.table.connections.lock();
            connections
                .iter()
                .map(|(id, conn)| (conn.sequence, id, conn.slot.clone()))
                .collect()
        };
        snapshot.sort_unstable_by_key(|(sequence, _, _)| *sequence);
        tracing::trace!(target: "horizon_controls_core::signal", connection_count = snapshot.len(), "emitting signal");

        for (_, id, slot) in snapshot {
            if !self.table.connections.lock().contains_key(id) {
                continue;
            }
            slot(&args);
        }
    }
}

impl<Args> fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.table.connections.lock().len())
            .field("blocked", &self.blocked.load(Ordering::SeqCst))
            .finish()
    }
}

/// RAII handle for a connection made with [`Signal::subscribe`].
///
/// Dropping the handle disconnects the slot. The handle only keeps a weak
/// reference to the signal, so it may safely outlive it.
#[must_use = "dropping a Subscription disconnects the slot immediately"]
pub struct Subscription {
    table: Weak<dyn Detach>,
    id: Option<ConnectionId>,
}

impl Subscription {
    /// Disconnect the slot now.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    /// Whether the slot is still connected to a live signal.
    pub fn is_active(&self) -> bool {
        self.id.is_some() && self.table.strong_count() > 0
    }

    /// The underlying connection ID, if the subscription has not been released.
    pub fn connection_id(&self) -> Option<ConnectionId> {
        self.id
    }

    /// Give up the handle and keep the slot connected for the lifetime of the
    /// signal.
    pub fn forget(mut self) {
        self.id = None;
    }

    fn release(&mut self) {
        if let Some(id) = self.id.take()
            && let Some(table) = self.table.upgrade()
        {
            table.detach(id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

static_assertions::assert_impl_all!(Signal<()>: Send, Sync);
static_assertions::assert_impl_all!(Subscription: Send, Sync);
