//! # Event Emitter
//!
//! Listener registry used by players to publish snapshots and notifications.
//!
//! ## Overview
//!
//! The emitter keeps, per event kind, an ordered list of callback listeners
//! with standard add/remove semantics. Every emission is also published on a
//! `tokio::sync::broadcast` channel so async consumers can await events
//! instead of registering callbacks.
//!
//! ```text
//!                   ┌──────────────┐   callback   ┌────────────┐
//!      emit(event)  │              ├─────────────>│ Listener A │
//!   ───────────────>│ EventEmitter │              └────────────┘
//!                   │  (per-kind   │   callback   ┌────────────┐
//!                   │   registry)  ├─────────────>│ Listener B │
//!                   │              │              └────────────┘
//!                   │              │   broadcast  ┌────────────┐
//!                   │              ├─────────────>│  Receiver  │
//!                   └──────────────┘              └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{Event, EventEmitter};
//!
//! #[derive(Debug, Clone)]
//! struct Tick(u32);
//!
//! impl Event for Tick {
//!     type Kind = ();
//!     fn kind(&self) -> Self::Kind {}
//! }
//!
//! let emitter = EventEmitter::<Tick>::new(16);
//! let id = emitter.add_listener((), |tick: &Tick| println!("tick {}", tick.0));
//! assert_eq!(emitter.emit(Tick(1)), 1);
//! assert!(emitter.remove_listener((), id));
//! ```
//!
//! ## Re-entrancy
//!
//! `emit` copies the listener list before invoking callbacks and holds no
//! lock while they run, so a listener may add or remove listeners (or emit)
//! from inside its callback. Changes take effect from the next emission.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::RecvError;
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the broadcast side of an emitter.
///
/// Receivers that can't keep up will receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// An event that can be routed by kind.
pub trait Event: Clone + Send + Sync + 'static {
    /// Identifier listeners subscribe to.
    type Kind: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static;

    fn kind(&self) -> Self::Kind;
}

/// Callback listener for events of type `E`.
pub type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Handle identifying a registered listener, used to remove it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Per-kind, insertion-ordered listener registry with a broadcast tap.
pub struct EventEmitter<E: Event> {
    listeners: Mutex<HashMap<E::Kind, Vec<(ListenerId, Listener<E>)>>>,
    next_id: AtomicU64,
    sender: broadcast::Sender<E>,
}

impl<E: Event> EventEmitter<E> {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            listeners: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            sender,
        }
    }

    /// Register `listener` for `kind`. Listeners fire in registration order.
    pub fn add_listener<F>(&self, kind: E::Kind, listener: F) -> ListenerId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.add_shared_listener(kind, Arc::new(listener))
    }

    /// Register an already shared listener for `kind`.
    pub fn add_shared_listener(&self, kind: E::Kind, listener: Listener<E>) -> ListenerId {
        let id = self.reserve_id();
        self.listeners
            .lock()
            .entry(kind)
            .or_default()
            .push((id, listener));
        id
    }

    /// Allocate an id without registering anything under it.
    pub fn reserve_id(&self) -> ListenerId {
        ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Remove a listener. Returns `false` if it was not registered for `kind`.
    pub fn remove_listener(&self, kind: E::Kind, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        let Some(entries) = listeners.get_mut(&kind) else {
            return false;
        };

        let before = entries.len();
        entries.retain(|(existing, _)| *existing != id);
        let removed = entries.len() != before;

        if entries.is_empty() {
            listeners.remove(&kind);
        }
        removed
    }

    pub fn remove_all_listeners(&self) {
        self.listeners.lock().clear();
    }

    /// Look up a registered listener.
    pub fn listener(&self, kind: E::Kind, id: ListenerId) -> Option<Listener<E>> {
        self.listeners.lock().get(&kind).and_then(|entries| {
            entries
                .iter()
                .find(|(existing, _)| *existing == id)
                .map(|(_, listener)| Arc::clone(listener))
        })
    }

    pub fn listener_count(&self, kind: E::Kind) -> usize {
        self.listeners
            .lock()
            .get(&kind)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Deliver `event` to every listener of its kind, then to broadcast
    /// receivers. Returns the number of callback listeners invoked.
    pub fn emit(&self, event: E) -> usize {
        let kind = event.kind();
        let targets: Vec<Listener<E>> = self
            .listeners
            .lock()
            .get(&kind)
            .map(|entries| entries.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default();

        for listener in &targets {
            listener(&event);
        }

        // No receivers is not an error for an emitter.
        let _ = self.sender.send(event);
        targets.len()
    }

    /// Subscribe to every future emission, regardless of kind.
    pub fn subscribe(&self) -> Receiver<E> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<E: Event> Default for EventEmitter<E> {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl<E: Event> fmt::Debug for EventEmitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.lock();
        let counts: HashMap<_, _> = listeners.iter().map(|(k, v)| (*k, v.len())).collect();
        f.debug_struct("EventEmitter")
            .field("listeners", &counts)
            .field("receiver_count", &self.sender.receiver_count())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
