#![forbid(unsafe_code)]

//! Per-component publish/subscribe.
//!
//! # Invariants
//!
//! 1. **Set semantics**: subscribing the same [`Listener`] (same `Rc`
//!    allocation) twice for one event registers it once.
//! 2. **Exact removal**: [`Subscription::unsubscribe`] removes exactly the
//!    listener it was returned for, and is idempotent.
//! 3. **Snapshot dispatch**: `emit` captures the listener list before calling
//!    anything. Listeners added during a dispatch first run on the next emit;
//!    listeners removed during a dispatch still run in the current one.
//! 4. **No swallowing**: a panicking listener unwinds through `emit` to the
//!    code that triggered it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use ahash::AHashMap;

use crate::value::{EventName, Value};

/// Shared listener callback. Identity is the `Rc` allocation.
pub type Listener = Rc<dyn Fn(&Value)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SubscriptionId(u64);

#[derive(Default)]
struct Registry {
    listeners: AHashMap<EventName, Vec<(SubscriptionId, Listener)>>,
    next_id: u64,
}

fn same_listener(a: &Listener, b: &Listener) -> bool {
    std::ptr::eq(Rc::as_ptr(a).cast::<()>(), Rc::as_ptr(b).cast::<()>())
}

/// Named-event registry owned by one component.
#[derive(Clone, Default)]
pub struct Emitter {
    registry: Rc<RefCell<Registry>>,
}

impl std::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.registry.borrow();
        let counts: Vec<(EventName, usize)> = registry
            .listeners
            .iter()
            .map(|(name, list)| (*name, list.len()))
            .collect();
        f.debug_struct("Emitter").field("listeners", &counts).finish()
    }
}

impl Emitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `name`.
    ///
    /// If the same listener is already registered for `name`, the existing
    /// registration is returned instead of adding a duplicate.
    pub fn subscribe(&self, name: EventName, listener: Listener) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        let existing = registry.listeners.get(&name).and_then(|list| {
            list.iter()
                .find(|(_, l)| same_listener(l, &listener))
                .map(|(id, _)| *id)
        });
        let id = match existing {
            Some(id) => id,
            None => {
                let id = SubscriptionId(registry.next_id);
                registry.next_id += 1;
                registry
                    .listeners
                    .entry(name)
                    .or_default()
                    .push((id, listener));
                id
            }
        };
        Subscription {
            registry: Rc::downgrade(&self.registry),
            name,
            id,
        }
    }

    /// Register a closure. Every call creates a distinct listener.
    pub fn on(&self, name: EventName, listener: impl Fn(&Value) + 'static) -> Subscription {
        self.subscribe(name, Rc::new(listener))
    }

    /// Invoke every listener registered for `name`, in registration order.
    pub fn emit(&self, name: EventName, value: &Value) {
        let snapshot: Vec<Listener> = self
            .registry
            .borrow()
            .listeners
            .get(&name)
            .map(|list| list.iter().map(|(_, l)| Rc::clone(l)).collect())
            .unwrap_or_default();
        for listener in snapshot {
            listener(value);
        }
    }

    #[must_use]
    pub fn listener_count(&self, name: EventName) -> usize {
        self.registry
            .borrow()
            .listeners
            .get(&name)
            .map_or(0, Vec::len)
    }

    /// Remove every listener for every event.
    pub fn clear(&self) {
        self.registry.borrow_mut().listeners.clear();
    }
}

/// Handle returned by [`Emitter::on`] / [`Emitter::subscribe`].
///
/// Dropping the handle does not unsubscribe.
#[derive(Clone)]
pub struct Subscription {
    registry: Weak<RefCell<Registry>>,
    name: EventName,
    id: SubscriptionId,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("name", &self.name)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Subscription {
    #[must_use]
    pub fn event(&self) -> EventName {
        self.name
    }

    /// Remove the listener. Safe to call more than once, and from inside a
    /// dispatch.
    pub fn unsubscribe(&self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = registry.borrow_mut();
        if let Some(list) = registry.listeners.get_mut(&self.name) {
            list.retain(|(id, _)| *id != self.id);
            if list.is_empty() {
                registry.listeners.remove(&self.name);
            }
        }
    }

    /// Whether the listener is still registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.registry.upgrade().is_some_and(|registry| {
            registry
                .borrow()
                .listeners
                .get(&self.name)
                .is_some_and(|list| list.iter().any(|(id, _)| *id == self.id))
        })
    }
}
