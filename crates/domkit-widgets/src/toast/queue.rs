#![forbid(unsafe_code)]

//! Bounded FIFO of live toasts.
//!
//! The queue is an explicit service object rather than global state: create
//! one per document, share it by cloning, and call [`ToastQueue::reset`]
//! between tests.
//!
//! # Invariants
//!
//! 1. `len() <= max_visible` after every public call returns.
//! 2. Eviction is strict arrival order: when full, the oldest entry leaves
//!    the queue and is dismissed before the new toast is mounted.
//! 3. A toast leaves the queue when it is dismissed, however that happens
//!    (timeout, close button, eviction, `dismiss_all`).

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use domkit_core::{Dom, NodeId};

use super::{Toast, ToastId, ToastOptions, ToastVariant};
use crate::component::Component;
use crate::config::ToastPolicy;
use crate::emitter::Subscription;
use crate::value::EventName;

/// Queue statistics for monitoring and debugging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Toasts shown through the queue.
    pub total_shown: u64,
    /// Toasts dismissed to make room for a newer one.
    pub evicted: u64,
    /// Toasts that left the queue for any reason.
    pub dismissed: u64,
}

struct Entry {
    toast: Toast,
    subscription: Subscription,
}

struct QueueInner {
    dom: Dom,
    policy: ToastPolicy,
    container: Cell<Option<NodeId>>,
    entries: RefCell<VecDeque<Entry>>,
    stats: Cell<QueueStats>,
}

impl QueueInner {
    fn bump(&self, f: impl FnOnce(&mut QueueStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }

    fn remove(&self, id: ToastId) -> Option<Entry> {
        let mut entries = self.entries.borrow_mut();
        let index = entries.iter().position(|e| e.toast.id() == id)?;
        entries.remove(index)
    }

    /// The shared container, created and attached on first use.
    fn container(&self) -> NodeId {
        let node = match self.container.get() {
            Some(node) => node,
            None => {
                let node = self.dom.create_element("div");
                self.dom.add_class(node, "toast-container");
                self.dom.set_attribute(node, "aria-live", "polite");
                self.container.set(Some(node));
                node
            }
        };
        if !self.dom.is_connected(node) {
            self.dom.append_child(self.dom.body(), node);
        }
        node
    }
}

/// Bounded notification queue. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct ToastQueue {
    inner: Rc<QueueInner>,
}

impl std::fmt::Debug for ToastQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToastQueue")
            .field("len", &self.len())
            .field("max_visible", &self.inner.policy.max_visible)
            .field("container", &self.inner.container.get())
            .finish()
    }
}

impl ToastQueue {
    pub fn new(dom: &Dom, policy: ToastPolicy) -> Self {
        Self {
            inner: Rc::new(QueueInner {
                dom: dom.clone(),
                policy,
                container: Cell::new(None),
                entries: RefCell::new(VecDeque::new()),
                stats: Cell::new(QueueStats::default()),
            }),
        }
    }

    pub fn with_defaults(dom: &Dom) -> Self {
        Self::new(dom, ToastPolicy::default())
    }

    #[must_use]
    pub fn policy(&self) -> &ToastPolicy {
        &self.inner.policy
    }

    /// Build, enqueue, mount, and show a toast.
    pub fn show(&self, options: impl Into<ToastOptions>) -> Toast {
        let inner = &self.inner;
        let toast = Toast::new(&inner.dom, options.into(), &inner.policy);

        let weak: Weak<QueueInner> = Rc::downgrade(inner);
        let id = toast.id();
        let subscription = toast.on(EventName::Dismiss, move |_| {
            let Some(queue) = weak.upgrade() else {
                return;
            };
            if let Some(entry) = queue.remove(id) {
                entry.subscription.unsubscribe();
                queue.bump(|s| s.dismissed += 1);
            }
        });

        let evicted: Vec<Toast> = {
            let mut entries = inner.entries.borrow_mut();
            entries.push_back(Entry {
                toast: toast.clone(),
                subscription,
            });
            let mut evicted = Vec::new();
            let max = inner.policy.max_visible.max(1);
            while entries.len() > max {
                if let Some(oldest) = entries.pop_front() {
                    oldest.subscription.unsubscribe();
                    evicted.push(oldest.toast);
                }
            }
            evicted
        };
        for oldest in evicted {
            tracing::debug!(toast = oldest.id().raw(), "toast evicted");
            inner.bump(|s| {
                s.evicted += 1;
                s.dismissed += 1;
            });
            oldest.dismiss();
        }

        inner.bump(|s| s.total_shown += 1);
        toast.mount(inner.container());
        toast.show();
        toast
    }

    fn show_variant(&self, options: impl Into<ToastOptions>, variant: ToastVariant) -> Toast {
        self.show(options.into().variant(variant))
    }

    pub fn info(&self, options: impl Into<ToastOptions>) -> Toast {
        self.show_variant(options, ToastVariant::Info)
    }

    pub fn success(&self, options: impl Into<ToastOptions>) -> Toast {
        self.show_variant(options, ToastVariant::Success)
    }

    pub fn warning(&self, options: impl Into<ToastOptions>) -> Toast {
        self.show_variant(options, ToastVariant::Warning)
    }

    pub fn error(&self, options: impl Into<ToastOptions>) -> Toast {
        self.show_variant(options, ToastVariant::Error)
    }

    /// Dismiss every queued toast and empty the queue.
    pub fn dismiss_all(&self) {
        let drained: Vec<Entry> = self.inner.entries.borrow_mut().drain(..).collect();
        for entry in drained {
            entry.subscription.unsubscribe();
            self.inner.bump(|s| s.dismissed += 1);
            entry.toast.dismiss();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.entries.borrow().is_empty()
    }

    /// Queued toasts, oldest first.
    #[must_use]
    pub fn toasts(&self) -> Vec<Toast> {
        self.inner
            .entries
            .borrow()
            .iter()
            .map(|e| e.toast.clone())
            .collect()
    }

    /// The shared container, if it has been created.
    #[must_use]
    pub fn container(&self) -> Option<NodeId> {
        self.inner.container.get()
    }

    #[must_use]
    pub fn stats(&self) -> QueueStats {
        self.inner.stats.get()
    }

    /// Dismiss everything, drop the container, and zero the statistics.
    pub fn reset(&self) {
        self.dismiss_all();
        if let Some(container) = self.inner.container.take() {
            self.inner.dom.remove(container);
        }
        self.inner.stats.set(QueueStats::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn container_is_created_once() {
        let dom = Dom::new();
        let queue = ToastQueue::with_defaults(&dom);
        assert_eq!(queue.container(), None);
        let first = queue.show("one");
        let container = queue.container();
        queue.show("two");
        assert_eq!(queue.container(), container);
        assert_eq!(dom.parent(first.element()), container);
        assert_eq!(dom.query_selector_all(dom.body(), ".toast-container").len(), 1);
    }

    #[test]
    fn fourth_toast_evicts_oldest() {
        let dom = Dom::new();
        let queue = ToastQueue::with_defaults(&dom);
        let first = queue.show("1");
        let second = queue.show("2");
        let third = queue.show("3");
        let fourth = queue.show("4");

        assert_eq!(queue.len(), 3);
        assert!(first.is_dismissed());
        let ids: Vec<ToastId> = queue.toasts().iter().map(Toast::id).collect();
        assert_eq!(ids, vec![second.id(), third.id(), fourth.id()]);
        assert_eq!(queue.stats().evicted, 1);
    }

    #[test]
    fn expired_toast_leaves_queue() {
        let dom = Dom::new();
        let queue = ToastQueue::with_defaults(&dom);
        queue.success("Saved");
        queue.error("Failed");
        dom.advance(Duration::from_millis(5000));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.toasts()[0].variant(), ToastVariant::Error);
        dom.advance(Duration::from_millis(2000));
        assert!(queue.is_empty());
    }

    #[test]
    fn variant_helpers_use_policy_durations() {
        let dom = Dom::new();
        let queue = ToastQueue::with_defaults(&dom);
        assert_eq!(queue.success("a").duration(), Duration::from_millis(5000));
        assert_eq!(queue.warning("b").duration(), Duration::from_millis(6000));
        assert_eq!(queue.error("c").duration(), Duration::from_millis(7000));
        let custom = queue.info(ToastOptions::new("d").duration(Duration::from_millis(42)));
        assert_eq!(custom.duration(), Duration::from_millis(42));
    }

    #[test]
    fn dismiss_all_empties_queue() {
        let dom = Dom::new();
        let queue = ToastQueue::with_defaults(&dom);
        let toasts = [queue.show("a"), queue.show("b")];
        queue.dismiss_all();
        assert!(queue.is_empty());
        assert!(toasts.iter().all(Toast::is_dismissed));
        dom.advance(Duration::from_millis(300));
        assert!(toasts.iter().all(|t| !dom.is_connected(t.element())));
    }

    #[test]
    fn destroyed_toast_frees_its_slot() {
        let dom = Dom::new();
        let queue = ToastQueue::with_defaults(&dom);
        let first = queue.show("a");
        let second = queue.show("b");
        first.destroy();

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.toasts()[0].id(), second.id());
        assert_eq!(queue.stats().dismissed, 1);
        queue.show("c");
        queue.show("d");
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.stats().evicted, 0);
    }

    #[test]
    fn custom_capacity_is_respected() {
        let dom = Dom::new();
        let policy = ToastPolicy {
            max_visible: 1,
            ..ToastPolicy::default()
        };
        let queue = ToastQueue::new(&dom, policy);
        queue.show("a");
        let b = queue.show("b");
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.toasts()[0].id(), b.id());
    }

    #[test]
    fn reset_recreates_container() {
        let dom = Dom::new();
        let queue = ToastQueue::with_defaults(&dom);
        queue.show("a");
        let before = queue.container();
        queue.reset();
        assert!(queue.is_empty());
        assert_eq!(queue.container(), None);
        assert_eq!(queue.stats(), QueueStats::default());
        queue.show("b");
        assert_ne!(queue.container(), before);
    }
}
