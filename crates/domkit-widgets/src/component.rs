#![forbid(unsafe_code)]

//! Component base: element ownership, lifecycle, events, and scratch state.
//!
//! Every widget owns one [`ComponentBase`] and implements [`Component`] on
//! top of it. The base never changes its element after construction.
//!
//! # Lifecycle
//!
//! ```text
//!   new ──► Unmounted ◄──► Mounted
//!               │             │
//!               └──► Destroyed ◄┘   (terminal)
//! ```
//!
//! # Construction
//!
//! [`ComponentBase::new`] runs the `create_element` hook exactly once when
//! no element was supplied, applies the configured class name and disabled
//! state, and leaves the node detached. The concrete constructor then wires
//! its native listeners through [`ComponentBase::listen`]; those guards are
//! released by `destroy`.
//!
//! # Failure Modes
//!
//! - Mounting to a selector that matches nothing is a no-op returning `false`.
//! - Any operation on a destroyed component is a logged no-op.

use std::cell::{Cell, RefCell};
use std::sync::atomic::{AtomicU32, Ordering};

use ahash::AHashMap;
use domkit_core::{Dom, DomEvent, EventType, ListenerGuard, NodeId};

use crate::emitter::{Emitter, Listener, Subscription};
use crate::value::{EventName, Value};

/// Class applied to the root element while a component is disabled.
pub const DISABLED_CLASS: &str = "is-disabled";

static ID_COUNTER: AtomicU32 = AtomicU32::new(1);

/// Document-unique id for ARIA wiring (`aria-labelledby`, `for`, radio names).
pub(crate) fn unique_id(prefix: &str) -> String {
    let n = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{n}")
}

/// Configuration shared by every component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseConfig {
    /// Use this element instead of creating one.
    pub element: Option<NodeId>,
    /// Extra class(es) for the root element.
    pub class_name: Option<String>,
    /// Start disabled.
    pub disabled: bool,
}

impl BaseConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn element(mut self, element: NodeId) -> Self {
        self.element = Some(element);
        self
    }

    #[must_use]
    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// Lifecycle state of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed, node detached.
    Unmounted,
    /// Node attached under a parent.
    Mounted,
    /// Terminal. Listeners, subscriptions, and scratch state are gone.
    Destroyed,
}

/// Where to mount a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountTarget {
    /// A specific parent node.
    Node(NodeId),
    /// The first connected element matching a simple selector.
    Selector(String),
}

impl From<NodeId> for MountTarget {
    fn from(node: NodeId) -> Self {
        Self::Node(node)
    }
}

impl From<&str> for MountTarget {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_string())
    }
}

impl From<String> for MountTarget {
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}

/// State and behavior shared by all components.
pub struct ComponentBase {
    kind: &'static str,
    dom: Dom,
    element: NodeId,
    emitter: Emitter,
    disabled: Cell<bool>,
    lifecycle: Cell<Lifecycle>,
    state: RefCell<AHashMap<String, Value>>,
    listeners: RefCell<Vec<ListenerGuard>>,
}

impl std::fmt::Debug for ComponentBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentBase")
            .field("kind", &self.kind)
            .field("element", &self.element)
            .field("lifecycle", &self.lifecycle.get())
            .field("disabled", &self.disabled.get())
            .finish()
    }
}

impl ComponentBase {
    /// Build the base for a component of type `kind`.
    ///
    /// `create_element` is called once, and only if `config.element` is unset.
    pub fn new(
        dom: &Dom,
        kind: &'static str,
        config: &BaseConfig,
        create_element: impl FnOnce(&Dom) -> NodeId,
    ) -> Self {
        let element = match config.element {
            Some(element) => element,
            None => create_element(dom),
        };
        if let Some(class_name) = &config.class_name {
            dom.add_class(element, class_name);
        }
        let base = Self {
            kind,
            dom: dom.clone(),
            element,
            emitter: Emitter::new(),
            disabled: Cell::new(false),
            lifecycle: Cell::new(Lifecycle::Unmounted),
            state: RefCell::new(AHashMap::new()),
            listeners: RefCell::new(Vec::new()),
        };
        if config.disabled {
            base.set_disabled(true);
        }
        base
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    #[must_use]
    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    /// The root element. Fixed for the component's lifetime.
    #[must_use]
    pub fn element(&self) -> NodeId {
        self.element
    }

    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle.get()
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.lifecycle.get() == Lifecycle::Destroyed
    }

    /// Log and report whether the component is destroyed.
    pub(crate) fn guard_destroyed(&self, operation: &'static str) -> bool {
        let destroyed = self.is_destroyed();
        if destroyed {
            tracing::warn!(
                component = self.kind,
                element = self.element.raw(),
                operation,
                "operation on destroyed component ignored"
            );
        }
        destroyed
    }

    /// Register a native listener that lives until `destroy`.
    pub fn listen(
        &self,
        node: NodeId,
        event_type: EventType,
        callback: impl Fn(&DomEvent) + 'static,
    ) {
        if self.guard_destroyed("listen") {
            return;
        }
        let guard = self.dom.add_listener(node, event_type, callback);
        self.listeners.borrow_mut().push(guard);
    }

    /// Attach the root element under `target`, re-parenting if needed.
    ///
    /// Returns `false` without side effects if the target cannot be resolved.
    pub fn mount(&self, target: impl Into<MountTarget>) -> bool {
        if self.guard_destroyed("mount") {
            return false;
        }
        let target = target.into();
        let parent = match &target {
            MountTarget::Node(node) => Some(*node),
            MountTarget::Selector(selector) => self.dom.query_selector(selector),
        };
        let Some(parent) = parent else {
            tracing::warn!(component = self.kind, ?target, "mount target not found");
            return false;
        };
        if !self.dom.append_child(parent, self.element) {
            tracing::warn!(component = self.kind, ?target, "mount target rejected node");
            return false;
        }
        self.lifecycle.set(Lifecycle::Mounted);
        tracing::debug!(
            component = self.kind,
            element = self.element.raw(),
            parent = parent.raw(),
            "mounted"
        );
        true
    }

    /// Detach the root element. No-op when already detached.
    pub fn unmount(&self) {
        if self.guard_destroyed("unmount") {
            return;
        }
        if self.dom.parent(self.element).is_some() {
            self.dom.remove(self.element);
            tracing::debug!(component = self.kind, element = self.element.raw(), "unmounted");
        }
        self.lifecycle.set(Lifecycle::Unmounted);
    }

    /// Unmount, drop native listeners, clear subscriptions and scratch state.
    pub fn destroy(&self) {
        if self.is_destroyed() {
            return;
        }
        self.unmount();
        // Move the guards out before dropping so no borrow is held while the
        // document unregisters them.
        let guards = std::mem::take(&mut *self.listeners.borrow_mut());
        drop(guards);
        self.emitter.clear();
        self.state.borrow_mut().clear();
        self.lifecycle.set(Lifecycle::Destroyed);
        tracing::debug!(component = self.kind, element = self.element.raw(), "destroyed");
    }

    /// Subscribe a closure to a framework event.
    pub fn on(&self, name: EventName, listener: impl Fn(&Value) + 'static) -> Subscription {
        self.emitter.on(name, listener)
    }

    /// Subscribe a shared listener; re-subscribing the same `Rc` is a no-op.
    pub fn subscribe(&self, name: EventName, listener: Listener) -> Subscription {
        self.emitter.subscribe(name, listener)
    }

    /// Dispatch a framework event to subscribers. For component implementations.
    pub fn emit(&self, name: EventName, value: &Value) {
        if self.is_destroyed() {
            return;
        }
        self.emitter.emit(name, value);
    }

    /// Shared handle to the emitter, for native listeners that only forward.
    pub(crate) fn emitter_handle(&self) -> Emitter {
        self.emitter.clone()
    }

    #[must_use]
    pub fn listener_count(&self, name: EventName) -> usize {
        self.emitter.listener_count(name)
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled.get()
    }

    /// Toggle the disabled flag plus its attribute, class, and ARIA state on
    /// the root.
    pub fn set_disabled(&self, disabled: bool) {
        if self.guard_destroyed("set_disabled") {
            return;
        }
        self.disabled.set(disabled);
        self.dom.toggle_attribute(self.element, "disabled", disabled);
        self.dom.toggle_class(self.element, DISABLED_CLASS, disabled);
        if disabled {
            self.dom.set_attribute(self.element, "aria-disabled", "true");
        } else {
            self.dom.remove_attribute(self.element, "aria-disabled");
        }
    }

    #[must_use]
    pub fn state(&self, key: &str) -> Option<Value> {
        self.state.borrow().get(key).cloned()
    }

    pub fn set_state(&self, key: impl Into<String>, value: Value) {
        if self.guard_destroyed("set_state") {
            return;
        }
        self.state.borrow_mut().insert(key.into(), value);
    }

    pub fn remove_state(&self, key: &str) -> Option<Value> {
        self.state.borrow_mut().remove(key)
    }

    pub fn clear_state(&self) {
        self.state.borrow_mut().clear();
    }
}

/// Contract implemented by every widget.
///
/// Implementors supply the base and the semantic value; lifecycle, events,
/// and disabled handling come from the provided methods and may be
/// overridden to reach native sub-elements.
pub trait Component {
    /// The widget's semantic value (text, flag, selection, ...).
    type Value;

    fn base(&self) -> &ComponentBase;

    fn get(&self) -> Self::Value;

    fn set(&self, value: Self::Value);

    fn element(&self) -> NodeId {
        self.base().element()
    }

    fn lifecycle(&self) -> Lifecycle {
        self.base().lifecycle()
    }

    fn mount(&self, target: impl Into<MountTarget>) -> bool
    where
        Self: Sized,
    {
        self.base().mount(target)
    }

    fn unmount(&self) {
        self.base().unmount();
    }

    fn destroy(&self) {
        self.base().destroy();
    }

    fn on(&self, name: EventName, listener: impl Fn(&Value) + 'static) -> Subscription
    where
        Self: Sized,
    {
        self.base().on(name, listener)
    }

    fn is_disabled(&self) -> bool {
        self.base().is_disabled()
    }

    fn set_disabled(&self, disabled: bool) {
        self.base().set_disabled(disabled);
    }
}
