#![forbid(unsafe_code)]

//! In-memory host document.
//!
//! [`Dom`] is the boundary every component talks to: element creation,
//! attribute/class/style mutation, native event registration and dispatch,
//! focus management, timers, and the local task executor.
//!
//! # Invariants
//!
//! 1. **No borrow across callbacks**: listener, timer, and task callbacks run
//!    with no internal borrow held, so they may call back into the `Dom`.
//! 2. **Snapshot dispatch**: the listener set of every node on the bubble path
//!    is captured before the first listener runs.
//! 3. **Stable ids**: nodes are never freed; a detached node keeps its id and
//!    state and can be re-attached.
//! 4. **Focus is connected**: `active_element()` is always `None` or a node
//!    attached under the document root.
//!
//! # Example
//!
//! ```
//! use domkit_core::dom::Dom;
//! use domkit_core::event::EventType;
//!
//! let dom = Dom::new();
//! let button = dom.create_element("button");
//! dom.append_child(dom.body(), button);
//! let _guard = dom.add_listener(button, EventType::Click, |event| {
//!     assert_eq!(event.event_type(), EventType::Click);
//! });
//! assert!(dom.click(button));
//! ```

use std::cell::RefCell;
use std::future::Future;
use std::rc::{Rc, Weak};
use std::time::Duration;

use ahash::AHashMap;

use crate::event::{DomEvent, EventType, KeyEvent};
use crate::selector::Selector;
use crate::task::{BoxError, TaskQueue};
use crate::timer::{TimerId, TimerQueue};

/// Tags that are focusable without an explicit `tabindex`.
const INTERACTIVE_TAGS: &[&str] = &["button", "input", "select", "textarea"];

/// Identifier of a node in a [`Dom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Build an id from its raw index. Only meaningful for the `Dom` that
    /// produced the index.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifier of a registered native listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type NativeListener = Rc<dyn Fn(&DomEvent)>;

struct Registration {
    id: ListenerId,
    event_type: EventType,
    callback: NativeListener,
}

struct Node {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: AHashMap<String, String>,
    classes: Vec<String>,
    style: AHashMap<String, String>,
    text: String,
    value: String,
    checked: bool,
    listeners: Vec<Registration>,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            parent: None,
            children: Vec::new(),
            attributes: AHashMap::new(),
            classes: Vec::new(),
            style: AHashMap::new(),
            text: String::new(),
            value: String::new(),
            checked: false,
            listeners: Vec::new(),
        }
    }

    fn tab_index(&self) -> Option<i32> {
        self.attributes
            .get("tabindex")
            .and_then(|v| v.trim().parse().ok())
    }

    fn is_interactive(&self) -> bool {
        INTERACTIVE_TAGS.contains(&self.tag.as_str())
            || (self.tag == "a" && self.attributes.contains_key("href"))
    }

    /// Member of the sequential (Tab) focus order.
    fn is_tabbable(&self) -> bool {
        if self.attributes.contains_key("disabled") {
            return false;
        }
        match self.tab_index() {
            Some(index) => index >= 0,
            None => self.is_interactive(),
        }
    }

    fn is_hidden(&self) -> bool {
        self.attributes.contains_key("hidden")
            || self
                .style
                .get("display")
                .is_some_and(|display| display.trim() == "none")
    }

    /// Can receive programmatic focus.
    fn is_focus_target(&self) -> bool {
        !self.attributes.contains_key("disabled")
            && (self.is_interactive() || self.attributes.contains_key("tabindex"))
    }

    fn input_type(&self) -> Option<&str> {
        if self.tag == "input" {
            Some(self.attributes.get("type").map_or("text", String::as_str))
        } else {
            None
        }
    }
}

struct Tree {
    nodes: Vec<Node>,
    document: NodeId,
    body: NodeId,
    active: Option<NodeId>,
    next_listener: u64,
}

impl Tree {
    fn new() -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            document: NodeId(0),
            body: NodeId(0),
            active: None,
            next_listener: 0,
        };
        tree.document = tree.alloc("#document");
        tree.body = tree.alloc("body");
        let (document, body) = (tree.document, tree.body);
        tree.attach(document, body);
        tree
    }

    fn alloc(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(tag));
        id
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.node(current).and_then(|n| n.parent);
        }
        false
    }

    fn is_connected(&self, node: NodeId) -> bool {
        self.node(node).is_some() && self.contains(self.document, node)
    }

    fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.node(child).and_then(|n| n.parent) else {
            return;
        };
        if let Some(p) = self.node_mut(parent) {
            p.children.retain(|c| *c != child);
        }
        if let Some(c) = self.node_mut(child) {
            c.parent = None;
        }
        if self.active.is_some_and(|active| self.contains(child, active)) {
            self.active = None;
        }
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.node(parent).is_none() || self.node(child).is_none() {
            return false;
        }
        // Appending an ancestor into its own subtree would create a cycle.
        if self.contains(child, parent) {
            return false;
        }
        self.detach(child);
        if let Some(p) = self.node_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.node_mut(child) {
            c.parent = Some(parent);
        }
        true
    }

    /// Pre-order walk of `root`'s subtree (excluding `root`).
    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self
            .node(root)
            .map(|n| n.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.node(id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Whether `node` or any of its ancestors satisfies `pred`.
    fn any_ancestor(&self, node: NodeId, pred: impl Fn(&Node) -> bool) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            match self.node(current) {
                Some(n) if pred(n) => return true,
                Some(n) => cursor = n.parent,
                None => return false,
            }
        }
        false
    }

    fn is_disabled_in_tree(&self, node: NodeId) -> bool {
        self.any_ancestor(node, |n| n.attributes.contains_key("disabled"))
    }

    /// Not rendered: inside a `hidden` or `display: none` subtree.
    fn is_hidden_in_tree(&self, node: NodeId) -> bool {
        self.any_ancestor(node, Node::is_hidden)
    }

    fn bubble_path(&self, target: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut cursor = Some(target);
        while let Some(current) = cursor {
            path.push(current);
            cursor = self.node(current).and_then(|n| n.parent);
        }
        path
    }
}

/// Scoped registration of a native listener.
///
/// Dropping the guard removes the listener. Hold it for exactly as long as
/// the listener should stay registered.
#[must_use = "dropping the guard removes the listener immediately"]
pub struct ListenerGuard {
    tree: Weak<RefCell<Tree>>,
    node: NodeId,
    id: ListenerId,
}

impl ListenerGuard {
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    #[must_use]
    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl std::fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("node", &self.node)
            .field("id", &self.id)
            .finish()
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let Some(tree) = self.tree.upgrade() else {
            return;
        };
        // A guard dropped from inside a listener of the same dispatch is fine:
        // dispatch holds no borrow while callbacks run.
        let Ok(mut tree) = tree.try_borrow_mut() else {
            return;
        };
        if let Some(node) = tree.node_mut(self.node) {
            node.listeners.retain(|r| r.id != self.id);
        }
    }
}

/// Cheap-clone handle to the host document.
#[derive(Clone)]
pub struct Dom {
    tree: Rc<RefCell<Tree>>,
    timers: Rc<RefCell<TimerQueue>>,
    tasks: Rc<TaskQueue>,
}

/// Weak counterpart of [`Dom`].
#[derive(Clone)]
pub struct WeakDom {
    tree: Weak<RefCell<Tree>>,
    timers: Weak<RefCell<TimerQueue>>,
    tasks: Weak<TaskQueue>,
}

impl WeakDom {
    /// Recover the strong handle if the document is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<Dom> {
        Some(Dom {
            tree: self.tree.upgrade()?,
            timers: self.timers.upgrade()?,
            tasks: self.tasks.upgrade()?,
        })
    }
}

impl std::fmt::Debug for WeakDom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakDom")
            .field("alive", &(self.tree.strong_count() > 0))
            .finish()
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tree = self.tree.borrow();
        f.debug_struct("Dom")
            .field("nodes", &tree.nodes.len())
            .field("active", &tree.active)
            .field("pending_timers", &self.timers.borrow().len())
            .finish()
    }
}

impl Dom {
    /// Create a document with an empty `body`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: Rc::new(RefCell::new(Tree::new())),
            timers: Rc::new(RefCell::new(TimerQueue::default())),
            tasks: Rc::new(TaskQueue::new()),
        }
    }

    /// Whether two handles refer to the same document.
    #[must_use]
    pub fn same_document(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.tree, &other.tree)
    }

    /// Non-owning handle, for callbacks stored inside the document itself.
    #[must_use]
    pub fn downgrade(&self) -> WeakDom {
        WeakDom {
            tree: Rc::downgrade(&self.tree),
            timers: Rc::downgrade(&self.timers),
            tasks: Rc::downgrade(&self.tasks),
        }
    }

    // --- Tree ---------------------------------------------------------------

    /// The document root.
    #[must_use]
    pub fn document(&self) -> NodeId {
        self.tree.borrow().document
    }

    #[must_use]
    pub fn body(&self) -> NodeId {
        self.tree.borrow().body
    }

    /// Create a detached element.
    pub fn create_element(&self, tag: &str) -> NodeId {
        self.tree.borrow_mut().alloc(tag)
    }

    /// Tag name (lowercase), or `None` for an unknown id.
    #[must_use]
    pub fn tag(&self, node: NodeId) -> Option<String> {
        self.tree.borrow().node(node).map(|n| n.tag.clone())
    }

    /// Append `child` to `parent`, moving it if it is already attached.
    ///
    /// Returns `false` for unknown ids or if the move would create a cycle.
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> bool {
        self.tree.borrow_mut().attach(parent, child)
    }

    /// Detach `node` from its parent. No-op for detached nodes.
    pub fn remove(&self, node: NodeId) {
        self.tree.borrow_mut().detach(node);
    }

    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.borrow().node(node).and_then(|n| n.parent)
    }

    #[must_use]
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree
            .borrow()
            .node(node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// Whether `node` is attached under the document root.
    #[must_use]
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.tree.borrow().is_connected(node)
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    #[must_use]
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.tree.borrow().contains(ancestor, node)
    }

    // --- Attributes, classes, style, properties -----------------------------

    pub fn set_attribute(&self, node: NodeId, name: &str, value: impl Into<String>) {
        if let Some(n) = self.tree.borrow_mut().node_mut(node) {
            n.attributes.insert(name.to_string(), value.into());
        }
    }

    #[must_use]
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.tree
            .borrow()
            .node(node)
            .and_then(|n| n.attributes.get(name).cloned())
    }

    #[must_use]
    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.tree
            .borrow()
            .node(node)
            .is_some_and(|n| n.attributes.contains_key(name))
    }

    pub fn remove_attribute(&self, node: NodeId, name: &str) {
        if let Some(n) = self.tree.borrow_mut().node_mut(node) {
            n.attributes.remove(name);
        }
    }

    /// Set or remove a boolean attribute such as `disabled`.
    pub fn toggle_attribute(&self, node: NodeId, name: &str, on: bool) {
        if on {
            self.set_attribute(node, name, "");
        } else {
            self.remove_attribute(node, name);
        }
    }

    /// Add every whitespace-separated class in `classes`.
    pub fn add_class(&self, node: NodeId, classes: &str) {
        if let Some(n) = self.tree.borrow_mut().node_mut(node) {
            for class in classes.split_whitespace() {
                if !n.classes.iter().any(|c| c == class) {
                    n.classes.push(class.to_string());
                }
            }
        }
    }

    pub fn remove_class(&self, node: NodeId, class: &str) {
        if let Some(n) = self.tree.borrow_mut().node_mut(node) {
            n.classes.retain(|c| c != class);
        }
    }

    pub fn toggle_class(&self, node: NodeId, class: &str, on: bool) {
        if on {
            self.add_class(node, class);
        } else {
            self.remove_class(node, class);
        }
    }

    #[must_use]
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.tree
            .borrow()
            .node(node)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    #[must_use]
    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.tree
            .borrow()
            .node(node)
            .map(|n| n.classes.clone())
            .unwrap_or_default()
    }

    pub fn set_style(&self, node: NodeId, property: &str, value: impl Into<String>) {
        if let Some(n) = self.tree.borrow_mut().node_mut(node) {
            n.style.insert(property.to_string(), value.into());
        }
    }

    #[must_use]
    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.tree
            .borrow()
            .node(node)
            .and_then(|n| n.style.get(property).cloned())
    }

    pub fn remove_style(&self, node: NodeId, property: &str) {
        if let Some(n) = self.tree.borrow_mut().node_mut(node) {
            n.style.remove(property);
        }
    }

    pub fn set_text(&self, node: NodeId, text: impl Into<String>) {
        if let Some(n) = self.tree.borrow_mut().node_mut(node) {
            n.text = text.into();
        }
    }

    /// Own text of `node` (not including descendants).
    #[must_use]
    pub fn text(&self, node: NodeId) -> String {
        self.tree
            .borrow()
            .node(node)
            .map(|n| n.text.clone())
            .unwrap_or_default()
    }

    /// Concatenated text of `node` and its descendants in document order.
    #[must_use]
    pub fn text_content(&self, node: NodeId) -> String {
        let tree = self.tree.borrow();
        let mut out = tree.node(node).map(|n| n.text.clone()).unwrap_or_default();
        for id in tree.descendants(node) {
            if let Some(n) = tree.node(id) {
                out.push_str(&n.text);
            }
        }
        out
    }

    pub fn set_value(&self, node: NodeId, value: impl Into<String>) {
        if let Some(n) = self.tree.borrow_mut().node_mut(node) {
            n.value = value.into();
        }
    }

    #[must_use]
    pub fn value(&self, node: NodeId) -> String {
        self.tree
            .borrow()
            .node(node)
            .map(|n| n.value.clone())
            .unwrap_or_default()
    }

    pub fn set_checked(&self, node: NodeId, checked: bool) {
        if let Some(n) = self.tree.borrow_mut().node_mut(node) {
            n.checked = checked;
        }
    }

    #[must_use]
    pub fn is_checked(&self, node: NodeId) -> bool {
        self.tree.borrow().node(node).is_some_and(|n| n.checked)
    }

    /// Whether `node` or any ancestor carries `disabled`.
    #[must_use]
    pub fn is_disabled(&self, node: NodeId) -> bool {
        self.tree.borrow().is_disabled_in_tree(node)
    }

    // --- Queries ------------------------------------------------------------

    /// First connected element matching `selector` in document order.
    #[must_use]
    pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
        let root = self.document();
        self.query_selector_all(root, selector).into_iter().next()
    }

    /// All descendants of `root` matching `selector`, in document order.
    #[must_use]
    pub fn query_selector_all(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
        let Some(selector) = Selector::parse(selector) else {
            return Vec::new();
        };
        let tree = self.tree.borrow();
        tree.descendants(root)
            .into_iter()
            .filter(|id| {
                tree.node(*id).is_some_and(|n| {
                    selector.matches(
                        &n.tag,
                        n.attributes.get("id").map(String::as_str),
                        &n.classes,
                    )
                })
            })
            .collect()
    }

    /// Tabbable descendants of `root` in document order.
    ///
    /// Matches buttons, links with `href`, inputs, selects, textareas, and
    /// elements with a non-negative `tabindex`; disabled elements (or those
    /// inside a disabled ancestor), elements inside a `hidden` or
    /// `display: none` subtree, and negative `tabindex` are excluded.
    #[must_use]
    pub fn focusable_within(&self, root: NodeId) -> Vec<NodeId> {
        let tree = self.tree.borrow();
        tree.descendants(root)
            .into_iter()
            .filter(|id| {
                tree.node(*id).is_some_and(Node::is_tabbable)
                    && !tree.is_disabled_in_tree(*id)
                    && !tree.is_hidden_in_tree(*id)
            })
            .collect()
    }

    // --- Focus --------------------------------------------------------------

    #[must_use]
    pub fn active_element(&self) -> Option<NodeId> {
        self.tree.borrow().active
    }

    /// Move focus to `node`, dispatching `blur` then `focus`.
    ///
    /// Returns `false` (and leaves focus alone) if the node is detached,
    /// disabled, hidden, or not focusable.
    pub fn focus(&self, node: NodeId) -> bool {
        let previous = {
            let tree = self.tree.borrow();
            let focusable = tree.is_connected(node)
                && tree.node(node).is_some_and(Node::is_focus_target)
                && !tree.is_disabled_in_tree(node)
                && !tree.is_hidden_in_tree(node);
            if !focusable {
                return false;
            }
            if tree.active == Some(node) {
                return true;
            }
            tree.active
        };
        self.tree.borrow_mut().active = Some(node);
        if let Some(previous) = previous {
            self.dispatch(previous, &DomEvent::new(EventType::Blur, previous));
        }
        self.dispatch(node, &DomEvent::new(EventType::Focus, node));
        true
    }

    /// Remove focus from `node` if it is the active element.
    pub fn blur(&self, node: NodeId) {
        {
            let mut tree = self.tree.borrow_mut();
            if tree.active != Some(node) {
                return;
            }
            tree.active = None;
        }
        self.dispatch(node, &DomEvent::new(EventType::Blur, node));
    }

    // --- Native events ------------------------------------------------------

    /// Register a listener on `node`. It stays registered until the returned
    /// guard is dropped.
    pub fn add_listener(
        &self,
        node: NodeId,
        event_type: EventType,
        callback: impl Fn(&DomEvent) + 'static,
    ) -> ListenerGuard {
        let mut tree = self.tree.borrow_mut();
        let id = ListenerId(tree.next_listener);
        tree.next_listener += 1;
        if let Some(n) = tree.node_mut(node) {
            n.listeners.push(Registration {
                id,
                event_type,
                callback: Rc::new(callback),
            });
        }
        ListenerGuard {
            tree: Rc::downgrade(&self.tree),
            node,
            id,
        }
    }

    /// Number of listeners currently registered on `node`.
    #[must_use]
    pub fn listener_count(&self, node: NodeId, event_type: EventType) -> usize {
        self.tree.borrow().node(node).map_or(0, |n| {
            n.listeners
                .iter()
                .filter(|r| r.event_type == event_type)
                .count()
        })
    }

    /// Dispatch `event` at `target`, bubbling to the document root.
    ///
    /// Returns `false` if a listener prevented the default action.
    pub fn dispatch(&self, target: NodeId, event: &DomEvent) -> bool {
        let plan: Vec<(NodeId, Vec<NativeListener>)> = {
            let tree = self.tree.borrow();
            tree.bubble_path(target)
                .into_iter()
                .map(|id| {
                    let listeners = tree
                        .node(id)
                        .map(|n| {
                            n.listeners
                                .iter()
                                .filter(|r| r.event_type == event.event_type())
                                .map(|r| Rc::clone(&r.callback))
                                .collect()
                        })
                        .unwrap_or_default();
                    (id, listeners)
                })
                .collect()
        };

        for (node, listeners) in plan {
            event.set_current_target(node);
            for listener in listeners {
                listener(event);
            }
        }
        !event.default_prevented()
    }

    // --- Host input simulation ----------------------------------------------

    /// Simulate a user click on `node`.
    ///
    /// Disabled elements receive nothing. Checkbox and radio inputs toggle
    /// before `click` is dispatched; a prevented click reverts the toggle,
    /// otherwise `change` follows. Returns `false` if nothing was dispatched
    /// or the default was prevented.
    pub fn click(&self, node: NodeId) -> bool {
        if self.is_disabled(node) {
            return false;
        }
        let toggle = self.apply_check_toggle(node);
        let event = DomEvent::new(EventType::Click, node);
        let proceed = self.dispatch(node, &event);
        match toggle {
            Some(snapshot) if !proceed => {
                for (id, checked) in snapshot {
                    self.set_checked(id, checked);
                }
            }
            Some(_) => {
                self.dispatch(node, &DomEvent::new(EventType::Change, node));
            }
            None => {}
        }
        proceed
    }

    /// Simulate typing: replace the value and dispatch `input` then `change`.
    pub fn input_text(&self, node: NodeId, text: impl Into<String>) {
        if self.is_disabled(node) {
            return;
        }
        self.set_value(node, text);
        self.dispatch(node, &DomEvent::new(EventType::Input, node));
        self.dispatch(node, &DomEvent::new(EventType::Change, node));
    }

    /// Simulate choosing an option of a `select`.
    pub fn select_option(&self, node: NodeId, value: impl Into<String>) {
        if self.is_disabled(node) {
            return;
        }
        self.set_value(node, value);
        self.dispatch(node, &DomEvent::new(EventType::Change, node));
    }

    /// Simulate a key press at the focused element (or `body`).
    ///
    /// An unprevented Tab/Shift+Tab moves focus through the document's
    /// tabbable elements, wrapping at either end.
    pub fn key_down(&self, key: KeyEvent) -> bool {
        let target = self.active_element().unwrap_or_else(|| self.body());
        let proceed = self.dispatch(target, &DomEvent::key_down(target, key));
        if proceed && key.is_tab() {
            self.sequential_focus(key.is_back_tab());
        }
        proceed
    }

    fn sequential_focus(&self, backwards: bool) {
        let order = self.focusable_within(self.document());
        if order.is_empty() {
            return;
        }
        let current = self
            .active_element()
            .and_then(|active| order.iter().position(|id| *id == active));
        let next = match (current, backwards) {
            (None, false) => 0,
            (None, true) => order.len() - 1,
            (Some(i), false) => (i + 1) % order.len(),
            (Some(i), true) => (i + order.len() - 1) % order.len(),
        };
        self.focus(order[next]);
    }

    /// Flip the checked state of a checkbox or radio, returning the prior
    /// states of every input touched so a prevented click can restore them.
    fn apply_check_toggle(&self, node: NodeId) -> Option<Vec<(NodeId, bool)>> {
        let mut tree = self.tree.borrow_mut();
        let (kind, name) = {
            let n = tree.node(node)?;
            let kind = n.input_type()?.to_string();
            (kind, n.attributes.get("name").cloned())
        };
        match kind.as_str() {
            "checkbox" => {
                let n = tree.node_mut(node)?;
                let before = n.checked;
                n.checked = !before;
                Some(vec![(node, before)])
            }
            "radio" => {
                let mut snapshot = Vec::new();
                if let Some(name) = name {
                    let document = tree.document;
                    let peers: Vec<NodeId> = tree
                        .descendants(document)
                        .into_iter()
                        .filter(|id| {
                            *id != node
                                && tree.node(*id).is_some_and(|n| {
                                    n.input_type() == Some("radio")
                                        && n.attributes.get("name") == Some(&name)
                                })
                        })
                        .collect();
                    for peer in peers {
                        if let Some(p) = tree.node_mut(peer) {
                            snapshot.push((peer, p.checked));
                            p.checked = false;
                        }
                    }
                }
                let n = tree.node_mut(node)?;
                snapshot.push((node, n.checked));
                n.checked = true;
                Some(snapshot)
            }
            _ => None,
        }
    }

    // --- Timers -------------------------------------------------------------

    /// Schedule `callback` to run once after `delay` of virtual time.
    pub fn set_timeout(&self, delay: Duration, callback: impl FnOnce() + 'static) -> TimerId {
        self.timers.borrow_mut().schedule(delay, Box::new(callback))
    }

    /// Cancel a pending timer. Returns `false` if it already fired or was
    /// cancelled.
    pub fn clear_timeout(&self, id: TimerId) -> bool {
        self.timers.borrow_mut().cancel(id)
    }

    /// Elapsed virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.timers.borrow().now()
    }

    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Advance the clock by `by`, firing every timer that comes due,
    /// including ones scheduled by callbacks within the window.
    pub fn advance(&self, by: Duration) {
        let limit = self.now() + by;
        loop {
            let next = self.timers.borrow_mut().pop_due(limit);
            match next {
                Some(callback) => callback(),
                None => break,
            }
        }
        self.timers.borrow_mut().set_now(limit);
    }

    /// Fire timers until none are pending.
    pub fn run_timers(&self) {
        loop {
            let last = self.timers.borrow().last_due();
            match last {
                Some(due) => {
                    let now = self.now();
                    self.advance(due.saturating_sub(now));
                }
                None => break,
            }
        }
    }

    // --- Tasks --------------------------------------------------------------

    /// Queue a local future. It first runs on the next
    /// [`run_until_stalled`](Self::run_until_stalled).
    pub fn spawn_local(&self, future: impl Future<Output = ()> + 'static) {
        self.tasks.spawn(future);
    }

    /// Poll queued tasks until none can make progress.
    pub fn run_until_stalled(&self) {
        self.tasks.run_until_stalled();
    }

    /// Route an error nobody handled to the unhandled-error channel.
    pub fn report_error(&self, err: BoxError) {
        self.tasks.report(err);
    }

    /// Drain the unhandled-error channel.
    pub fn take_errors(&self) -> Vec<BoxError> {
        self.tasks.take_unhandled()
    }
}
