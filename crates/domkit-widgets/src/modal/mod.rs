#![forbid(unsafe_code)]

//! Focus-trapping dialog.
//!
//! # Structure
//!
//! ```text
//! div.modal-backdrop                      (component element)
//! └── div.modal.modal--{size}             role=dialog aria-modal=true
//!     ├── div.modal__header
//!     │   ├── h2.modal__title
//!     │   └── button.modal__close
//!     ├── div.modal__body
//!     └── div.modal__footer               (only with actions)
//!         ├── button.modal__secondary
//!         └── button.modal__primary
//! ```
//!
//! # Invariants
//!
//! 1. **Open state**: `is_open()` is true exactly when the backdrop is
//!    attached and displayed, the Escape listener (if enabled) and the focus
//!    trap are installed, and the previously focused element is recorded.
//! 2. **Single registration**: at most one Escape listener and one focus trap
//!    exist per dialog; `open` while open is a no-op.
//! 3. **Release on every path**: `close` and `destroy` drop both listeners
//!    and cancel the pending initial-focus timer.
//! 4. **Focus restoration**: `close` refocuses the element that had focus
//!    before `open`, if it is still connected.

mod action;
mod focus_trap;

pub use action::{ActionError, ActionHandler, ModalAction};
pub use focus_trap::{FocusTrap, trap_target};

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use domkit_core::{Dom, EventType, ListenerGuard, NodeId, TimerId};

use crate::component::{BaseConfig, Component, ComponentBase, unique_id};
use crate::config::ModalPolicy;
use crate::value::{EventName, Value};
use action::BusyGuard;

/// Dialog width preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl ModalSize {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

/// Construction options for a [`Modal`].
#[derive(Debug, Clone)]
pub struct ModalConfig {
    pub base: BaseConfig,
    pub title: String,
    pub body: Option<String>,
    pub close_on_escape: bool,
    pub close_on_backdrop_click: bool,
    pub primary_action: Option<ModalAction>,
    pub secondary_action: Option<ModalAction>,
    pub size: ModalSize,
    /// Delay before the first focusable descendant receives focus.
    pub focus_delay: Duration,
}

impl ModalConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self::from_policy(title, &ModalPolicy::default())
    }

    pub fn from_policy(title: impl Into<String>, policy: &ModalPolicy) -> Self {
        Self {
            base: BaseConfig::default(),
            title: title.into(),
            body: None,
            close_on_escape: policy.close_on_escape,
            close_on_backdrop_click: policy.close_on_backdrop_click,
            primary_action: None,
            secondary_action: None,
            size: ModalSize::default(),
            focus_delay: policy.focus_delay(),
        }
    }

    #[must_use]
    pub fn base(mut self, base: BaseConfig) -> Self {
        self.base = base;
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn close_on_escape(mut self, on: bool) -> Self {
        self.close_on_escape = on;
        self
    }

    #[must_use]
    pub fn close_on_backdrop_click(mut self, on: bool) -> Self {
        self.close_on_backdrop_click = on;
        self
    }

    #[must_use]
    pub fn primary_action(mut self, action: ModalAction) -> Self {
        self.primary_action = Some(action);
        self
    }

    #[must_use]
    pub fn secondary_action(mut self, action: ModalAction) -> Self {
        self.secondary_action = Some(action);
        self
    }

    #[must_use]
    pub fn size(mut self, size: ModalSize) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn focus_delay(mut self, delay: Duration) -> Self {
        self.focus_delay = delay;
        self
    }
}

struct ModalInner {
    base: ComponentBase,
    dialog: NodeId,
    title: NodeId,
    body: NodeId,
    primary_button: Option<NodeId>,
    secondary_button: Option<NodeId>,
    primary_action: Option<ModalAction>,
    secondary_action: Option<ModalAction>,
    close_on_escape: bool,
    focus_delay: Duration,
    is_open: Cell<bool>,
    previous_active: Cell<Option<NodeId>>,
    escape_guard: RefCell<Option<ListenerGuard>>,
    trap: RefCell<Option<FocusTrap>>,
    focus_timer: Cell<Option<TimerId>>,
}

impl ModalInner {
    fn dom(&self) -> &Dom {
        self.base.dom()
    }

    fn cancel_focus_timer(&self) {
        if let Some(timer) = self.focus_timer.take() {
            self.dom().clear_timeout(timer);
        }
    }

    /// Drop the Escape listener and focus trap outside any borrow.
    fn release_listeners(&self) {
        let escape = self.escape_guard.borrow_mut().take();
        drop(escape);
        let trap = self.trap.borrow_mut().take();
        drop(trap);
    }
}

/// Modal dialog. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Modal {
    inner: Rc<ModalInner>,
}

impl std::fmt::Debug for Modal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Modal")
            .field("element", &self.inner.base.element())
            .field("open", &self.inner.is_open.get())
            .finish()
    }
}

fn action_button(dom: &Dom, parent: NodeId, class: &str, label: &str) -> NodeId {
    let button = dom.create_element("button");
    dom.set_attribute(button, "type", "button");
    dom.add_class(button, class);
    dom.set_text(button, label);
    dom.append_child(parent, button);
    button
}

impl Modal {
    pub fn new(dom: &Dom, config: ModalConfig) -> Self {
        let base = ComponentBase::new(dom, "modal", &config.base, |dom| {
            let backdrop = dom.create_element("div");
            dom.add_class(backdrop, "modal-backdrop");
            backdrop
        });
        let backdrop = base.element();
        dom.set_style(backdrop, "display", "none");
        dom.set_attribute(backdrop, "aria-hidden", "true");

        let title_id = unique_id("modal-title");
        let dialog = dom.create_element("div");
        dom.add_class(dialog, &format!("modal modal--{}", config.size.as_str()));
        dom.set_attribute(dialog, "role", "dialog");
        dom.set_attribute(dialog, "aria-modal", "true");
        dom.set_attribute(dialog, "aria-labelledby", title_id.clone());
        dom.set_attribute(dialog, "tabindex", "-1");
        dom.append_child(backdrop, dialog);

        let header = dom.create_element("div");
        dom.add_class(header, "modal__header");
        dom.append_child(dialog, header);
        let title = dom.create_element("h2");
        dom.add_class(title, "modal__title");
        dom.set_attribute(title, "id", title_id);
        dom.set_text(title, config.title.clone());
        dom.append_child(header, title);
        let close_button = action_button(dom, header, "modal__close", "\u{d7}");
        dom.set_attribute(close_button, "aria-label", "Close");

        let body = dom.create_element("div");
        dom.add_class(body, "modal__body");
        if let Some(text) = &config.body {
            dom.set_text(body, text.clone());
        }
        dom.append_child(dialog, body);

        let (primary_button, secondary_button) =
            if config.primary_action.is_some() || config.secondary_action.is_some() {
                let footer = dom.create_element("div");
                dom.add_class(footer, "modal__footer");
                dom.append_child(dialog, footer);
                let secondary = config
                    .secondary_action
                    .as_ref()
                    .map(|a| action_button(dom, footer, "modal__secondary", &a.label));
                let primary = config
                    .primary_action
                    .as_ref()
                    .map(|a| action_button(dom, footer, "modal__primary", &a.label));
                (primary, secondary)
            } else {
                (None, None)
            };

        let modal = Self {
            inner: Rc::new(ModalInner {
                base,
                dialog,
                title,
                body,
                primary_button,
                secondary_button,
                primary_action: config.primary_action,
                secondary_action: config.secondary_action,
                close_on_escape: config.close_on_escape,
                focus_delay: config.focus_delay,
                is_open: Cell::new(false),
                previous_active: Cell::new(None),
                escape_guard: RefCell::new(None),
                trap: RefCell::new(None),
                focus_timer: Cell::new(None),
            }),
        };
        modal.wire(close_button, config.close_on_backdrop_click);
        modal
    }

    fn downgrade(&self) -> Weak<ModalInner> {
        Rc::downgrade(&self.inner)
    }

    fn upgrade(weak: &Weak<ModalInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    fn wire(&self, close_button: NodeId, close_on_backdrop_click: bool) {
        let inner = &self.inner;
        let weak = self.downgrade();
        inner.base.listen(close_button, EventType::Click, move |_| {
            if let Some(modal) = Modal::upgrade(&weak) {
                modal.close();
            }
        });

        if close_on_backdrop_click {
            let weak = self.downgrade();
            let backdrop = inner.base.element();
            inner.base.listen(backdrop, EventType::Click, move |event| {
                if event.target() != backdrop {
                    return;
                }
                if let Some(modal) = Modal::upgrade(&weak) {
                    modal.close();
                }
            });
        }

        if let Some(button) = inner.primary_button {
            let weak = self.downgrade();
            inner.base.listen(button, EventType::Click, move |_| {
                if let Some(modal) = Modal::upgrade(&weak) {
                    modal.run_primary();
                }
            });
        }

        if let Some(button) = inner.secondary_button {
            let weak = self.downgrade();
            inner.base.listen(button, EventType::Click, move |_| {
                if let Some(modal) = Modal::upgrade(&weak) {
                    modal.run_secondary();
                }
            });
        }
    }

    /// Run the primary handler with its button disabled until it settles.
    fn run_primary(&self) {
        let inner = &self.inner;
        let (Some(button), Some(action)) = (inner.primary_button, inner.primary_action.as_ref())
        else {
            return;
        };
        let dom = inner.dom();
        let weak_dom = dom.downgrade();
        let weak = self.downgrade();
        let settled = move || Modal::upgrade(&weak).is_some_and(|modal| modal.is_disabled());
        let Some(busy) = BusyGuard::acquire(weak_dom.clone(), button, settled) else {
            return;
        };
        let future = action.call();
        dom.spawn_local(async move {
            let _busy = busy;
            if let Err(err) = future.await {
                if let Some(dom) = weak_dom.upgrade() {
                    dom.report_error(err);
                }
            }
        });
        dom.run_until_stalled();
    }

    /// Run the secondary handler, then close.
    fn run_secondary(&self) {
        let inner = &self.inner;
        if let Some(action) = inner.secondary_action.as_ref() {
            let dom = inner.dom();
            let weak_dom = dom.downgrade();
            let future = action.call();
            dom.spawn_local(async move {
                if let Err(err) = future.await {
                    if let Some(dom) = weak_dom.upgrade() {
                        dom.report_error(err);
                    }
                }
            });
            dom.run_until_stalled();
        }
        self.close();
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner.is_open.get()
    }

    /// The dialog box inside the backdrop.
    #[must_use]
    pub fn dialog(&self) -> NodeId {
        self.inner.dialog
    }

    /// Container for caller-supplied content.
    #[must_use]
    pub fn body(&self) -> NodeId {
        self.inner.body
    }

    #[must_use]
    pub fn primary_button(&self) -> Option<NodeId> {
        self.inner.primary_button
    }

    #[must_use]
    pub fn secondary_button(&self) -> Option<NodeId> {
        self.inner.secondary_button
    }

    pub fn set_title(&self, title: impl Into<String>) {
        if self.inner.base.guard_destroyed("set_title") {
            return;
        }
        self.inner.dom().set_text(self.inner.title, title);
    }

    pub fn set_body(&self, body: impl Into<String>) {
        if self.inner.base.guard_destroyed("set_body") {
            return;
        }
        self.inner.dom().set_text(self.inner.body, body);
    }

    /// Show the dialog, trap focus inside it, and emit `Open`.
    pub fn open(&self) {
        let inner = &self.inner;
        if inner.base.guard_destroyed("open") || inner.is_open.get() {
            return;
        }
        let dom = inner.dom();
        let backdrop = inner.base.element();
        inner.is_open.set(true);
        if !dom.is_connected(backdrop) {
            inner.base.mount(dom.body());
        }
        dom.set_style(backdrop, "display", "flex");
        dom.remove_attribute(backdrop, "aria-hidden");
        inner.previous_active.set(dom.active_element());

        if inner.close_on_escape {
            let weak = self.downgrade();
            let guard = dom.add_listener(dom.document(), EventType::KeyDown, move |event| {
                if !event.key().is_some_and(|key| key.is_escape()) {
                    return;
                }
                if let Some(modal) = Modal::upgrade(&weak) {
                    modal.close();
                }
            });
            *inner.escape_guard.borrow_mut() = Some(guard);
        }

        let weak = self.downgrade();
        let timer = dom.set_timeout(inner.focus_delay, move || {
            let Some(modal) = Modal::upgrade(&weak) else {
                return;
            };
            modal.inner.focus_timer.set(None);
            if !modal.is_open() {
                return;
            }
            let dom = modal.inner.dom();
            let dialog = modal.inner.dialog;
            match dom.focusable_within(dialog).first() {
                Some(first) => {
                    dom.focus(*first);
                }
                None => {
                    dom.focus(dialog);
                }
            }
        });
        inner.focus_timer.set(Some(timer));
        *inner.trap.borrow_mut() = Some(FocusTrap::install(dom, inner.dialog));

        tracing::debug!(element = backdrop.raw(), "modal opened");
        inner.base.emit(EventName::Open, &Value::Bool(true));
    }

    /// Hide the dialog, release its listeners, restore focus, emit `Close`.
    pub fn close(&self) {
        let inner = &self.inner;
        if !inner.is_open.get() {
            return;
        }
        inner.is_open.set(false);
        let dom = inner.dom();
        let backdrop = inner.base.element();
        dom.set_style(backdrop, "display", "none");
        dom.set_attribute(backdrop, "aria-hidden", "true");
        inner.release_listeners();
        inner.cancel_focus_timer();

        let previous = inner.previous_active.take();
        match previous {
            Some(node) if dom.is_connected(node) => {
                dom.focus(node);
            }
            _ => {
                if let Some(active) = dom.active_element() {
                    if dom.contains(backdrop, active) {
                        dom.blur(active);
                    }
                }
            }
        }

        tracing::debug!(element = backdrop.raw(), "modal closed");
        inner.base.emit(EventName::Close, &Value::Bool(false));
    }
}

impl Component for Modal {
    type Value = bool;

    fn base(&self) -> &ComponentBase {
        &self.inner.base
    }

    fn get(&self) -> bool {
        self.is_open()
    }

    fn set(&self, open: bool) {
        if open {
            self.open();
        } else {
            self.close();
        }
    }

    fn set_disabled(&self, disabled: bool) {
        let inner = &self.inner;
        inner.base.set_disabled(disabled);
        let dom = inner.dom();
        for button in [inner.primary_button, inner.secondary_button].into_iter().flatten() {
            // A running action keeps its button disabled until it settles.
            let busy = dom.has_attribute(button, "aria-busy");
            dom.toggle_attribute(button, "disabled", disabled || busy);
        }
    }

    fn destroy(&self) {
        if self.inner.base.is_destroyed() {
            return;
        }
        self.close();
        self.inner.release_listeners();
        self.inner.cancel_focus_timer();
        self.inner.base.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domkit_core::{KeyCode, KeyEvent};

    fn open_modal(dom: &Dom, config: ModalConfig) -> Modal {
        let modal = Modal::new(dom, config.focus_delay(Duration::ZERO));
        modal.open();
        dom.advance(Duration::ZERO);
        modal
    }

    #[test]
    fn structure_and_aria() {
        let dom = Dom::new();
        let modal = Modal::new(&dom, ModalConfig::new("Delete file").size(ModalSize::Large));
        let dialog = modal.dialog();
        assert!(dom.has_class(dialog, "modal--large"));
        assert_eq!(dom.attribute(dialog, "role").as_deref(), Some("dialog"));
        let title = dom.query_selector_all(dialog, ".modal__title")[0];
        assert_eq!(dom.attribute(dialog, "aria-labelledby"), dom.attribute(title, "id"));
        assert_eq!(dom.text(title), "Delete file");
        assert!(dom.query_selector_all(dialog, ".modal__footer").is_empty());
        assert_eq!(dom.style(modal.element(), "display").as_deref(), Some("none"));
    }

    #[test]
    fn open_mounts_focuses_and_emits() {
        let dom = Dom::new();
        let modal = Modal::new(&dom, ModalConfig::new("Hi"));
        let opened = Rc::new(Cell::new(0));
        let o = Rc::clone(&opened);
        modal.on(EventName::Open, move |_| o.set(o.get() + 1));

        modal.open();
        assert!(modal.is_open());
        assert!(dom.is_connected(modal.element()));
        assert_eq!(dom.active_element(), None);
        dom.advance(Duration::from_millis(50));
        let close = dom.query_selector_all(modal.dialog(), ".modal__close")[0];
        assert_eq!(dom.active_element(), Some(close));
        assert_eq!(opened.get(), 1);
    }

    #[test]
    fn open_twice_registers_once() {
        let dom = Dom::new();
        let modal = open_modal(&dom, ModalConfig::new("Hi"));
        let listeners = dom.listener_count(dom.document(), EventType::KeyDown);
        modal.open();
        assert_eq!(dom.listener_count(dom.document(), EventType::KeyDown), listeners);
        assert_eq!(listeners, 2);
        modal.close();
        assert_eq!(dom.listener_count(dom.document(), EventType::KeyDown), 0);
    }

    #[test]
    fn escape_closes_unless_disabled() {
        let dom = Dom::new();
        let modal = open_modal(&dom, ModalConfig::new("Hi"));
        dom.key_down(KeyEvent::new(KeyCode::Escape));
        assert!(!modal.is_open());

        let sticky = open_modal(&dom, ModalConfig::new("Stay").close_on_escape(false));
        dom.key_down(KeyEvent::new(KeyCode::Escape));
        assert!(sticky.is_open());
        assert_eq!(dom.listener_count(dom.document(), EventType::KeyDown), 1);
    }

    #[test]
    fn backdrop_click_targets_backdrop_only() {
        let dom = Dom::new();
        let modal = open_modal(&dom, ModalConfig::new("Hi").body("text"));
        dom.click(modal.body());
        assert!(modal.is_open());
        dom.click(modal.element());
        assert!(!modal.is_open());

        let kept = open_modal(&dom, ModalConfig::new("Hi").close_on_backdrop_click(false));
        dom.click(kept.element());
        assert!(kept.is_open());
    }

    #[test]
    fn close_restores_previous_focus() {
        let dom = Dom::new();
        let trigger = dom.create_element("button");
        dom.append_child(dom.body(), trigger);
        dom.focus(trigger);

        let closed = Rc::new(Cell::new(false));
        let c = Rc::clone(&closed);
        let modal = Modal::new(&dom, ModalConfig::new("Hi").focus_delay(Duration::ZERO));
        modal.on(EventName::Close, move |v| c.set(v.as_bool() == Some(false)));
        modal.open();
        dom.advance(Duration::ZERO);
        assert_ne!(dom.active_element(), Some(trigger));

        modal.close();
        assert_eq!(dom.active_element(), Some(trigger));
        assert!(closed.get());
        assert_eq!(dom.attribute(modal.element(), "aria-hidden").as_deref(), Some("true"));
    }

    #[test]
    fn close_before_focus_delay_cancels_focus() {
        let dom = Dom::new();
        let modal = Modal::new(&dom, ModalConfig::new("Hi"));
        modal.open();
        modal.close();
        dom.advance(Duration::from_millis(100));
        assert_eq!(dom.active_element(), None);
        assert_eq!(dom.pending_timers(), 0);
    }

    #[test]
    fn primary_action_reenables_after_error() {
        let dom = Dom::new();
        let modal = open_modal(
            &dom,
            ModalConfig::new("Save").primary_action(ModalAction::sync("Save", || {
                Err("disk full".into())
            })),
        );
        let Some(button) = modal.primary_button() else {
            panic!("primary button rendered");
        };
        dom.click(button);
        assert!(!dom.has_attribute(button, "disabled"));
        let errors = dom.take_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "disk full");
        assert!(modal.is_open());
    }

    fn pending_action_modal(dom: &Dom) -> (Modal, futures::channel::oneshot::Sender<()>) {
        let (tx, rx) = futures::channel::oneshot::channel::<()>();
        let rx = Rc::new(RefCell::new(Some(rx)));
        let modal = open_modal(
            dom,
            ModalConfig::new("Upload").primary_action(ModalAction::new("Upload", move || {
                let rx = rx.borrow_mut().take();
                async move {
                    if let Some(rx) = rx {
                        let _ = rx.await;
                    }
                    Ok(())
                }
            })),
        );
        (modal, tx)
    }

    #[test]
    fn enabling_modal_keeps_busy_button_disabled() {
        let dom = Dom::new();
        let (modal, tx) = pending_action_modal(&dom);
        let Some(button) = modal.primary_button() else {
            panic!("primary button rendered");
        };
        dom.click(button);
        assert!(dom.has_attribute(button, "disabled"));

        modal.set_disabled(false);
        assert!(dom.has_attribute(button, "disabled"));
        assert_eq!(dom.attribute(button, "aria-busy").as_deref(), Some("true"));

        assert!(tx.send(()).is_ok());
        dom.run_until_stalled();
        assert!(!dom.has_attribute(button, "disabled"));
        assert!(!dom.has_attribute(button, "aria-busy"));
    }

    #[test]
    fn settled_action_respects_modal_disabled() {
        let dom = Dom::new();
        let (modal, tx) = pending_action_modal(&dom);
        let Some(button) = modal.primary_button() else {
            panic!("primary button rendered");
        };
        dom.click(button);
        modal.set_disabled(true);

        assert!(tx.send(()).is_ok());
        dom.run_until_stalled();
        assert!(dom.has_attribute(button, "disabled"));
        assert!(!dom.has_attribute(button, "aria-busy"));

        modal.set_disabled(false);
        assert!(!dom.has_attribute(button, "disabled"));
    }

    #[test]
    fn secondary_action_runs_then_closes() {
        let dom = Dom::new();
        let ran = Rc::new(Cell::new(false));
        let r = Rc::clone(&ran);
        let modal = open_modal(
            &dom,
            ModalConfig::new("Discard?").secondary_action(ModalAction::sync("Cancel", move || {
                r.set(true);
                Ok(())
            })),
        );
        let Some(button) = modal.secondary_button() else {
            panic!("secondary button rendered");
        };
        dom.click(button);
        assert!(ran.get());
        assert!(!modal.is_open());
    }

    #[test]
    fn destroy_releases_everything() {
        let dom = Dom::new();
        let modal = open_modal(&dom, ModalConfig::new("Hi"));
        modal.destroy();
        assert!(!modal.is_open());
        assert!(!dom.is_connected(modal.element()));
        assert_eq!(dom.listener_count(dom.document(), EventType::KeyDown), 0);
        modal.open();
        assert!(!modal.is_open());
    }

    #[test]
    fn set_title_and_value() {
        let dom = Dom::new();
        let modal = Modal::new(&dom, ModalConfig::new("Old").focus_delay(Duration::ZERO));
        modal.set_title("New");
        let title = dom.query_selector_all(modal.dialog(), ".modal__title")[0];
        assert_eq!(dom.text(title), "New");
        modal.set(true);
        assert!(modal.get());
        modal.set(false);
        assert!(!modal.get());
    }
}
