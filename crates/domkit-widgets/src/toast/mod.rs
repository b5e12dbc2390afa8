#![forbid(unsafe_code)]

//! Transient notifications with timed auto-dismiss.
//!
//! A [`Toast`] is one notification; [`ToastQueue`] bounds how many are live
//! at once and owns the shared container they are mounted into.
//!
//! # Phases
//!
//! ```text
//!   Created ──show──► Visible ──hide──► Hidden ──settle──► Removed
//!                        ▲                 │
//!                        └──────show───────┘
//! ```
//!
//! # Invariants
//!
//! 1. At most one auto-hide timer is pending per toast; `hide` cancels it.
//! 2. The settle timer only detaches the node if the toast is still hidden
//!    when it fires, so a `show` racing the delayed unmount wins.
//! 3. `Dismiss` is emitted at most once per toast.

mod queue;

pub use queue::{QueueStats, ToastQueue};

use std::cell::Cell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use domkit_core::{Dom, EventType, NodeId, TimerId};

use crate::component::{BaseConfig, Component, ComponentBase};
use crate::config::ToastPolicy;
use crate::value::{EventName, Value};

/// Class present while a toast is shown.
pub const VISIBLE_CLASS: &str = "toast--visible";

static TOAST_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastId(u64);

impl ToastId {
    fn next() -> Self {
        Self(TOAST_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Visual and semantic flavor of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToastVariant {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl ToastVariant {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    /// ARIA role: errors interrupt, everything else is polite.
    #[must_use]
    pub const fn role(self) -> &'static str {
        match self {
            Self::Error => "alert",
            _ => "status",
        }
    }
}

/// Lifecycle phase of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPhase {
    Created,
    Visible,
    Hidden,
    Removed,
}

/// Inline action button on a toast. Clicking runs the handler, then dismisses.
#[derive(Clone)]
pub struct ToastAction {
    pub label: String,
    pub handler: Rc<dyn Fn()>,
}

impl ToastAction {
    pub fn new(label: impl Into<String>, handler: impl Fn() + 'static) -> Self {
        Self {
            label: label.into(),
            handler: Rc::new(handler),
        }
    }
}

impl std::fmt::Debug for ToastAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToastAction")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Construction options for a toast.
#[derive(Debug, Clone)]
pub struct ToastOptions {
    pub base: BaseConfig,
    pub message: String,
    pub title: Option<String>,
    pub variant: ToastVariant,
    /// Auto-hide delay. `None` uses the variant default; zero never hides.
    pub duration: Option<Duration>,
    /// Render a close button.
    pub dismissible: bool,
    pub action: Option<ToastAction>,
    /// Render a progress bar that drains over `duration`.
    pub show_progress: bool,
}

impl ToastOptions {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            base: BaseConfig::default(),
            message: message.into(),
            title: None,
            variant: ToastVariant::default(),
            duration: None,
            dismissible: true,
            action: None,
            show_progress: true,
        }
    }

    #[must_use]
    pub fn base(mut self, base: BaseConfig) -> Self {
        self.base = base;
        self
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn variant(mut self, variant: ToastVariant) -> Self {
        self.variant = variant;
        self
    }

    #[must_use]
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Never auto-hide.
    #[must_use]
    pub fn sticky(self) -> Self {
        self.duration(Duration::ZERO)
    }

    #[must_use]
    pub fn dismissible(mut self, dismissible: bool) -> Self {
        self.dismissible = dismissible;
        self
    }

    #[must_use]
    pub fn action(mut self, action: ToastAction) -> Self {
        self.action = Some(action);
        self
    }

    #[must_use]
    pub fn show_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}

impl From<&str> for ToastOptions {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ToastOptions {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

struct ToastInner {
    base: ComponentBase,
    id: ToastId,
    variant: ToastVariant,
    duration: Duration,
    settle_delay: Duration,
    message: NodeId,
    progress: Option<NodeId>,
    phase: Cell<ToastPhase>,
    hide_timer: Cell<Option<TimerId>>,
    settle_timer: Cell<Option<TimerId>>,
    dismissed: Cell<bool>,
}

impl ToastInner {
    fn dom(&self) -> &Dom {
        self.base.dom()
    }

    fn cancel_hide_timer(&self) {
        if let Some(timer) = self.hide_timer.take() {
            self.dom().clear_timeout(timer);
        }
    }

    fn cancel_settle_timer(&self) {
        if let Some(timer) = self.settle_timer.take() {
            self.dom().clear_timeout(timer);
        }
    }
}

/// A single notification. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Toast {
    inner: Rc<ToastInner>,
}

impl std::fmt::Debug for Toast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Toast")
            .field("id", &self.inner.id)
            .field("variant", &self.inner.variant)
            .field("phase", &self.inner.phase.get())
            .finish()
    }
}

impl Toast {
    /// Build a detached toast. Durations and progress defaults come from
    /// `policy`.
    pub fn new(dom: &Dom, options: ToastOptions, policy: &ToastPolicy) -> Self {
        let variant = options.variant;
        let duration = options
            .duration
            .unwrap_or_else(|| policy.duration_for(variant));
        let show_progress = options.show_progress && policy.show_progress && !duration.is_zero();

        let base = ComponentBase::new(dom, "toast", &options.base, |dom| {
            let root = dom.create_element("div");
            dom.add_class(root, "toast");
            root
        });
        let root = base.element();
        dom.add_class(root, &format!("toast--{}", variant.as_str()));
        dom.set_attribute(root, "role", variant.role());
        dom.set_attribute(root, "aria-atomic", "true");

        if let Some(title) = &options.title {
            let node = dom.create_element("div");
            dom.add_class(node, "toast__title");
            dom.set_text(node, title.clone());
            dom.append_child(root, node);
        }
        let message = dom.create_element("div");
        dom.add_class(message, "toast__message");
        dom.set_text(message, options.message.clone());
        dom.append_child(root, message);

        let action_button = options.action.as_ref().map(|action| {
            let node = dom.create_element("button");
            dom.set_attribute(node, "type", "button");
            dom.add_class(node, "toast__action");
            dom.set_text(node, action.label.clone());
            dom.append_child(root, node);
            node
        });
        let close_button = options.dismissible.then(|| {
            let node = dom.create_element("button");
            dom.set_attribute(node, "type", "button");
            dom.set_attribute(node, "aria-label", "Dismiss");
            dom.add_class(node, "toast__close");
            dom.set_text(node, "\u{d7}");
            dom.append_child(root, node);
            node
        });
        let progress = show_progress.then(|| {
            let node = dom.create_element("div");
            dom.add_class(node, "toast__progress");
            dom.append_child(root, node);
            node
        });

        let inner = Rc::new(ToastInner {
            base,
            id: ToastId::next(),
            variant,
            duration,
            settle_delay: policy.settle_delay(),
            message,
            progress,
            phase: Cell::new(ToastPhase::Created),
            hide_timer: Cell::new(None),
            settle_timer: Cell::new(None),
            dismissed: Cell::new(false),
        });
        let toast = Self { inner };

        if let Some(node) = close_button {
            let weak = toast.downgrade();
            toast.inner.base.listen(node, EventType::Click, move |_| {
                if let Some(toast) = Toast::upgrade(&weak) {
                    toast.dismiss();
                }
            });
        }
        if let (Some(node), Some(action)) = (action_button, options.action) {
            let weak = toast.downgrade();
            toast.inner.base.listen(node, EventType::Click, move |_| {
                (action.handler)();
                if let Some(toast) = Toast::upgrade(&weak) {
                    toast.dismiss();
                }
            });
        }
        toast
    }

    fn downgrade(&self) -> Weak<ToastInner> {
        Rc::downgrade(&self.inner)
    }

    fn upgrade(weak: &Weak<ToastInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    #[must_use]
    pub fn id(&self) -> ToastId {
        self.inner.id
    }

    #[must_use]
    pub fn variant(&self) -> ToastVariant {
        self.inner.variant
    }

    /// Effective auto-hide delay; zero means sticky.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.inner.duration
    }

    #[must_use]
    pub fn phase(&self) -> ToastPhase {
        self.inner.phase.get()
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.inner.phase.get() == ToastPhase::Visible
    }

    #[must_use]
    pub fn is_dismissed(&self) -> bool {
        self.inner.dismissed.get()
    }

    #[must_use]
    pub fn message(&self) -> String {
        self.inner.dom().text(self.inner.message)
    }

    /// Make the toast visible and arm the auto-hide timer.
    pub fn show(&self) {
        let inner = &self.inner;
        if inner.base.guard_destroyed("show") || self.is_visible() {
            return;
        }
        inner.cancel_settle_timer();
        inner.phase.set(ToastPhase::Visible);
        let dom = inner.dom();
        dom.add_class(inner.base.element(), VISIBLE_CLASS);

        if !inner.duration.is_zero() {
            let weak = self.downgrade();
            let timer = dom.set_timeout(inner.duration, move || {
                if let Some(toast) = Toast::upgrade(&weak) {
                    toast.inner.hide_timer.set(None);
                    tracing::debug!(toast = toast.id().raw(), "toast expired");
                    toast.dismiss();
                }
            });
            inner.hide_timer.set(Some(timer));
            if let Some(progress) = inner.progress {
                let ms = inner.duration.as_millis();
                dom.set_style(progress, "transition", format!("width {ms}ms linear"));
                dom.set_style(progress, "width", "0%");
            }
        }
        tracing::debug!(toast = inner.id.raw(), variant = inner.variant.as_str(), "toast shown");
    }

    /// Start hiding; the node is detached once the settle delay passes.
    pub fn hide(&self) {
        let inner = &self.inner;
        if inner.base.is_destroyed() || !self.is_visible() {
            return;
        }
        inner.cancel_hide_timer();
        inner.phase.set(ToastPhase::Hidden);
        let dom = inner.dom();
        dom.remove_class(inner.base.element(), VISIBLE_CLASS);
        if let Some(progress) = inner.progress {
            dom.remove_style(progress, "transition");
            dom.set_style(progress, "width", "100%");
        }

        let weak = self.downgrade();
        let timer = dom.set_timeout(inner.settle_delay, move || {
            let Some(toast) = Toast::upgrade(&weak) else {
                return;
            };
            toast.inner.settle_timer.set(None);
            if toast.phase() == ToastPhase::Hidden {
                toast.inner.base.unmount();
                toast.inner.phase.set(ToastPhase::Removed);
            }
        });
        inner.settle_timer.set(Some(timer));
        tracing::debug!(toast = inner.id.raw(), "toast hidden");
    }

    /// Hide and emit `Dismiss` (once).
    pub fn dismiss(&self) {
        let inner = &self.inner;
        if inner.base.is_destroyed() {
            return;
        }
        if self.phase() == ToastPhase::Created {
            inner.base.unmount();
            inner.phase.set(ToastPhase::Removed);
        } else {
            self.hide();
        }
        if !inner.dismissed.replace(true) {
            inner.base.emit(EventName::Dismiss, &Value::None);
        }
    }
}

impl Component for Toast {
    type Value = bool;

    fn base(&self) -> &ComponentBase {
        &self.inner.base
    }

    fn get(&self) -> bool {
        self.is_visible()
    }

    fn set(&self, visible: bool) {
        if visible {
            self.show();
        } else {
            self.hide();
        }
    }

    fn destroy(&self) {
        let inner = &self.inner;
        if inner.base.is_destroyed() {
            return;
        }
        inner.cancel_hide_timer();
        inner.cancel_settle_timer();
        // The queue releases its slot on `Dismiss`; listeners are cleared below.
        if !inner.dismissed.replace(true) {
            inner.base.emit(EventName::Dismiss, &Value::None);
        }
        inner.base.destroy();
        self.inner.phase.set(ToastPhase::Removed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn mounted(dom: &Dom, options: ToastOptions) -> Toast {
        let toast = Toast::new(dom, options, &ToastPolicy::default());
        toast.mount(dom.body());
        toast
    }

    fn dismiss_counter(toast: &Toast) -> Rc<Cell<u32>> {
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        toast.on(EventName::Dismiss, move |_| h.set(h.get() + 1));
        hits
    }

    #[test]
    fn structure_reflects_options() {
        let dom = Dom::new();
        let toast = mounted(
            &dom,
            ToastOptions::new("Disk full")
                .title("Storage")
                .variant(ToastVariant::Error)
                .action(ToastAction::new("Retry", || {})),
        );
        let root = toast.element();
        assert!(dom.has_class(root, "toast--error"));
        assert_eq!(dom.attribute(root, "role").as_deref(), Some("alert"));
        assert_eq!(dom.query_selector_all(root, ".toast__title").len(), 1);
        assert_eq!(dom.query_selector_all(root, ".toast__action").len(), 1);
        assert_eq!(dom.query_selector_all(root, ".toast__close").len(), 1);
        assert_eq!(toast.message(), "Disk full");
        assert_eq!(toast.duration(), Duration::from_millis(7000));
    }

    #[test]
    fn info_uses_status_role() {
        let dom = Dom::new();
        let toast = mounted(&dom, ToastOptions::new("Hi").dismissible(false));
        assert_eq!(dom.attribute(toast.element(), "role").as_deref(), Some("status"));
        assert!(dom.query_selector_all(toast.element(), ".toast__close").is_empty());
    }

    #[test]
    fn auto_hide_after_duration_then_detach() {
        let dom = Dom::new();
        let toast = mounted(&dom, ToastOptions::new("Saved").duration(Duration::from_millis(5000)));
        let dismissed = dismiss_counter(&toast);
        toast.show();
        assert!(dom.has_class(toast.element(), VISIBLE_CLASS));

        dom.advance(Duration::from_millis(4999));
        assert!(toast.is_visible());
        dom.advance(Duration::from_millis(1));
        assert_eq!(toast.phase(), ToastPhase::Hidden);
        assert_eq!(dismissed.get(), 1);
        assert!(dom.is_connected(toast.element()));

        dom.advance(Duration::from_millis(300));
        assert_eq!(toast.phase(), ToastPhase::Removed);
        assert!(!dom.is_connected(toast.element()));
    }

    #[test]
    fn manual_dismiss_cancels_auto_hide() {
        let dom = Dom::new();
        let toast = mounted(&dom, ToastOptions::new("Saved").duration(Duration::from_millis(5000)));
        let dismissed = dismiss_counter(&toast);
        toast.show();

        dom.advance(Duration::from_millis(1000));
        toast.dismiss();
        toast.dismiss();
        dom.advance(Duration::from_millis(10_000));
        assert_eq!(dismissed.get(), 1);
        assert_eq!(dom.pending_timers(), 0);
    }

    #[test]
    fn show_during_settle_keeps_node() {
        let dom = Dom::new();
        let toast = mounted(&dom, ToastOptions::new("Again").sticky());
        toast.show();
        toast.hide();
        dom.advance(Duration::from_millis(100));
        toast.show();
        dom.advance(Duration::from_millis(1000));
        assert!(toast.is_visible());
        assert!(dom.is_connected(toast.element()));
    }

    #[test]
    fn sticky_toast_never_expires() {
        let dom = Dom::new();
        let toast = mounted(&dom, ToastOptions::new("Pinned").sticky());
        toast.show();
        assert_eq!(dom.pending_timers(), 0);
        assert!(dom.query_selector_all(toast.element(), ".toast__progress").is_empty());
    }

    #[test]
    fn progress_transition_matches_duration() {
        let dom = Dom::new();
        let toast = mounted(&dom, ToastOptions::new("Saving").duration(Duration::from_millis(1500)));
        toast.show();
        let progress = dom.query_selector_all(toast.element(), ".toast__progress")[0];
        assert_eq!(
            dom.style(progress, "transition").as_deref(),
            Some("width 1500ms linear")
        );
    }

    #[test]
    fn close_and_action_buttons_dismiss() {
        let dom = Dom::new();
        let ran = Rc::new(Cell::new(false));
        let r = Rc::clone(&ran);
        let toast = mounted(
            &dom,
            ToastOptions::new("Deleted").action(ToastAction::new("Undo", move || r.set(true))),
        );
        let dismissed = dismiss_counter(&toast);
        toast.show();
        let action = dom.query_selector_all(toast.element(), ".toast__action")[0];
        dom.click(action);
        assert!(ran.get());
        assert_eq!(dismissed.get(), 1);

        let other = mounted(&dom, ToastOptions::new("Closed"));
        let other_dismissed = dismiss_counter(&other);
        other.show();
        let close = dom.query_selector_all(other.element(), ".toast__close")[0];
        dom.click(close);
        assert_eq!(other_dismissed.get(), 1);
        assert!(!other.is_visible());
    }

    #[test]
    fn destroy_emits_dismiss_once() {
        let dom = Dom::new();
        let toast = mounted(&dom, ToastOptions::new("Bye"));
        let hits = dismiss_counter(&toast);
        toast.show();
        toast.destroy();
        toast.destroy();
        assert_eq!(hits.get(), 1);
        assert!(toast.is_dismissed());

        let dismissed = mounted(&dom, ToastOptions::new("Gone"));
        let hits = dismiss_counter(&dismissed);
        dismissed.dismiss();
        dismissed.destroy();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn destroy_cancels_timers() {
        let dom = Dom::new();
        let toast = mounted(&dom, ToastOptions::new("Bye"));
        toast.show();
        toast.destroy();
        assert_eq!(dom.pending_timers(), 0);
        assert!(!dom.is_connected(toast.element()));
        toast.show();
        assert!(!toast.is_visible());
    }
}
