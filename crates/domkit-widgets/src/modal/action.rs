#![forbid(unsafe_code)]

//! Footer actions and the busy guard around running them.

use std::future::Future;
use std::rc::Rc;

use domkit_core::{NodeId, WeakDom};
use futures::FutureExt;
use futures::future::LocalBoxFuture;

/// Error type returned by action handlers.
pub type ActionError = Box<dyn std::error::Error + 'static>;

/// Handler run when an action button is clicked.
pub type ActionHandler = Rc<dyn Fn() -> LocalBoxFuture<'static, Result<(), ActionError>>>;

/// A labelled dialog button with a possibly asynchronous handler.
#[derive(Clone)]
pub struct ModalAction {
    pub label: String,
    pub handler: ActionHandler,
}

impl ModalAction {
    /// Action whose handler returns a future.
    pub fn new<F, Fut>(label: impl Into<String>, handler: F) -> Self
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<(), ActionError>> + 'static,
    {
        Self {
            label: label.into(),
            handler: Rc::new(move || handler().boxed_local()),
        }
    }

    /// Action whose handler completes immediately.
    pub fn sync<F>(label: impl Into<String>, handler: F) -> Self
    where
        F: Fn() -> Result<(), ActionError> + 'static,
    {
        Self {
            label: label.into(),
            handler: Rc::new(move || std::future::ready(handler()).boxed_local()),
        }
    }

    pub(crate) fn call(&self) -> LocalBoxFuture<'static, Result<(), ActionError>> {
        (self.handler)()
    }
}

impl std::fmt::Debug for ModalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModalAction")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Marks a button busy for as long as the guard lives.
///
/// On drop the button's `disabled` attribute is set to what `settled`
/// reports, so an owner that disabled the button meanwhile keeps it disabled.
pub(crate) struct BusyGuard {
    dom: WeakDom,
    button: NodeId,
    settled: Box<dyn Fn() -> bool>,
}

impl BusyGuard {
    pub(crate) fn acquire(
        dom: WeakDom,
        button: NodeId,
        settled: impl Fn() -> bool + 'static,
    ) -> Option<Self> {
        let strong = dom.upgrade()?;
        if strong.has_attribute(button, "disabled") {
            return None;
        }
        strong.toggle_attribute(button, "disabled", true);
        strong.set_attribute(button, "aria-busy", "true");
        Some(Self {
            dom,
            button,
            settled: Box::new(settled),
        })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        if let Some(dom) = self.dom.upgrade() {
            dom.remove_attribute(self.button, "aria-busy");
            dom.toggle_attribute(self.button, "disabled", (self.settled)());
        }
    }
}
