#![forbid(unsafe_code)]

//! Tab confinement for an open dialog.
//!
//! # Invariants
//!
//! 1. **Recomputed per keypress**: the focusable set is queried on every Tab,
//!    so elements added or disabled while open are honored.
//! 2. **Wrap at the edges**: Tab on the last element moves to the first;
//!    Shift+Tab on the first moves to the last.
//! 3. **Edges only**: focus outside the root is left to the host, so stacked
//!    traps (a confirm opened from a dialog) each act only on their own
//!    elements.
//! 4. **Scoped**: the document listener lives exactly as long as the
//!    [`FocusTrap`] value.
//!
//! # Failure Modes
//!
//! - A root with no focusable descendants lets Tab escape (graceful
//!   degradation).

use domkit_core::{Dom, EventType, ListenerGuard, NodeId};

/// Where Tab should land instead of the default, or `None` to let the host
/// move focus normally.
#[must_use]
pub fn trap_target(focusables: &[NodeId], active: Option<NodeId>, backwards: bool) -> Option<NodeId> {
    let first = *focusables.first()?;
    let last = *focusables.last()?;
    let position = focusables.iter().position(|id| Some(*id) == active)?;
    match (position, backwards) {
        (i, false) if i + 1 == focusables.len() => Some(first),
        (0, true) => Some(last),
        _ => None,
    }
}

/// Active focus trap on `root`. Dropping it releases the trap.
#[must_use = "dropping the trap releases it immediately"]
#[derive(Debug)]
pub struct FocusTrap {
    root: NodeId,
    _guard: ListenerGuard,
}

impl FocusTrap {
    pub fn install(dom: &Dom, root: NodeId) -> Self {
        let weak = dom.downgrade();
        let guard = dom.add_listener(dom.document(), EventType::KeyDown, move |event| {
            let Some(key) = event.key() else {
                return;
            };
            if !key.is_tab() {
                return;
            }
            let Some(dom) = weak.upgrade() else {
                return;
            };
            let focusables = dom.focusable_within(root);
            if let Some(target) = trap_target(&focusables, dom.active_element(), key.is_back_tab()) {
                event.prevent_default();
                dom.focus(target);
            }
        });
        Self {
            root,
            _guard: guard,
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }
}
