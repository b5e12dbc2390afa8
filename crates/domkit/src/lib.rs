#![forbid(unsafe_code)]

//! domkit public facade crate.
//!
//! Re-exports the host document from `domkit-core` and the component
//! framework from `domkit-widgets`, and offers a [`Toolkit`] bundling a
//! document, its policy, and its toast queue.
//!
//! # Example
//!
//! ```
//! use domkit::prelude::*;
//!
//! let kit = Toolkit::new();
//! let modal = Modal::new(kit.dom(), kit.modal_config("Delete file?"));
//! modal.open();
//! assert!(modal.is_open());
//!
//! kit.toasts().success("Deleted");
//! assert_eq!(kit.toasts().len(), 1);
//! ```

use std::fmt;
use std::path::Path;

pub mod logging;

// --- Core re-exports -------------------------------------------------------

pub use domkit_core::{
    BoxError, Dom, DomEvent, EventType, KeyCode, KeyEvent, KeyEventKind, ListenerGuard, Modifiers,
    NodeId, TimerId, WeakDom,
};

// --- Widget re-exports -----------------------------------------------------

pub use domkit_widgets::{
    ActionError, BaseConfig, Button, ButtonConfig, ButtonGroup, ButtonGroupConfig,
    ButtonGroupVariant, ButtonVariant, Checkbox, CheckboxConfig, ChoiceOption, Component,
    ComponentBase, ConfigError, Emitter, EventName, Lifecycle, Listener, Modal, ModalAction,
    ModalConfig, ModalPolicy, ModalSize, MountTarget, PolicyConfig, QueueStats, Radio, RadioConfig,
    RadioGroup, RadioGroupConfig, Select, SelectConfig, Subscription, TextField, TextFieldConfig,
    Toast, ToastAction, ToastId, ToastOptions, ToastPhase, ToastPolicy, ToastQueue, ToastVariant,
    Value,
};

pub use domkit_core as core;
pub use domkit_widgets as widgets;

// --- Errors ---------------------------------------------------------------

/// Top-level error type for domkit apps.
#[derive(Debug)]
pub enum Error {
    /// Policy could not be loaded or failed validation.
    Config(ConfigError),
    /// A user action handler failed.
    Action(ActionError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "configuration: {err}"),
            Self::Action(err) => write!(f, "action failed: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Action(err) => Some(&**err),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<ActionError> for Error {
    fn from(err: ActionError) -> Self {
        Self::Action(err)
    }
}

/// Standard result type for domkit APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Toolkit --------------------------------------------------------------

/// A document plus the policy and toast queue that go with it.
#[derive(Debug, Clone)]
pub struct Toolkit {
    dom: Dom,
    policy: PolicyConfig,
    toasts: ToastQueue,
}

impl Default for Toolkit {
    fn default() -> Self {
        Self::new()
    }
}

impl Toolkit {
    /// Fresh document with the default policy.
    #[must_use]
    pub fn new() -> Self {
        Self::build(Dom::new(), PolicyConfig::default())
    }

    /// Fresh document with a validated policy.
    pub fn with_policy(policy: PolicyConfig) -> Result<Self> {
        Ok(Self::build(Dom::new(), policy.validated()?))
    }

    /// Load and validate a TOML policy file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_policy(PolicyConfig::from_toml_file(path)?)
    }

    /// Load and validate a JSON policy file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_policy(PolicyConfig::from_json_file(path)?)
    }

    fn build(dom: Dom, policy: PolicyConfig) -> Self {
        let toasts = ToastQueue::new(&dom, policy.toast.clone());
        Self { dom, policy, toasts }
    }

    #[must_use]
    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    #[must_use]
    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    #[must_use]
    pub fn toasts(&self) -> &ToastQueue {
        &self.toasts
    }

    /// Dialog configuration seeded from this toolkit's modal policy.
    #[must_use]
    pub fn modal_config(&self, title: impl Into<String>) -> ModalConfig {
        ModalConfig::from_policy(title, &self.policy.modal)
    }

    /// Drain the unhandled-error channel as facade errors.
    pub fn take_errors(&self) -> Vec<Error> {
        self.dom.take_errors().into_iter().map(Error::Action).collect()
    }
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        BaseConfig, Button, ButtonConfig, ButtonGroup, ButtonGroupConfig, ButtonGroupVariant,
        Checkbox, CheckboxConfig, ChoiceOption, Component, Dom, Error, EventName, EventType,
        KeyCode, KeyEvent, Modal, ModalAction, ModalConfig, Modifiers, NodeId, PolicyConfig,
        RadioGroup, RadioGroupConfig, Result, Select, SelectConfig, TextField, TextFieldConfig,
        Toast, ToastOptions, ToastQueue, ToastVariant, Toolkit, Value,
    };

    pub use crate::{core, widgets};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_policy_is_rejected() {
        let mut policy = PolicyConfig::default();
        policy.toast.max_visible = 0;
        let err = Toolkit::with_policy(policy).expect_err("zero capacity");
        assert!(matches!(err, Error::Config(ConfigError::Validation(_))));
        assert!(err.to_string().contains("max_visible"));
    }

    #[test]
    fn modal_config_follows_policy() {
        let mut policy = PolicyConfig::default();
        policy.modal.close_on_escape = false;
        let kit = Toolkit::with_policy(policy).expect("valid");
        let config = kit.modal_config("Hi");
        assert!(!config.close_on_escape);
        assert!(config.close_on_backdrop_click);
    }

    #[test]
    fn action_errors_surface_as_facade_errors() {
        let kit = Toolkit::new();
        kit.dom().report_error("boom".into());
        let errors = kit.take_errors();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], Error::Action(_)));
        assert!(std::error::Error::source(&errors[0]).is_some());
    }
}
