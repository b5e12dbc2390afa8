#![forbid(unsafe_code)]

//! Component framework for domkit.
//!
//! # Role in domkit
//! `domkit-widgets` turns the raw host document of `domkit-core` into
//! stateful components: every widget owns one element, translates native
//! events into framework events, and exposes an imperative API.
//!
//! # Primary responsibilities
//! - **Emitter**: per-component named-event publish/subscribe.
//! - **ComponentBase / Component**: lifecycle, disabled state, scratch state.
//! - **Modal**: open/close state machine with a focus trap and restoration.
//! - **ToastQueue**: bounded FIFO of auto-dismissing notifications.
//! - **Controls**: buttons, checkboxes, radios, groups, text fields, selects.
//! - **PolicyConfig**: timing and capacity parameters, loadable from TOML/JSON.

pub mod component;
pub mod config;
pub mod controls;
pub mod emitter;
pub mod modal;
pub mod toast;
pub mod value;

pub use component::{BaseConfig, Component, ComponentBase, Lifecycle, MountTarget};
pub use config::{ConfigError, ModalPolicy, PolicyConfig, ToastPolicy};
pub use controls::{
    Button, ButtonConfig, ButtonGroup, ButtonGroupConfig, ButtonGroupVariant, ButtonVariant,
    Checkbox, CheckboxConfig, ChoiceOption, Radio, RadioConfig, RadioGroup, RadioGroupConfig,
    Select, SelectConfig, TextField, TextFieldConfig,
};
pub use emitter::{Emitter, Listener, Subscription};
pub use modal::{ActionError, Modal, ModalAction, ModalConfig, ModalSize};
pub use toast::{
    QueueStats, Toast, ToastAction, ToastId, ToastOptions, ToastPhase, ToastQueue, ToastVariant,
};
pub use value::{EventName, Value};
