#![forbid(unsafe_code)]

//! Core: the host document boundary for domkit.
//!
//! # Role in domkit
//! `domkit-core` is everything the component framework consumes from its
//! host: a document tree with attributes, classes, and inline style; native
//! event registration and bubbling dispatch; focus and sequential (Tab)
//! navigation; one-shot timers on a virtual clock; and a local executor for
//! asynchronous handlers.
//!
//! # Primary responsibilities
//! - **Dom**: cheap-clone handle; never holds a borrow while user callbacks run.
//! - **ListenerGuard**: RAII registration of native listeners.
//! - **Event**: native event types plus the keyboard model.
//! - **Timers**: deterministic `set_timeout`/`clear_timeout` driven by `advance`.
//!
//! # How it fits in the system
//! `domkit-widgets` builds components on top of [`dom::Dom`]. The in-memory
//! document doubles as the test host: every user interaction a browser
//! would deliver has a simulation helper (`click`, `key_down`, `input_text`).

pub mod dom;
pub mod event;
pub mod selector;
pub mod task;
pub mod timer;

pub use dom::{Dom, ListenerGuard, ListenerId, NodeId, WeakDom};
pub use event::{DomEvent, EventType, KeyCode, KeyEvent, KeyEventKind, Modifiers};
pub use task::BoxError;
pub use timer::TimerId;
