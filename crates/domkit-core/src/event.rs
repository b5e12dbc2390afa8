#![forbid(unsafe_code)]

//! Canonical native event types.
//!
//! These are the events the host document delivers to listeners registered
//! with [`Dom::add_listener`](crate::dom::Dom::add_listener). Components
//! translate them into framework-level events of their own.
//!
//! # Design Notes
//!
//! - `KeyEventKind` defaults to `Press`; the host only dispatches presses.
//! - `Modifiers` use bitflags for easy combination.
//! - `KeyCode::BackTab` is treated exactly like `Shift+Tab`.

use std::cell::Cell;

use bitflags::bitflags;

use crate::dom::NodeId;

/// Native event types a listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Pointer activation of an element.
    Click,
    /// Committed value change of a form control.
    Change,
    /// Live value edit of a text control.
    Input,
    /// Element received focus.
    Focus,
    /// Element lost focus.
    Blur,
    /// A key was pressed while the target had focus.
    KeyDown,
}

impl EventType {
    /// Lowercase DOM name of the event.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Change => "change",
            Self::Input => "input",
            Self::Focus => "focus",
            Self::Blur => "blur",
            Self::KeyDown => "keydown",
        }
    }
}

/// A native event as seen by a listener.
///
/// `current_target` changes as the event bubbles from `target` towards the
/// document root. The only mutable part is the default-prevented flag.
#[derive(Debug)]
pub struct DomEvent {
    event_type: EventType,
    target: NodeId,
    current_target: Cell<NodeId>,
    key: Option<KeyEvent>,
    default_prevented: Cell<bool>,
}

impl DomEvent {
    /// Create an event of the given type aimed at `target`.
    #[must_use]
    pub fn new(event_type: EventType, target: NodeId) -> Self {
        Self {
            event_type,
            target,
            current_target: Cell::new(target),
            key: None,
            default_prevented: Cell::new(false),
        }
    }

    /// Create a `keydown` event aimed at `target`.
    #[must_use]
    pub fn key_down(target: NodeId, key: KeyEvent) -> Self {
        Self {
            key: Some(key),
            ..Self::new(EventType::KeyDown, target)
        }
    }

    #[must_use]
    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    /// The node the event was dispatched at.
    #[must_use]
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// The node whose listener is currently running.
    #[must_use]
    pub fn current_target(&self) -> NodeId {
        self.current_target.get()
    }

    pub(crate) fn set_current_target(&self, node: NodeId) {
        self.current_target.set(node);
    }

    /// Key payload for `keydown` events.
    #[must_use]
    pub fn key(&self) -> Option<&KeyEvent> {
        self.key.as_ref()
    }

    /// Suppress the host's default action for this event.
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event with default modifiers and Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Check if this is a specific character key.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        matches!(self.code, KeyCode::Char(ch) if ch == c)
    }

    /// Check if Ctrl modifier is held.
    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// Check if Alt modifier is held.
    #[must_use]
    pub const fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    /// Check if Shift modifier is held.
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    /// Tab or Shift+Tab pressed (not released), in either spelling.
    #[must_use]
    pub const fn is_tab(&self) -> bool {
        matches!(self.code, KeyCode::Tab | KeyCode::BackTab)
            && !matches!(self.kind, KeyEventKind::Release)
    }

    /// Backwards tab navigation (`BackTab`, or `Tab` with Shift held).
    #[must_use]
    pub const fn is_back_tab(&self) -> bool {
        match self.code {
            KeyCode::BackTab => true,
            KeyCode::Tab => self.shift(),
            _ => false,
        }
    }

    /// Escape pressed (not released).
    #[must_use]
    pub fn is_escape(&self) -> bool {
        self.code == KeyCode::Escape && self.kind != KeyEventKind::Release
    }
}

/// Key codes for keyboard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key.
    Char(char),

    /// Enter/Return key.
    Enter,

    /// Escape key.
    Escape,

    /// Backspace key.
    Backspace,

    /// Tab key.
    Tab,

    /// Shift+Tab (back-tab).
    BackTab,

    /// Delete key.
    Delete,

    /// Home key.
    Home,

    /// End key.
    End,

    /// Up arrow key.
    Up,

    /// Down arrow key.
    Down,

    /// Left arrow key.
    Left,

    /// Right arrow key.
    Right,

    /// Space bar.
    Space,
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed (default when not distinguishable).
    #[default]
    Press,

    /// Key is being held (repeat event).
    Repeat,

    /// Key was released.
    Release,
}

bitflags! {
    /// Modifier keys that can be held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}
