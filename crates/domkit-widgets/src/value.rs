#![forbid(unsafe_code)]

//! Framework-level event names and payload values.

/// Payload carried by framework events and stored in component scratch state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    /// No payload.
    #[default]
    None,
    /// A single string (text input, selected option, button label).
    Text(String),
    /// A boolean (checkbox state, dialog open state).
    Bool(bool),
    /// An ordered list of strings (multi-selection).
    List(Vec<String>),
}

impl Value {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(list) => Some(list),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Vec<String>> for Value {
    fn from(list: Vec<String>) -> Self {
        Self::List(list)
    }
}

/// Framework events a caller can subscribe to with `on`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    /// Committed value change.
    Change,
    /// Live edit of a text value.
    Input,
    /// Activation of a button-like component.
    Click,
    /// A checkbox or radio became checked.
    Check,
    /// A checkbox became unchecked.
    Uncheck,
    /// A dialog opened.
    Open,
    /// A dialog closed.
    Close,
    /// A toast was dismissed (timeout, user action, or eviction).
    Dismiss,
    /// The component's native control gained focus.
    Focus,
    /// The component's native control lost focus.
    Blur,
}

impl EventName {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Change => "change",
            Self::Input => "input",
            Self::Click => "click",
            Self::Check => "check",
            Self::Uncheck => "uncheck",
            Self::Open => "open",
            Self::Close => "close",
            Self::Dismiss => "dismiss",
            Self::Focus => "focus",
            Self::Blur => "blur",
        }
    }
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
