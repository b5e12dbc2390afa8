#![forbid(unsafe_code)]

//! Form controls built on [`ComponentBase`](crate::component::ComponentBase).
//!
//! Each control assembles its native nodes, forwards native events as
//! framework events, and propagates the disabled state to its native
//! interactive elements.

mod button;
mod button_group;
mod checkbox;
mod radio;
mod radio_group;
mod select;
mod text_field;

pub use button::{Button, ButtonConfig, ButtonVariant};
pub use button_group::{ButtonGroup, ButtonGroupConfig, ButtonGroupVariant};
pub use checkbox::{Checkbox, CheckboxConfig};
pub use radio::{Radio, RadioConfig};
pub use radio_group::{RadioGroup, RadioGroupConfig};
pub use select::{Select, SelectConfig};
pub use text_field::{TextField, TextFieldConfig};

/// One choice in a group or select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
    pub disabled: bool,
}

impl ChoiceOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            disabled: false,
        }
    }

    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// An option whose label is its value.
impl From<&str> for ChoiceOption {
    fn from(value: &str) -> Self {
        Self::new(value, value)
    }
}

impl From<(&str, &str)> for ChoiceOption {
    fn from((value, label): (&str, &str)) -> Self {
        Self::new(value, label)
    }
}
