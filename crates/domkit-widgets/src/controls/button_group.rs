#![forbid(unsafe_code)]

//! Row of related buttons, optionally acting as a selection.
//!
//! A group is *selectable* when it is segmented or allows multiple
//! selection. Selectable groups keep their selection (in option order) in
//! the component's scratch state under [`SELECTION_KEY`] and emit
//! `Change(List)`; plain groups emit `Click(Text)` and keep nothing.

use std::rc::{Rc, Weak};

use domkit_core::Dom;

use super::ChoiceOption;
use super::button::{Button, ButtonConfig};
use crate::component::{BaseConfig, Component, ComponentBase};
use crate::value::{EventName, Value};

/// Scratch-state key holding the current selection.
pub const SELECTION_KEY: &str = "selected";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonGroupVariant {
    #[default]
    Default,
    Segmented,
}

#[derive(Debug, Clone, Default)]
pub struct ButtonGroupConfig {
    pub base: BaseConfig,
    pub options: Vec<ChoiceOption>,
    pub variant: ButtonGroupVariant,
    pub allow_multiple: bool,
    /// Initial selection for selectable groups.
    pub selected: Vec<String>,
}

impl ButtonGroupConfig {
    pub fn new<I, O>(options: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<ChoiceOption>,
    {
        Self {
            options: options.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn base(mut self, base: BaseConfig) -> Self {
        self.base = base;
        self
    }

    #[must_use]
    pub fn variant(mut self, variant: ButtonGroupVariant) -> Self {
        self.variant = variant;
        self
    }

    #[must_use]
    pub fn allow_multiple(mut self, allow: bool) -> Self {
        self.allow_multiple = allow;
        self
    }

    #[must_use]
    pub fn selected<I, S>(mut self, selected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected = selected.into_iter().map(Into::into).collect();
        self
    }
}

struct ButtonGroupInner {
    base: ComponentBase,
    options: Vec<ChoiceOption>,
    buttons: Vec<Button>,
    allow_multiple: bool,
    selectable: bool,
}

impl ButtonGroupInner {
    fn selection(&self) -> Vec<String> {
        self.base
            .state(SELECTION_KEY)
            .and_then(|v| v.as_list().map(<[String]>::to_vec))
            .unwrap_or_default()
    }

    /// Store `wanted` in option order and reflect it on the buttons.
    fn apply(&self, wanted: &[String]) -> Vec<String> {
        let mut selection: Vec<String> = self
            .options
            .iter()
            .filter(|o| wanted.contains(&o.value))
            .map(|o| o.value.clone())
            .collect();
        if !self.allow_multiple {
            selection.truncate(1);
        }
        for (option, button) in self.options.iter().zip(&self.buttons) {
            button.set_pressed(selection.contains(&option.value));
        }
        self.base
            .set_state(SELECTION_KEY, Value::List(selection.clone()));
        selection
    }

    fn clicked(&self, index: usize) {
        let Some(option) = self.options.get(index) else {
            return;
        };
        if !self.selectable {
            self.base
                .emit(EventName::Click, &Value::Text(option.value.clone()));
            return;
        }
        let mut wanted = self.selection();
        if self.allow_multiple {
            if let Some(pos) = wanted.iter().position(|v| *v == option.value) {
                wanted.remove(pos);
            } else {
                wanted.push(option.value.clone());
            }
        } else {
            wanted = vec![option.value.clone()];
        }
        let selection = self.apply(&wanted);
        self.base.emit(EventName::Change, &Value::List(selection));
    }
}

/// Group of buttons. See the module docs for selection semantics.
#[derive(Clone)]
pub struct ButtonGroup {
    inner: Rc<ButtonGroupInner>,
}

impl std::fmt::Debug for ButtonGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ButtonGroup")
            .field("options", &self.inner.options.len())
            .field("selection", &self.inner.selection())
            .finish()
    }
}

impl ButtonGroup {
    pub fn new(dom: &Dom, config: ButtonGroupConfig) -> Self {
        let base = ComponentBase::new(dom, "button-group", &config.base, |dom| {
            let root = dom.create_element("div");
            dom.add_class(root, "button-group");
            root
        });
        let root = base.element();
        dom.set_attribute(root, "role", "group");
        let segmented = config.variant == ButtonGroupVariant::Segmented;
        if segmented {
            dom.add_class(root, "button-group--segmented");
        }
        let selectable = segmented || config.allow_multiple;

        let buttons: Vec<Button> = config
            .options
            .iter()
            .map(|option| {
                let mut button_config = ButtonConfig::new(option.label.clone());
                if selectable {
                    button_config = button_config.pressed(false);
                }
                let button = Button::new(dom, button_config);
                dom.set_attribute(button.element(), "data-value", option.value.clone());
                if option.disabled {
                    button.set_disabled(true);
                }
                button.mount(root);
                button
            })
            .collect();

        let inner = Rc::new(ButtonGroupInner {
            base,
            options: config.options,
            buttons,
            allow_multiple: config.allow_multiple,
            selectable,
        });
        if selectable {
            inner.apply(&config.selected);
        }
        for (index, button) in inner.buttons.iter().enumerate() {
            let weak: Weak<ButtonGroupInner> = Rc::downgrade(&inner);
            button.on(EventName::Click, move |_| {
                if let Some(inner) = weak.upgrade() {
                    inner.clicked(index);
                }
            });
        }
        Self { inner }
    }

    #[must_use]
    pub fn buttons(&self) -> &[Button] {
        &self.inner.buttons
    }

    #[must_use]
    pub fn is_selectable(&self) -> bool {
        self.inner.selectable
    }
}

impl Component for ButtonGroup {
    type Value = Vec<String>;

    fn base(&self) -> &ComponentBase {
        &self.inner.base
    }

    /// Current selection in option order; always empty for plain groups.
    fn get(&self) -> Vec<String> {
        self.inner.selection()
    }

    /// Replace the selection. Unknown values are dropped; single-select
    /// groups keep the first match. Emits nothing.
    fn set(&self, values: Vec<String>) {
        if self.inner.base.guard_destroyed("set") || !self.inner.selectable {
            return;
        }
        self.inner.apply(&values);
    }

    fn set_disabled(&self, disabled: bool) {
        self.inner.base.set_disabled(disabled);
        for (button, option) in self.inner.buttons.iter().zip(&self.inner.options) {
            button.set_disabled(disabled || option.disabled);
        }
    }

    fn destroy(&self) {
        for button in &self.inner.buttons {
            button.destroy();
        }
        self.inner.base.destroy();
    }
}
