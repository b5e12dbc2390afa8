#![forbid(unsafe_code)]

use std::rc::{Rc, Weak};

use domkit_core::{Dom, EventType, NodeId};

use super::checkbox::forward_focus;
use crate::component::{BaseConfig, Component, ComponentBase};
use crate::value::{EventName, Value};

#[derive(Debug, Clone, Default)]
pub struct RadioConfig {
    pub base: BaseConfig,
    /// Group name shared by mutually exclusive radios.
    pub name: String,
    pub value: String,
    pub label: String,
    pub checked: bool,
}

impl RadioConfig {
    pub fn new(name: impl Into<String>, value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            label: label.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn base(mut self, base: BaseConfig) -> Self {
        self.base = base;
        self
    }

    #[must_use]
    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }
}

struct RadioInner {
    base: ComponentBase,
    input: NodeId,
    value: String,
}

/// Single radio button. Emits `Change(Text(value))` and `Check` when the user
/// selects it.
#[derive(Clone)]
pub struct Radio {
    inner: Rc<RadioInner>,
}

impl std::fmt::Debug for Radio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Radio")
            .field("value", &self.inner.value)
            .field("checked", &self.is_checked())
            .finish()
    }
}

impl Radio {
    pub fn new(dom: &Dom, config: RadioConfig) -> Self {
        let base = ComponentBase::new(dom, "radio", &config.base, |dom| {
            let root = dom.create_element("label");
            dom.add_class(root, "radio");
            root
        });
        let root = base.element();
        let input = dom.create_element("input");
        dom.set_attribute(input, "type", "radio");
        dom.set_attribute(input, "name", config.name);
        dom.set_attribute(input, "value", config.value.clone());
        dom.set_value(input, config.value.clone());
        dom.add_class(input, "radio__input");
        dom.set_checked(input, config.checked);
        dom.append_child(root, input);
        let label = dom.create_element("span");
        dom.add_class(label, "radio__label");
        dom.set_text(label, config.label);
        dom.append_child(root, label);

        let inner = Rc::new(RadioInner {
            base,
            input,
            value: config.value,
        });
        let weak: Weak<RadioInner> = Rc::downgrade(&inner);
        inner.base.listen(input, EventType::Change, move |_| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if inner.base.dom().is_checked(inner.input) {
                let value = Value::Text(inner.value.clone());
                inner.base.emit(EventName::Change, &value);
                inner.base.emit(EventName::Check, &value);
            }
        });
        forward_focus(&inner.base, input);
        Self { inner }
    }

    #[must_use]
    pub fn input(&self) -> NodeId {
        self.inner.input
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.inner.value
    }

    #[must_use]
    pub fn is_checked(&self) -> bool {
        self.inner.base.dom().is_checked(self.inner.input)
    }
}

impl Component for Radio {
    type Value = bool;

    fn base(&self) -> &ComponentBase {
        &self.inner.base
    }

    fn get(&self) -> bool {
        self.is_checked()
    }

    /// Programmatic update of this radio only; peers are left alone.
    fn set(&self, checked: bool) {
        if self.inner.base.guard_destroyed("set") {
            return;
        }
        self.inner.base.dom().set_checked(self.inner.input, checked);
    }

    fn set_disabled(&self, disabled: bool) {
        self.inner.base.set_disabled(disabled);
        self.inner
            .base
            .dom()
            .toggle_attribute(self.inner.input, "disabled", disabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn selecting_emits_value_once() {
        let dom = Dom::new();
        let small = Radio::new(&dom, RadioConfig::new("size", "s", "Small"));
        let large = Radio::new(&dom, RadioConfig::new("size", "l", "Large"));
        small.mount(dom.body());
        large.mount(dom.body());

        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        large.on(EventName::Change, move |v| s.borrow_mut().push(v.clone()));
        dom.click(small.input());
        dom.click(large.input());
        assert!(!small.is_checked());
        assert!(large.is_checked());
        assert_eq!(*seen.borrow(), vec![Value::from("l")]);
        assert_eq!(large.value(), "l");
    }
}
