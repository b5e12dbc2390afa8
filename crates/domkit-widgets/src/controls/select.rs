#![forbid(unsafe_code)]

use std::rc::{Rc, Weak};

use domkit_core::{Dom, EventType, NodeId};

use super::ChoiceOption;
use super::checkbox::forward_focus;
use crate::component::{BaseConfig, Component, ComponentBase, unique_id};
use crate::value::{EventName, Value};

#[derive(Debug, Clone, Default)]
pub struct SelectConfig {
    pub base: BaseConfig,
    pub label: Option<String>,
    pub options: Vec<ChoiceOption>,
    /// Initial value; defaults to the first option.
    pub value: Option<String>,
}

impl SelectConfig {
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
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

struct SelectInner {
    base: ComponentBase,
    select: NodeId,
    options: Vec<ChoiceOption>,
}

impl SelectInner {
    fn knows(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }
}

/// Drop-down list. Emits `Change(Text)` when the user picks an option.
#[derive(Clone)]
pub struct Select {
    inner: Rc<SelectInner>,
}

impl std::fmt::Debug for Select {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Select")
            .field("options", &self.inner.options.len())
            .field("value", &self.get())
            .finish()
    }
}

impl Select {
    pub fn new(dom: &Dom, config: SelectConfig) -> Self {
        let base = ComponentBase::new(dom, "select", &config.base, |dom| {
            let root = dom.create_element("div");
            dom.add_class(root, "select");
            root
        });
        let root = base.element();
        let select_id = unique_id("select");
        if let Some(label) = &config.label {
            let node = dom.create_element("label");
            dom.add_class(node, "select__label");
            dom.set_attribute(node, "for", select_id.clone());
            dom.set_text(node, label.clone());
            dom.append_child(root, node);
        }
        let select = dom.create_element("select");
        dom.add_class(select, "select__input");
        dom.set_attribute(select, "id", select_id);
        dom.append_child(root, select);
        for option in &config.options {
            let node = dom.create_element("option");
            dom.set_attribute(node, "value", option.value.clone());
            dom.set_text(node, option.label.clone());
            dom.toggle_attribute(node, "disabled", option.disabled);
            dom.append_child(select, node);
        }

        let inner = Rc::new(SelectInner {
            base,
            select,
            options: config.options,
        });
        let initial = config
            .value
            .filter(|v| inner.knows(v))
            .or_else(|| inner.options.first().map(|o| o.value.clone()))
            .unwrap_or_default();
        dom.set_value(select, initial);

        let weak: Weak<SelectInner> = Rc::downgrade(&inner);
        inner.base.listen(select, EventType::Change, move |_| {
            if let Some(inner) = weak.upgrade() {
                let value = inner.base.dom().value(inner.select);
                inner.base.emit(EventName::Change, &Value::Text(value));
            }
        });
        forward_focus(&inner.base, select);
        Self { inner }
    }

    #[must_use]
    pub fn select_element(&self) -> NodeId {
        self.inner.select
    }

    #[must_use]
    pub fn options(&self) -> &[ChoiceOption] {
        &self.inner.options
    }
}

impl Component for Select {
    type Value = String;

    fn base(&self) -> &ComponentBase {
        &self.inner.base
    }

    fn get(&self) -> String {
        self.inner.base.dom().value(self.inner.select)
    }

    /// Programmatic update; values not among the options are ignored.
    fn set(&self, value: String) {
        if self.inner.base.guard_destroyed("set") || !self.inner.knows(&value) {
            return;
        }
        self.inner.base.dom().set_value(self.inner.select, value);
    }

    fn set_disabled(&self, disabled: bool) {
        self.inner.base.set_disabled(disabled);
        self.inner
            .base
            .dom()
            .toggle_attribute(self.inner.select, "disabled", disabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn defaults_to_first_option() {
        let dom = Dom::new();
        let select = Select::new(&dom, SelectConfig::new([("us", "United States"), ("no", "Norway")]));
        assert_eq!(select.get(), "us");
        assert_eq!(dom.children(select.select_element()).len(), 2);
    }

    #[test]
    fn user_choice_emits_change_and_set_validates() {
        let dom = Dom::new();
        let select = Select::new(&dom, SelectConfig::new(["s", "m", "l"]).value("m").label("Size"));
        select.mount(dom.body());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        select.on(EventName::Change, move |v| s.borrow_mut().push(v.clone()));

        dom.select_option(select.select_element(), "l");
        assert_eq!(*seen.borrow(), vec![Value::from("l")]);
        select.set("xl".into());
        assert_eq!(select.get(), "l");
        select.set("s".into());
        assert_eq!(select.get(), "s");
        assert_eq!(seen.borrow().len(), 1);
    }
}
