#![forbid(unsafe_code)]

use std::rc::{Rc, Weak};

use domkit_core::{Dom, EventType, NodeId};

use crate::component::{BaseConfig, Component, ComponentBase, unique_id};
use crate::value::{EventName, Value};

#[derive(Debug, Clone, Default)]
pub struct CheckboxConfig {
    pub base: BaseConfig,
    pub label: String,
    pub checked: bool,
    /// Form field name; generated when absent.
    pub name: Option<String>,
}

impl CheckboxConfig {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
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

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

struct CheckboxInner {
    base: ComponentBase,
    input: NodeId,
    label: NodeId,
}

/// Labelled checkbox. Emits `Change(Bool)` then `Check` or `Uncheck`.
#[derive(Clone)]
pub struct Checkbox {
    inner: Rc<CheckboxInner>,
}

impl std::fmt::Debug for Checkbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checkbox")
            .field("element", &self.inner.base.element())
            .field("checked", &self.get())
            .finish()
    }
}

impl Checkbox {
    pub fn new(dom: &Dom, config: CheckboxConfig) -> Self {
        let base = ComponentBase::new(dom, "checkbox", &config.base, |dom| {
            let root = dom.create_element("label");
            dom.add_class(root, "checkbox");
            root
        });
        let root = base.element();
        let input = dom.create_element("input");
        dom.set_attribute(input, "type", "checkbox");
        dom.set_attribute(input, "name", config.name.unwrap_or_else(|| unique_id("checkbox")));
        dom.add_class(input, "checkbox__input");
        dom.set_checked(input, config.checked);
        dom.append_child(root, input);
        let label = dom.create_element("span");
        dom.add_class(label, "checkbox__label");
        dom.set_text(label, config.label);
        dom.append_child(root, label);

        let inner = Rc::new(CheckboxInner { base, input, label });
        let weak: Weak<CheckboxInner> = Rc::downgrade(&inner);
        inner.base.listen(input, EventType::Change, move |_| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let checked = inner.base.dom().is_checked(inner.input);
            inner.base.emit(EventName::Change, &Value::Bool(checked));
            let name = if checked { EventName::Check } else { EventName::Uncheck };
            inner.base.emit(name, &Value::Bool(checked));
        });
        forward_focus(&inner.base, input);
        Self { inner }
    }

    #[must_use]
    pub fn input(&self) -> NodeId {
        self.inner.input
    }

    pub fn set_label(&self, label: impl Into<String>) {
        if self.inner.base.guard_destroyed("set_label") {
            return;
        }
        self.inner.base.dom().set_text(self.inner.label, label);
    }
}

/// Re-emit native focus and blur of `node` as framework events.
pub(crate) fn forward_focus(base: &ComponentBase, node: NodeId) {
    for (native, name) in [(EventType::Focus, EventName::Focus), (EventType::Blur, EventName::Blur)] {
        let emitter = base.emitter_handle();
        base.listen(node, native, move |_| emitter.emit(name, &Value::None));
    }
}

impl Component for Checkbox {
    type Value = bool;

    fn base(&self) -> &ComponentBase {
        &self.inner.base
    }

    fn get(&self) -> bool {
        self.inner.base.dom().is_checked(self.inner.input)
    }

    /// Programmatic update; emits nothing.
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
