#![forbid(unsafe_code)]

use std::rc::{Rc, Weak};

use domkit_core::{Dom, EventType, NodeId};

use super::checkbox::forward_focus;
use crate::component::{BaseConfig, Component, ComponentBase, unique_id};
use crate::value::{EventName, Value};

/// Class present on the root while an error is shown.
pub const ERROR_CLASS: &str = "has-error";

#[derive(Debug, Clone)]
pub struct TextFieldConfig {
    pub base: BaseConfig,
    pub label: String,
    /// Native input type (`text`, `email`, `password`, ...).
    pub input_type: String,
    pub value: String,
    pub placeholder: Option<String>,
    pub help_text: Option<String>,
    pub required: bool,
}

impl Default for TextFieldConfig {
    fn default() -> Self {
        Self {
            base: BaseConfig::default(),
            label: String::new(),
            input_type: "text".to_string(),
            value: String::new(),
            placeholder: None,
            help_text: None,
            required: false,
        }
    }
}

impl TextFieldConfig {
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
    pub fn input_type(mut self, input_type: impl Into<String>) -> Self {
        self.input_type = input_type.into();
        self
    }

    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    #[must_use]
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    #[must_use]
    pub fn help_text(mut self, help: impl Into<String>) -> Self {
        self.help_text = Some(help.into());
        self
    }

    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

struct TextFieldInner {
    base: ComponentBase,
    label: NodeId,
    input: NodeId,
    error: NodeId,
}

/// Labelled single-line input with help and error text.
///
/// Emits `Input(Text)` on every edit, `Change(Text)` on commit, and
/// forwards `Focus`/`Blur`.
#[derive(Clone)]
pub struct TextField {
    inner: Rc<TextFieldInner>,
}

impl std::fmt::Debug for TextField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextField")
            .field("element", &self.inner.base.element())
            .field("value", &self.get())
            .finish()
    }
}

impl TextField {
    pub fn new(dom: &Dom, config: TextFieldConfig) -> Self {
        let base = ComponentBase::new(dom, "text-field", &config.base, |dom| {
            let root = dom.create_element("div");
            dom.add_class(root, "text-field");
            root
        });
        let root = base.element();
        let input_id = unique_id("text-field");
        let error_id = format!("{input_id}-error");

        let label = dom.create_element("label");
        dom.add_class(label, "text-field__label");
        dom.set_attribute(label, "for", input_id.clone());
        dom.set_text(label, config.label);
        dom.append_child(root, label);

        let input = dom.create_element("input");
        dom.add_class(input, "text-field__input");
        dom.set_attribute(input, "id", input_id.clone());
        dom.set_attribute(input, "type", config.input_type);
        dom.set_value(input, config.value);
        if let Some(placeholder) = config.placeholder {
            dom.set_attribute(input, "placeholder", placeholder);
        }
        if config.required {
            dom.toggle_attribute(input, "required", true);
            dom.set_attribute(input, "aria-required", "true");
        }
        dom.append_child(root, input);

        if let Some(help) = config.help_text {
            let help_id = format!("{input_id}-help");
            let node = dom.create_element("div");
            dom.add_class(node, "text-field__help");
            dom.set_attribute(node, "id", help_id.clone());
            dom.set_text(node, help);
            dom.append_child(root, node);
            dom.set_attribute(input, "aria-describedby", help_id);
        }

        let error = dom.create_element("div");
        dom.add_class(error, "text-field__error");
        dom.set_attribute(error, "id", error_id);
        dom.set_attribute(error, "role", "alert");
        dom.set_style(error, "display", "none");
        dom.append_child(root, error);

        let inner = Rc::new(TextFieldInner {
            base,
            label,
            input,
            error,
        });
        for (native, name) in [(EventType::Input, EventName::Input), (EventType::Change, EventName::Change)] {
            let weak: Weak<TextFieldInner> = Rc::downgrade(&inner);
            inner.base.listen(input, native, move |_| {
                if let Some(inner) = weak.upgrade() {
                    let value = inner.base.dom().value(inner.input);
                    inner.base.emit(name, &Value::Text(value));
                }
            });
        }
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

    /// Show (`Some`) or clear (`None`) the error message.
    pub fn set_error(&self, error: Option<String>) {
        let inner = &self.inner;
        if inner.base.guard_destroyed("set_error") {
            return;
        }
        let dom = inner.base.dom();
        let root = inner.base.element();
        match error {
            Some(message) => {
                dom.set_text(inner.error, message);
                dom.remove_style(inner.error, "display");
                dom.set_attribute(inner.input, "aria-invalid", "true");
                if let Some(id) = dom.attribute(inner.error, "id") {
                    dom.set_attribute(inner.input, "aria-errormessage", id);
                }
                dom.add_class(root, ERROR_CLASS);
            }
            None => {
                dom.set_text(inner.error, "");
                dom.set_style(inner.error, "display", "none");
                dom.remove_attribute(inner.input, "aria-invalid");
                dom.remove_attribute(inner.input, "aria-errormessage");
                dom.remove_class(root, ERROR_CLASS);
            }
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        let dom = self.inner.base.dom();
        dom.has_attribute(self.inner.input, "aria-invalid")
            .then(|| dom.text(self.inner.error))
    }
}

impl Component for TextField {
    type Value = String;

    fn base(&self) -> &ComponentBase {
        &self.inner.base
    }

    fn get(&self) -> String {
        self.inner.base.dom().value(self.inner.input)
    }

    /// Programmatic update; emits nothing.
    fn set(&self, value: String) {
        if self.inner.base.guard_destroyed("set") {
            return;
        }
        self.inner.base.dom().set_value(self.inner.input, value);
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
    fn typing_emits_input_then_change() {
        let dom = Dom::new();
        let field = TextField::new(&dom, TextFieldConfig::new("Email").input_type("email"));
        field.mount(dom.body());
        let log = Rc::new(RefCell::new(Vec::new()));
        for name in [EventName::Input, EventName::Change] {
            let l = Rc::clone(&log);
            field.on(name, move |v| l.borrow_mut().push((name, v.clone())));
        }
        dom.input_text(field.input(), "a@b.c");
        assert_eq!(
            *log.borrow(),
            vec![
                (EventName::Input, Value::from("a@b.c")),
                (EventName::Change, Value::from("a@b.c")),
            ]
        );
        assert_eq!(field.get(), "a@b.c");
    }

    #[test]
    fn error_toggles_aria() {
        let dom = Dom::new();
        let field = TextField::new(&dom, TextFieldConfig::new("Name").required(true));
        field.set_error(Some("Required".into()));
        assert_eq!(field.error().as_deref(), Some("Required"));
        assert!(dom.has_class(field.element(), ERROR_CLASS));
        field.set_error(None);
        assert_eq!(field.error(), None);
        assert!(!dom.has_attribute(field.input(), "aria-invalid"));
    }

    #[test]
    fn label_points_at_input() {
        let dom = Dom::new();
        let field = TextField::new(&dom, TextFieldConfig::new("City").value("Oslo").help_text("Where you live"));
        let label = dom.query_selector_all(field.element(), "label")[0];
        assert_eq!(dom.attribute(label, "for"), dom.attribute(field.input(), "id"));
        assert_eq!(field.get(), "Oslo");
        field.set_label("Town");
        assert_eq!(dom.text(label), "Town");
        assert!(dom.attribute(field.input(), "aria-describedby").is_some());
    }
}
