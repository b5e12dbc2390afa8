#![forbid(unsafe_code)]

use std::rc::{Rc, Weak};

use domkit_core::{Dom, EventType};

use crate::component::{BaseConfig, Component, ComponentBase};
use crate::value::{EventName, Value};

/// Class present while a toggle button is pressed.
pub const PRESSED_CLASS: &str = "is-pressed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonVariant {
    Primary,
    #[default]
    Secondary,
    Plain,
    Destructive,
}

impl ButtonVariant {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Plain => "plain",
            Self::Destructive => "destructive",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ButtonConfig {
    pub base: BaseConfig,
    pub label: String,
    pub variant: ButtonVariant,
    /// `Some` makes this a toggle button carrying `aria-pressed`.
    pub pressed: Option<bool>,
}

impl ButtonConfig {
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
    pub fn variant(mut self, variant: ButtonVariant) -> Self {
        self.variant = variant;
        self
    }

    #[must_use]
    pub fn pressed(mut self, pressed: bool) -> Self {
        self.pressed = Some(pressed);
        self
    }
}

struct ButtonInner {
    base: ComponentBase,
}

/// Push button. Emits `Click` with its label.
#[derive(Clone)]
pub struct Button {
    inner: Rc<ButtonInner>,
}

impl std::fmt::Debug for Button {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Button")
            .field("element", &self.inner.base.element())
            .field("label", &self.label())
            .finish()
    }
}

impl Button {
    pub fn new(dom: &Dom, config: ButtonConfig) -> Self {
        let base = ComponentBase::new(dom, "button", &config.base, |dom| {
            let node = dom.create_element("button");
            dom.set_attribute(node, "type", "button");
            node
        });
        let node = base.element();
        dom.add_class(node, &format!("btn btn--{}", config.variant.as_str()));
        dom.set_text(node, config.label);

        let button = Self {
            inner: Rc::new(ButtonInner { base }),
        };
        if let Some(pressed) = config.pressed {
            button.set_pressed(pressed);
        }

        let weak: Weak<ButtonInner> = Rc::downgrade(&button.inner);
        button.inner.base.listen(node, EventType::Click, move |_| {
            if let Some(inner) = weak.upgrade() {
                let label = inner.base.dom().text(inner.base.element());
                inner.base.emit(EventName::Click, &Value::Text(label));
            }
        });
        button
    }

    #[must_use]
    pub fn label(&self) -> String {
        self.inner.base.dom().text(self.inner.base.element())
    }

    pub fn set_label(&self, label: impl Into<String>) {
        if self.inner.base.guard_destroyed("set_label") {
            return;
        }
        self.inner.base.dom().set_text(self.inner.base.element(), label);
    }

    #[must_use]
    pub fn is_pressed(&self) -> bool {
        let base = &self.inner.base;
        base.dom().attribute(base.element(), "aria-pressed").as_deref() == Some("true")
    }

    /// Reflect toggle state via `aria-pressed` and the pressed class.
    pub fn set_pressed(&self, pressed: bool) {
        let base = &self.inner.base;
        if base.guard_destroyed("set_pressed") {
            return;
        }
        let node = base.element();
        base.dom()
            .set_attribute(node, "aria-pressed", if pressed { "true" } else { "false" });
        base.dom().toggle_class(node, PRESSED_CLASS, pressed);
    }
}

impl Component for Button {
    type Value = String;

    fn base(&self) -> &ComponentBase {
        &self.inner.base
    }

    fn get(&self) -> String {
        self.label()
    }

    fn set(&self, label: String) {
        self.set_label(label);
    }
}
