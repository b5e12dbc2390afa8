#![forbid(unsafe_code)]

use std::rc::{Rc, Weak};

use domkit_core::Dom;

use super::ChoiceOption;
use super::radio::{Radio, RadioConfig};
use crate::component::{BaseConfig, Component, ComponentBase, unique_id};
use crate::value::{EventName, Value};

#[derive(Debug, Clone, Default)]
pub struct RadioGroupConfig {
    pub base: BaseConfig,
    /// Group caption rendered as a legend.
    pub label: Option<String>,
    /// Shared input name; generated when absent.
    pub name: Option<String>,
    pub options: Vec<ChoiceOption>,
    /// Initially selected value.
    pub value: Option<String>,
}

impl RadioGroupConfig {
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
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

struct RadioGroupInner {
    base: ComponentBase,
    radios: Vec<Radio>,
    disabled_options: Vec<bool>,
}

/// Mutually exclusive set of radios. Emits `Change(Text(value))` on user
/// selection.
#[derive(Clone)]
pub struct RadioGroup {
    inner: Rc<RadioGroupInner>,
}

impl std::fmt::Debug for RadioGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RadioGroup")
            .field("options", &self.inner.radios.len())
            .field("value", &self.get())
            .finish()
    }
}

impl RadioGroup {
    pub fn new(dom: &Dom, config: RadioGroupConfig) -> Self {
        let base = ComponentBase::new(dom, "radio-group", &config.base, |dom| {
            let root = dom.create_element("fieldset");
            dom.add_class(root, "radio-group");
            root
        });
        let root = base.element();
        dom.set_attribute(root, "role", "radiogroup");
        if let Some(label) = &config.label {
            let legend = dom.create_element("legend");
            dom.add_class(legend, "radio-group__label");
            dom.set_text(legend, label.clone());
            dom.append_child(root, legend);
        }

        let name = config.name.unwrap_or_else(|| unique_id("radio-group"));
        let radios: Vec<Radio> = config
            .options
            .iter()
            .map(|option| {
                let checked = config.value.as_deref() == Some(option.value.as_str());
                let radio = Radio::new(
                    dom,
                    RadioConfig::new(name.clone(), option.value.clone(), option.label.clone())
                        .checked(checked),
                );
                if option.disabled {
                    radio.set_disabled(true);
                }
                radio.mount(root);
                radio
            })
            .collect();
        let disabled_options = config.options.iter().map(|o| o.disabled).collect();

        let inner = Rc::new(RadioGroupInner {
            base,
            radios,
            disabled_options,
        });
        for radio in &inner.radios {
            let weak: Weak<RadioGroupInner> = Rc::downgrade(&inner);
            radio.on(EventName::Change, move |value| {
                if let Some(inner) = weak.upgrade() {
                    inner.base.emit(EventName::Change, value);
                }
            });
        }
        Self { inner }
    }

    #[must_use]
    pub fn radios(&self) -> &[Radio] {
        &self.inner.radios
    }

    /// Check the radio with `value`. Shorthand for `set(Some(value))`.
    pub fn select(&self, value: &str) {
        self.set(Some(value.to_string()));
    }
}

impl Component for RadioGroup {
    type Value = Option<String>;

    fn base(&self) -> &ComponentBase {
        &self.inner.base
    }

    fn get(&self) -> Option<String> {
        self.inner
            .radios
            .iter()
            .find(|r| r.is_checked())
            .map(|r| r.value().to_string())
    }

    /// Check exactly the matching radio; `None` or an unknown value clears
    /// the selection. Emits nothing.
    fn set(&self, value: Option<String>) {
        if self.inner.base.guard_destroyed("set") {
            return;
        }
        for radio in &self.inner.radios {
            radio.set(value.as_deref() == Some(radio.value()));
        }
    }

    fn set_disabled(&self, disabled: bool) {
        self.inner.base.set_disabled(disabled);
        for (radio, option_disabled) in self.inner.radios.iter().zip(&self.inner.disabled_options) {
            radio.set_disabled(disabled || *option_disabled);
        }
    }

    fn destroy(&self) {
        for radio in &self.inner.radios {
            radio.destroy();
        }
        self.inner.base.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn group(dom: &Dom) -> RadioGroup {
        let group = RadioGroup::new(dom, RadioGroupConfig::new(["opt1", "opt2", "opt3"]).label("Pick"));
        group.mount(dom.body());
        group
    }

    #[test]
    fn set_checks_exactly_one() {
        let dom = Dom::new();
        let group = group(&dom);
        assert_eq!(group.get(), None);
        group.set(Some("opt2".into()));
        assert_eq!(group.get().as_deref(), Some("opt2"));
        assert_eq!(group.radios().iter().filter(|r| r.is_checked()).count(), 1);

        group.select("opt3");
        assert_eq!(group.get().as_deref(), Some("opt3"));
        group.set(Some("missing".into()));
        assert_eq!(group.get(), None);
    }

    #[test]
    fn user_selection_emits_change() {
        let dom = Dom::new();
        let group = group(&dom);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        group.on(EventName::Change, move |v| s.borrow_mut().push(v.clone()));
        dom.click(group.radios()[0].input());
        dom.click(group.radios()[2].input());
        assert_eq!(*seen.borrow(), vec![Value::from("opt1"), Value::from("opt3")]);
        assert_eq!(group.get().as_deref(), Some("opt3"));
    }

    #[test]
    fn disabled_options_stay_disabled() {
        let dom = Dom::new();
        let group = RadioGroup::new(
            &dom,
            RadioGroupConfig::new([ChoiceOption::new("a", "A"), ChoiceOption::new("b", "B").disabled(true)])
                .value("a"),
        );
        group.mount(dom.body());
        assert_eq!(group.get().as_deref(), Some("a"));
        group.set_disabled(true);
        group.set_disabled(false);
        assert!(!group.radios()[0].is_disabled());
        assert!(group.radios()[1].is_disabled());
        dom.click(group.radios()[1].input());
        assert_eq!(group.get().as_deref(), Some("a"));
    }
}
