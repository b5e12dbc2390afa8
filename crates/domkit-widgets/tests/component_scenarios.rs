//! End-to-end scenarios across components sharing one document.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use domkit_core::{Dom, EventType, KeyCode, KeyEvent};
use domkit_widgets::{
    ActionError, ButtonGroup, ButtonGroupConfig, ButtonGroupVariant, Checkbox, CheckboxConfig,
    Component, EventName, Modal, ModalAction, ModalConfig, RadioGroup, RadioGroupConfig,
    TextField, TextFieldConfig, ToastQueue, Value,
};
use futures::channel::oneshot;

fn record(component: &impl Component, name: EventName) -> Rc<RefCell<Vec<Value>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = Rc::clone(&seen);
    component.on(name, move |v| s.borrow_mut().push(v.clone()));
    seen
}

#[test]
fn pending_primary_action_keeps_button_busy() {
    let dom = Dom::new();
    let (tx, rx) = oneshot::channel::<Result<(), ActionError>>();
    let rx = Rc::new(RefCell::new(Some(rx)));
    let calls = Rc::new(Cell::new(0));
    let c = Rc::clone(&calls);
    let action = ModalAction::new("Save", move || {
        c.set(c.get() + 1);
        let rx = rx.borrow_mut().take();
        async move {
            match rx {
                Some(rx) => rx.await.unwrap_or_else(|_| Err("cancelled".into())),
                None => Ok(()),
            }
        }
    });
    let modal = Modal::new(
        &dom,
        ModalConfig::new("Save changes?")
            .primary_action(action)
            .focus_delay(Duration::ZERO),
    );
    modal.open();
    dom.advance(Duration::ZERO);
    let Some(button) = modal.primary_button() else {
        panic!("primary button rendered");
    };

    dom.click(button);
    assert!(dom.has_attribute(button, "disabled"));
    assert_eq!(dom.attribute(button, "aria-busy").as_deref(), Some("true"));

    dom.click(button);
    assert_eq!(calls.get(), 1, "busy button must not re-run the handler");

    assert!(tx.send(Ok(())).is_ok());
    dom.run_until_stalled();
    assert!(!dom.has_attribute(button, "disabled"));
    assert!(!dom.has_attribute(button, "aria-busy"));
    assert!(dom.take_errors().is_empty());
    assert!(modal.is_open());
}

#[test]
fn form_inside_modal_participates_in_focus_trap() {
    let dom = Dom::new();
    let modal = Modal::new(
        &dom,
        ModalConfig::new("Profile")
            .primary_action(ModalAction::sync("Save", || Ok(())))
            .focus_delay(Duration::ZERO),
    );
    let name = TextField::new(&dom, TextFieldConfig::new("Name").required(true));
    let subscribe = Checkbox::new(&dom, CheckboxConfig::new("Subscribe"));
    assert!(name.mount(modal.body()));
    assert!(subscribe.mount(modal.body()));

    modal.open();
    dom.advance(Duration::ZERO);
    let order = dom.focusable_within(modal.dialog());
    assert_eq!(order.len(), 4);
    assert_eq!(order[1], name.input());
    assert_eq!(order[2], subscribe.input());

    let inputs = record(&name, EventName::Input);
    dom.key_down(KeyEvent::new(KeyCode::Tab));
    assert_eq!(dom.active_element(), Some(name.input()));
    dom.input_text(name.input(), "Ada");
    assert_eq!(*inputs.borrow(), vec![Value::from("Ada")]);
    assert_eq!(name.get(), "Ada");

    dom.key_down(KeyEvent::new(KeyCode::Tab));
    dom.click(subscribe.input());
    assert!(subscribe.get());

    dom.key_down(KeyEvent::new(KeyCode::Escape));
    assert!(!modal.is_open());
}

#[test]
fn destroying_modal_leaves_children_usable() {
    let dom = Dom::new();
    let modal = Modal::new(&dom, ModalConfig::new("Filters").focus_delay(Duration::ZERO));
    let group = RadioGroup::new(&dom, RadioGroupConfig::new(["opt1", "opt2", "opt3"]));
    group.mount(modal.body());
    modal.open();
    modal.destroy();

    assert_eq!(dom.listener_count(dom.document(), EventType::KeyDown), 0);
    group.set(Some("opt2".to_string()));
    assert_eq!(group.get().as_deref(), Some("opt2"));
    let checked: Vec<bool> = group.radios().iter().map(|r| r.is_checked()).collect();
    assert_eq!(checked, vec![false, true, false]);
}

#[test]
fn segmented_group_reports_only_latest_choice() {
    let dom = Dom::new();
    let group = ButtonGroup::new(
        &dom,
        ButtonGroupConfig::new(["list", "grid", "table"]).variant(ButtonGroupVariant::Segmented),
    );
    group.mount(dom.body());
    let changes = record(&group, EventName::Change);

    dom.click(group.buttons()[0].element());
    dom.click(group.buttons()[2].element());
    assert_eq!(
        *changes.borrow(),
        vec![
            Value::List(vec!["list".into()]),
            Value::List(vec!["table".into()]),
        ]
    );

    group.set_disabled(true);
    dom.click(group.buttons()[1].element());
    assert_eq!(changes.borrow().len(), 2);
    assert_eq!(group.get(), vec!["table".to_string()]);
}

#[test]
fn toast_from_modal_action_outlives_modal() {
    let dom = Dom::new();
    let queue = ToastQueue::with_defaults(&dom);
    let q = queue.clone();
    let modal = Modal::new(
        &dom,
        ModalConfig::new("Delete?")
            .secondary_action(ModalAction::sync("Delete", move || {
                q.success("Deleted");
                Ok(())
            }))
            .focus_delay(Duration::ZERO),
    );
    modal.open();
    dom.advance(Duration::ZERO);
    let Some(button) = modal.secondary_button() else {
        panic!("secondary button rendered");
    };
    dom.click(button);

    assert!(!modal.is_open());
    assert_eq!(queue.len(), 1);
    let toast = &queue.toasts()[0];
    let dismissed = record(toast, EventName::Dismiss);

    dom.advance(Duration::from_millis(1000));
    toast.dismiss();
    dom.advance(Duration::from_millis(5000));
    assert_eq!(dismissed.borrow().len(), 1);
    assert!(queue.is_empty());
    assert!(!dom.is_connected(toast.element()));
}
