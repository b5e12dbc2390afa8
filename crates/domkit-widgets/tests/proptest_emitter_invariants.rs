//! Property-based invariant tests for the component emitter.
//!
//! 1. A listener removed via its subscription never receives later emissions
//! 2. Every live listener receives each emission exactly once
//! 3. Emissions for one event never reach listeners of another

use std::cell::Cell;
use std::rc::Rc;

use domkit_widgets::{Emitter, EventName, Subscription, Value};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

const EVENTS: [EventName; 3] = [EventName::Change, EventName::Click, EventName::Dismiss];

#[derive(Debug, Clone)]
enum Op {
    Subscribe(usize),
    Unsubscribe(usize),
    Emit(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..EVENTS.len()).prop_map(Op::Subscribe),
        (0usize..32).prop_map(Op::Unsubscribe),
        (0usize..EVENTS.len()).prop_map(Op::Emit),
    ]
}

struct Tracked {
    event: usize,
    hits: Rc<Cell<u32>>,
    subscription: Subscription,
    live: bool,
    expected: u32,
}

proptest! {
    #[test]
    fn unsubscribed_listeners_stay_silent(ops in prop::collection::vec(op_strategy(), 1..120)) {
        let emitter = Emitter::new();
        let mut tracked: Vec<Tracked> = Vec::new();

        for op in ops {
            match op {
                Op::Subscribe(event) => {
                    let hits = Rc::new(Cell::new(0));
                    let h = Rc::clone(&hits);
                    let subscription = emitter.on(EVENTS[event], move |_| h.set(h.get() + 1));
                    tracked.push(Tracked { event, hits, subscription, live: true, expected: 0 });
                }
                Op::Unsubscribe(index) => {
                    if tracked.is_empty() {
                        continue;
                    }
                    let len = tracked.len();
                    let entry = &mut tracked[index % len];
                    entry.subscription.unsubscribe();
                    entry.live = false;
                }
                Op::Emit(event) => {
                    emitter.emit(EVENTS[event], &Value::None);
                    for entry in tracked.iter_mut().filter(|t| t.live && t.event == event) {
                        entry.expected += 1;
                    }
                }
            }
        }

        for entry in &tracked {
            prop_assert_eq!(entry.hits.get(), entry.expected);
            prop_assert_eq!(entry.subscription.is_active(), entry.live);
        }
        for (i, name) in EVENTS.iter().enumerate() {
            let live = tracked.iter().filter(|t| t.live && t.event == i).count();
            prop_assert_eq!(emitter.listener_count(*name), live);
        }
    }
}
