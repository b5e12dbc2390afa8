#![forbid(unsafe_code)]

//! Virtual-clock timer queue.
//!
//! The host owns time. Timers are ordered by `(due, id)` so that two timers
//! due at the same instant fire in the order they were scheduled. Callbacks
//! run with no borrow of the queue held, so they may freely schedule or clear
//! other timers.

use std::collections::BTreeMap;
use std::time::Duration;

use ahash::AHashMap;

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

pub(crate) type TimerCallback = Box<dyn FnOnce()>;

/// Ordered queue of pending one-shot timers.
#[derive(Default)]
pub(crate) struct TimerQueue {
    now: Duration,
    next_id: u64,
    pending: BTreeMap<(Duration, TimerId), TimerCallback>,
    due_by_id: AHashMap<TimerId, Duration>,
}

impl TimerQueue {
    pub(crate) fn now(&self) -> Duration {
        self.now
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn schedule(&mut self, delay: Duration, callback: TimerCallback) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let due = self.now + delay;
        self.pending.insert((due, id), callback);
        self.due_by_id.insert(id, due);
        id
    }

    pub(crate) fn cancel(&mut self, id: TimerId) -> bool {
        match self.due_by_id.remove(&id) {
            Some(due) => self.pending.remove(&(due, id)).is_some(),
            None => false,
        }
    }

    /// Pop the earliest timer due at or before `limit`, advancing the clock
    /// to its due time.
    pub(crate) fn pop_due(&mut self, limit: Duration) -> Option<TimerCallback> {
        let (&(due, id), _) = self.pending.iter().next()?;
        if due > limit {
            return None;
        }
        let callback = self.pending.remove(&(due, id))?;
        self.due_by_id.remove(&id);
        self.now = self.now.max(due);
        Some(callback)
    }

    /// Due time of the latest pending timer.
    pub(crate) fn last_due(&self) -> Option<Duration> {
        self.pending.keys().next_back().map(|(due, _)| *due)
    }

    pub(crate) fn set_now(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<u32>>>, impl Fn(u32) -> TimerCallback) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let make = move |tag: u32| -> TimerCallback {
            let sink = Rc::clone(&sink);
            Box::new(move || sink.borrow_mut().push(tag))
        };
        (log, make)
    }

    #[test]
    fn fires_in_due_then_schedule_order() {
        let (log, make) = recorder();
        let mut queue = TimerQueue::default();
        queue.schedule(Duration::from_millis(20), make(1));
        queue.schedule(Duration::from_millis(10), make(2));
        queue.schedule(Duration::from_millis(10), make(3));

        while let Some(cb) = queue.pop_due(Duration::from_millis(100)) {
            cb();
        }
        assert_eq!(*log.borrow(), vec![2, 3, 1]);
        assert_eq!(queue.now(), Duration::from_millis(20));
    }

    #[test]
    fn cancel_removes_pending_timer() {
        let (log, make) = recorder();
        let mut queue = TimerQueue::default();
        let id = queue.schedule(Duration::from_millis(5), make(1));
        assert!(queue.cancel(id));
        assert!(!queue.cancel(id));
        assert!(queue.pop_due(Duration::from_secs(1)).is_none());
        assert!(log.borrow().is_empty());
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn pop_due_respects_limit() {
        let (_log, make) = recorder();
        let mut queue = TimerQueue::default();
        queue.schedule(Duration::from_millis(50), make(1));
        assert!(queue.pop_due(Duration::from_millis(49)).is_none());
        assert!(queue.pop_due(Duration::from_millis(50)).is_some());
    }
}
