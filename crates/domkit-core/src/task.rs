#![forbid(unsafe_code)]

//! Local task executor and the unhandled-error channel.
//!
//! Asynchronous handlers (for example a dialog's primary action) are spawned
//! as `'static` local futures. The host drives them from its event loop with
//! [`Dom::run_until_stalled`](crate::dom::Dom::run_until_stalled). Errors that
//! no caller handles end up in the unhandled-error channel, the analogue of a
//! browser's `unhandledrejection` event.

use std::cell::RefCell;
use std::future::Future;

use futures::executor::{LocalPool, LocalSpawner};
use futures::task::LocalSpawnExt;

/// Boxed error type accepted by the unhandled-error channel.
pub type BoxError = Box<dyn std::error::Error + 'static>;

pub(crate) struct TaskQueue {
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
    unhandled: RefCell<Vec<BoxError>>,
}

impl TaskQueue {
    pub(crate) fn new() -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Self {
            pool: RefCell::new(pool),
            spawner,
            unhandled: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn spawn(&self, future: impl Future<Output = ()> + 'static) {
        if let Err(err) = self.spawner.spawn_local(future) {
            self.report(Box::new(err));
        }
    }

    /// Poll every ready task. Re-entrant calls (from inside a task) are
    /// ignored; the outer call keeps polling until nothing is ready.
    pub(crate) fn run_until_stalled(&self) -> bool {
        match self.pool.try_borrow_mut() {
            Ok(mut pool) => {
                pool.run_until_stalled();
                true
            }
            Err(_) => false,
        }
    }

    pub(crate) fn report(&self, err: BoxError) {
        tracing::error!(error = %err, "unhandled error");
        self.unhandled.borrow_mut().push(err);
    }

    pub(crate) fn take_unhandled(&self) -> Vec<BoxError> {
        std::mem::take(&mut *self.unhandled.borrow_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn spawned_tasks_run_on_stall() {
        let queue = TaskQueue::new();
        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);
        queue.spawn(async move { flag.set(true) });

        assert!(!ran.get());
        assert!(queue.run_until_stalled());
        assert!(ran.get());
    }

    #[test]
    fn unhandled_errors_drain() {
        let queue = TaskQueue::new();
        queue.report("boom".into());
        let errors = queue.take_unhandled();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "boom");
        assert!(queue.take_unhandled().is_empty());
    }
}
