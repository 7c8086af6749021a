//! Real-time scheduler on the tokio current-thread runtime.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use tokio::task::AbortHandle;

use crate::scheduler::{Scheduler, Task, TimerId};

/// Runs tasks with `tokio::time::sleep` on local tasks.
///
/// Must be used from inside a [`tokio::task::LocalSet`]; tasks are not
/// `Send` and never leave the current thread.
#[derive(Default)]
pub struct TokioScheduler {
    next_id: Cell<u64>,
    handles: Rc<RefCell<HashMap<TimerId, AbortHandle>>>,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of timers that have neither fired nor been cancelled.
    pub fn pending(&self) -> usize {
        self.handles.borrow().len()
    }
}

impl Scheduler for TokioScheduler {
    fn after(&self, delay: Duration, task: Task) -> TimerId {
        let id = TimerId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        let handles = Rc::downgrade(&self.handles);
        let join = tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            if let Some(handles) = handles.upgrade() {
                handles.borrow_mut().remove(&id);
            }
            task();
        });

        self.handles.borrow_mut().insert(id, join.abort_handle());
        id
    }

    fn cancel(&self, id: TimerId) {
        if let Some(handle) = self.handles.borrow_mut().remove(&id) {
            handle.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.handles.borrow_mut().drain() {
            handle.abort();
        }
    }
}
