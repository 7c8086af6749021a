//! Deterministic clock driven by hand.
//!
//! Time only moves when [`ManualScheduler::advance`] or
//! [`ManualScheduler::run_until_idle`] is called. Tasks due at the same
//! instant run in the order they were scheduled.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::scheduler::{Scheduler, Task, TimerId};

#[derive(Default)]
struct ClockState {
    now: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, u64), Task>,
    due_at: HashMap<u64, Duration>,
}

impl ClockState {
    fn pop_due(&mut self, limit: Option<Duration>) -> Option<(Duration, Task)> {
        let (&(due, id), _) = self.queue.iter().next()?;
        if limit.is_some_and(|limit| due > limit) {
            return None;
        }
        let task = self.queue.remove(&(due, id))?;
        self.due_at.remove(&id);
        Some((due, task))
    }
}

/// Fake clock for tests and instant (no-wait) playback.
#[derive(Default)]
pub struct ManualScheduler {
    state: RefCell<ClockState>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Elapsed virtual time.
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Number of scheduled tasks.
    pub fn pending(&self) -> usize {
        self.state.borrow().queue.len()
    }

    /// Move the clock forward by `by`, running every task that falls due,
    /// including tasks scheduled along the way. Returns how many ran.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now() + by;
        let fired = self.drain(Some(target));
        self.state.borrow_mut().now = target;
        fired
    }

    /// Run tasks until none remain, jumping the clock to each deadline.
    pub fn run_until_idle(&self) -> usize {
        self.drain(None)
    }

    fn drain(&self, limit: Option<Duration>) -> usize {
        let mut fired = 0;
        loop {
            let next = {
                let mut st = self.state.borrow_mut();
                let next = st.pop_due(limit);
                if let Some((due, _)) = &next {
                    st.now = *due;
                }
                next
            };
            match next {
                // The borrow is released: tasks may schedule or cancel.
                Some((_, task)) => {
                    task();
                    fired += 1;
                }
                None => return fired,
            }
        }
    }
}

impl Scheduler for ManualScheduler {
    fn after(&self, delay: Duration, task: Task) -> TimerId {
        let mut st = self.state.borrow_mut();
        let id = st.next_id;
        st.next_id += 1;
        let due = st.now + delay;
        st.queue.insert((due, id), task);
        st.due_at.insert(id, due);
        TimerId(id)
    }

    fn cancel(&self, id: TimerId) {
        let mut st = self.state.borrow_mut();
        if let Some(due) = st.due_at.remove(&id.0) {
            st.queue.remove(&(due, id.0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Task) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = Rc::clone(&log);
        let make = move |name: &'static str| -> Task {
            let l = Rc::clone(&l);
            Box::new(move || l.borrow_mut().push(name))
        };
        (log, make)
    }

    #[test]
    fn test_runs_in_deadline_order() {
        let clock = ManualScheduler::new();
        let (log, task) = recorder();

        clock.after(Duration::from_millis(30), task("c"));
        clock.after(Duration::from_millis(10), task("a"));
        clock.after(Duration::from_millis(20), task("b"));

        assert_eq!(clock.advance(Duration::from_millis(25)), 2);
        assert_eq!(*log.borrow(), vec!["a", "b"]);
        assert_eq!(clock.now(), Duration::from_millis(25));

        assert_eq!(clock.run_until_idle(), 1);
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert_eq!(clock.now(), Duration::from_millis(30));
    }

    #[test]
    fn test_equal_deadlines_are_fifo() {
        let clock = ManualScheduler::new();
        let (log, task) = recorder();

        clock.after(Duration::from_millis(5), task("first"));
        clock.after(Duration::from_millis(5), task("second"));
        clock.run_until_idle();

        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn test_cancel_removes_task() {
        let clock = ManualScheduler::new();
        let (log, task) = recorder();

        let id = clock.after(Duration::from_millis(5), task("cancelled"));
        clock.after(Duration::from_millis(6), task("kept"));
        clock.cancel(id);
        clock.cancel(id);
        clock.cancel(TimerId(999));

        assert_eq!(clock.pending(), 1);
        clock.run_until_idle();
        assert_eq!(*log.borrow(), vec!["kept"]);
    }

    #[test]
    fn test_zero_delay_is_not_inline() {
        let clock = ManualScheduler::new();
        let (log, task) = recorder();

        clock.after(Duration::ZERO, task("later"));
        assert!(log.borrow().is_empty());
        assert_eq!(clock.advance(Duration::ZERO), 1);
        assert_eq!(*log.borrow(), vec!["later"]);
    }

    #[test]
    fn test_advance_runs_tasks_scheduled_during_advance() {
        let clock = Rc::new(ManualScheduler::new());
        let hits = Rc::new(RefCell::new(Vec::new()));

        let c = Rc::clone(&clock);
        let h = Rc::clone(&hits);
        clock.after(
            Duration::from_millis(10),
            Box::new(move || {
                h.borrow_mut().push(c.now());
                let h2 = Rc::clone(&h);
                let c2 = Rc::clone(&c);
                c.after(
                    Duration::from_millis(10),
                    Box::new(move || h2.borrow_mut().push(c2.now())),
                );
            }),
        );

        clock.advance(Duration::from_millis(15));
        assert_eq!(hits.borrow().len(), 1);
        clock.advance(Duration::from_millis(5));
        assert_eq!(
            *hits.borrow(),
            vec![Duration::from_millis(10), Duration::from_millis(20)]
        );
    }
}
