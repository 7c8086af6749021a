//! Timer abstraction shared by every timeline.
//!
//! Everything runs on one logical thread: tasks are `!Send` closures and
//! shared state lives in `Rc<RefCell<_>>`. A [`Scheduler`] only promises to
//! run a task once, later, unless cancelled.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Duration;

/// A deferred unit of work.
pub type Task = Box<dyn FnOnce() + 'static>;

/// Handle for a scheduled task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Fires callbacks after a delay.
pub trait Scheduler {
    /// Run `task` once after `delay`. Never runs it before returning.
    fn after(&self, delay: Duration, task: Task) -> TimerId;

    /// Cancel a pending task. Unknown or already-fired ids are ignored.
    fn cancel(&self, id: TimerId);
}

#[derive(Default)]
struct GroupState {
    live: HashSet<TimerId>,
    closed: bool,
}

/// The outstanding timers of one owner (a session, a playback run).
///
/// Cloning yields another handle to the same group. After
/// [`cancel_all`](Self::cancel_all) the group is closed: new timers are
/// refused and a task that slips through still does not run.
#[derive(Clone)]
pub struct TimerGroup {
    scheduler: Rc<dyn Scheduler>,
    state: Rc<RefCell<GroupState>>,
}

impl TimerGroup {
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            scheduler,
            state: Rc::new(RefCell::new(GroupState::default())),
        }
    }

    /// Schedule `task` in this group. Returns `None` once the group is closed.
    pub fn schedule<F>(&self, delay: Duration, task: F) -> Option<TimerId>
    where
        F: FnOnce() + 'static,
    {
        if self.state.borrow().closed {
            tracing::debug!("Timer refused: group closed");
            return None;
        }

        let slot: Rc<Cell<Option<TimerId>>> = Rc::new(Cell::new(None));
        let own_id = Rc::clone(&slot);
        let state = Rc::downgrade(&self.state);

        let id = self.scheduler.after(
            delay,
            Box::new(move || {
                let Some(state) = state.upgrade() else {
                    return;
                };
                {
                    let mut st = state.borrow_mut();
                    if st.closed {
                        return;
                    }
                    if let Some(id) = own_id.get() {
                        st.live.remove(&id);
                    }
                }
                task();
            }),
        );

        slot.set(Some(id));
        self.state.borrow_mut().live.insert(id);
        Some(id)
    }

    /// Cancel every outstanding timer and close the group.
    pub fn cancel_all(&self) {
        let live: Vec<TimerId> = {
            let mut st = self.state.borrow_mut();
            st.closed = true;
            st.live.drain().collect()
        };
        if !live.is_empty() {
            tracing::debug!(count = live.len(), "Cancelling timers");
        }
        for id in live {
            self.scheduler.cancel(id);
        }
    }

    /// Number of timers scheduled but not yet fired or cancelled.
    pub fn pending(&self) -> usize {
        self.state.borrow().live.len()
    }

    pub fn is_closed(&self) -> bool {
        self.state.borrow().closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manual::ManualScheduler;

    fn group() -> (Rc<ManualScheduler>, TimerGroup) {
        let clock = Rc::new(ManualScheduler::new());
        let group = TimerGroup::new(clock.clone());
        (clock, group)
    }

    #[test]
    fn test_group_tracks_live_timers() {
        let (clock, group) = group();
        let hits = Rc::new(Cell::new(0));

        let h = Rc::clone(&hits);
        group.schedule(Duration::from_millis(10), move || h.set(h.get() + 1));
        let h = Rc::clone(&hits);
        group.schedule(Duration::from_millis(20), move || h.set(h.get() + 1));
        assert_eq!(group.pending(), 2);

        clock.advance(Duration::from_millis(10));
        assert_eq!(hits.get(), 1);
        assert_eq!(group.pending(), 1);

        clock.advance(Duration::from_millis(10));
        assert_eq!(hits.get(), 2);
        assert_eq!(group.pending(), 0);
    }

    #[test]
    fn test_cancel_all_stops_everything() {
        let (clock, group) = group();
        let hits = Rc::new(Cell::new(0));

        for ms in [5, 10, 15] {
            let h = Rc::clone(&hits);
            group.schedule(Duration::from_millis(ms), move || h.set(h.get() + 1));
        }
        clock.advance(Duration::from_millis(5));
        group.cancel_all();

        assert!(group.is_closed());
        assert_eq!(group.pending(), 0);
        assert_eq!(clock.pending(), 0);
        clock.advance(Duration::from_secs(1));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_closed_group_refuses_new_timers() {
        let (clock, group) = group();
        group.cancel_all();
        let id = group.schedule(Duration::ZERO, || panic!("must not run"));
        assert!(id.is_none());
        assert_eq!(clock.run_until_idle(), 0);
    }

    #[test]
    fn test_task_may_schedule_followup() {
        let (clock, group) = group();
        let hits = Rc::new(Cell::new(0));

        let inner_group = group.clone();
        let h = Rc::clone(&hits);
        group.schedule(Duration::from_millis(10), move || {
            h.set(h.get() + 1);
            let h2 = Rc::clone(&h);
            inner_group.schedule(Duration::from_millis(10), move || h2.set(h2.get() + 1));
        });

        clock.advance(Duration::from_millis(20));
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_task_cancelling_its_own_group() {
        let (clock, group) = group();
        let hits = Rc::new(Cell::new(0));

        let g = group.clone();
        group.schedule(Duration::from_millis(1), move || g.cancel_all());
        let h = Rc::clone(&hits);
        group.schedule(Duration::from_millis(1), move || h.set(h.get() + 1));

        clock.run_until_idle();
        assert_eq!(hits.get(), 0);
    }
}
