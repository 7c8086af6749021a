//! Project demo timelines: the Bridge tenant log and the FlashCull counter.
//!
//! Both tick on a fixed interval. The tick after the last piece of work
//! reports [`DemoEvent::Finished`].

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use folio_core::config::DemoConfig;
use folio_core::resume::BRIDGE_DEMO_STEPS;

use crate::scheduler::{Scheduler, TimerGroup};

/// What a demo plays.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DemoScript {
    /// Append one log line per tick.
    StepLog {
        steps: Vec<String>,
        interval: Duration,
    },
    /// Count up by `batch` per tick until `total`.
    Counter {
        total: u32,
        batch: u32,
        interval: Duration,
    },
}

impl DemoScript {
    /// Multi-tenant environment boot log.
    pub fn bridge(config: &DemoConfig) -> Self {
        DemoScript::StepLog {
            steps: BRIDGE_DEMO_STEPS.iter().map(|s| s.to_string()).collect(),
            interval: Duration::from_millis(config.bridge_step_ms),
        }
    }

    /// Photo culling throughput counter.
    pub fn flashcull(config: &DemoConfig) -> Self {
        DemoScript::Counter {
            total: config.cull_total,
            batch: config.cull_batch,
            interval: Duration::from_millis(config.cull_tick_ms),
        }
    }

    fn interval(&self) -> Duration {
        match self {
            DemoScript::StepLog { interval, .. } | DemoScript::Counter { interval, .. } => {
                *interval
            }
        }
    }
}

/// Progress of a running demo.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DemoEvent {
    Log(String),
    Progress { processed: u32, total: u32 },
    Finished,
}

struct Ticker {
    script: DemoScript,
    position: u32,
    on_event: Box<dyn FnMut(DemoEvent)>,
}

impl Ticker {
    /// Advance one tick. Returns false once the demo has finished.
    fn tick(&mut self) -> bool {
        let event = match &self.script {
            DemoScript::StepLog { steps, .. } => {
                match steps.get(self.position as usize) {
                    Some(step) => {
                        self.position += 1;
                        DemoEvent::Log(step.clone())
                    }
                    None => DemoEvent::Finished,
                }
            }
            DemoScript::Counter { total, batch, .. } => {
                if self.position >= *total {
                    DemoEvent::Finished
                } else {
                    self.position = self.position.saturating_add((*batch).max(1)).min(*total);
                    DemoEvent::Progress {
                        processed: self.position,
                        total: *total,
                    }
                }
            }
        };

        let more = event != DemoEvent::Finished;
        (self.on_event)(event);
        more
    }
}

/// Runs one demo at a time on a [`Scheduler`].
pub struct DemoRunner {
    timers: TimerGroup,
    running: Rc<Cell<bool>>,
}

impl DemoRunner {
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            timers: TimerGroup::new(scheduler),
            running: Rc::new(Cell::new(false)),
        }
    }

    /// Start `script`, reporting through `on_event`.
    ///
    /// The first tick happens one interval from now. Returns `false` if a
    /// demo is already running or the runner was cancelled.
    pub fn start<F>(&self, script: DemoScript, on_event: F) -> bool
    where
        F: FnMut(DemoEvent) + 'static,
    {
        if self.running.get() || self.timers.is_closed() {
            tracing::debug!("Demo ignored: busy or cancelled");
            return false;
        }
        self.running.set(true);

        let interval = script.interval();
        let ticker = Rc::new(RefCell::new(Ticker {
            script,
            position: 0,
            on_event: Box::new(on_event),
        }));
        Self::schedule_tick(self.timers.clone(), Rc::clone(&self.running), ticker, interval);
        true
    }

    fn schedule_tick(
        timers: TimerGroup,
        running: Rc<Cell<bool>>,
        ticker: Rc<RefCell<Ticker>>,
        interval: Duration,
    ) {
        let group = timers.clone();
        timers.schedule(interval, move || {
            let more = ticker.borrow_mut().tick();
            if !more {
                running.set(false);
                tracing::debug!("Demo finished");
                return;
            }
            if !group.is_closed() {
                Self::schedule_tick(group, running, ticker, interval);
            }
        });
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Stop the current demo and refuse new ones.
    pub fn cancel(&self) {
        self.timers.cancel_all();
        self.running.set(false);
    }
}

impl Drop for DemoRunner {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manual::ManualScheduler;

    fn collect() -> (Rc<RefCell<Vec<DemoEvent>>>, impl FnMut(DemoEvent) + 'static) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        (events, move |e| sink.borrow_mut().push(e))
    }

    #[test]
    fn test_bridge_logs_every_step_then_finishes() {
        let clock = Rc::new(ManualScheduler::new());
        let runner = DemoRunner::new(clock.clone());
        let (events, sink) = collect();

        assert!(runner.start(DemoScript::bridge(&DemoConfig::default()), sink));
        clock.advance(Duration::from_millis(800));
        assert_eq!(
            events.borrow()[0],
            DemoEvent::Log("Initializing Multi-tenant Environment...".to_string())
        );

        clock.run_until_idle();
        let events = events.borrow();
        assert_eq!(events.len(), 7);
        assert_eq!(events.last(), Some(&DemoEvent::Finished));
        assert_eq!(clock.now(), Duration::from_millis(7 * 800));
        assert!(!runner.is_running());
    }

    #[test]
    fn test_flashcull_counts_to_total() {
        let clock = Rc::new(ManualScheduler::new());
        let runner = DemoRunner::new(clock.clone());
        let (events, sink) = collect();

        runner.start(DemoScript::flashcull(&DemoConfig::default()), sink);
        clock.run_until_idle();

        let events = events.borrow();
        assert_eq!(events.len(), 41);
        assert_eq!(
            events[0],
            DemoEvent::Progress {
                processed: 125,
                total: 5000
            }
        );
        assert_eq!(
            events[39],
            DemoEvent::Progress {
                processed: 5000,
                total: 5000
            }
        );
        assert_eq!(events[40], DemoEvent::Finished);
    }

    #[test]
    fn test_counter_clamps_last_batch() {
        let clock = Rc::new(ManualScheduler::new());
        let runner = DemoRunner::new(clock.clone());
        let (events, sink) = collect();

        let script = DemoScript::Counter {
            total: 10,
            batch: 4,
            interval: Duration::from_millis(1),
        };
        runner.start(script, sink);
        clock.run_until_idle();

        let processed: Vec<u32> = events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                DemoEvent::Progress { processed, .. } => Some(*processed),
                _ => None,
            })
            .collect();
        assert_eq!(processed, vec![4, 8, 10]);
    }

    #[test]
    fn test_busy_runner_rejects_second_demo() {
        let clock = Rc::new(ManualScheduler::new());
        let runner = DemoRunner::new(clock.clone());
        let (_, first) = collect();
        let (second_events, second) = collect();

        assert!(runner.start(DemoScript::bridge(&DemoConfig::default()), first));
        assert!(!runner.start(DemoScript::flashcull(&DemoConfig::default()), second));
        clock.run_until_idle();
        assert!(second_events.borrow().is_empty());
    }

    #[test]
    fn test_cancel_stops_demo() {
        let clock = Rc::new(ManualScheduler::new());
        let runner = DemoRunner::new(clock.clone());
        let (events, sink) = collect();

        runner.start(DemoScript::bridge(&DemoConfig::default()), sink);
        clock.advance(Duration::from_millis(1600));
        runner.cancel();
        clock.run_until_idle();

        assert_eq!(events.borrow().len(), 2);
        assert!(!runner.is_running());
    }
}
