//! Typewriter playback of scripted lines.
//!
//! A line's first character shows as soon as the line starts; the rest
//! follow `char_delay` apart. One more `char_delay` after the last
//! character the line is finished, then a `line_delay` pause (after the
//! last line too) runs before the next line starts or `done` fires.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use folio_core::config::PlaybackConfig;
use folio_core::types::{Emphasis, ScriptLine};

use crate::scheduler::{Scheduler, TimerGroup};

/// Timing of a playback run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pacing {
    pub char_delay: Duration,
    pub line_delay: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self::from(&PlaybackConfig::default())
    }
}

impl From<&PlaybackConfig> for Pacing {
    fn from(config: &PlaybackConfig) -> Self {
        Self {
            char_delay: config.char_delay(),
            line_delay: config.line_delay(),
        }
    }
}

/// Receives the progress of a playback run.
pub trait PlaybackSink {
    /// A new (still empty) line begins.
    fn line_started(&mut self, _index: usize, _emphasis: Option<Emphasis>) {}

    /// One more character of line `index` is visible; `partial` is the
    /// full visible prefix.
    fn update(&mut self, index: usize, partial: &str);

    /// Line `index` is complete; the inter-line pause begins.
    fn line_finished(&mut self, _index: usize) {}

    /// Every line has been played.
    fn done(&mut self);
}

struct Run {
    lines: Rc<[ScriptLine]>,
    line: usize,
    shown_bytes: usize,
    sink: Box<dyn PlaybackSink>,
}

struct Cursor {
    timers: TimerGroup,
    pacing: Pacing,
    running: Rc<Cell<bool>>,
    run: RefCell<Run>,
}

impl Cursor {
    fn start_line(this: &Rc<Self>) {
        if this.timers.is_closed() {
            return;
        }

        let empty = {
            let mut run = this.run.borrow_mut();
            let index = run.line;
            let Some(line) = run.lines.get(index) else {
                this.running.set(false);
                tracing::debug!(lines = run.lines.len(), "Playback finished");
                run.sink.done();
                return;
            };
            let (emphasis, empty) = (line.emphasis, line.text.is_empty());
            run.shown_bytes = 0;
            run.sink.line_started(index, emphasis);
            empty
        };

        if this.timers.is_closed() {
            return;
        }
        if empty {
            Self::finish_line(this);
        } else {
            Self::reveal(this);
        }
    }

    /// Show one more character, then check back after `char_delay`.
    fn reveal(this: &Rc<Self>) {
        {
            let mut run = this.run.borrow_mut();
            let lines = Rc::clone(&run.lines);
            let index = run.line;
            let text = lines[index].text.as_str();
            let end = text[run.shown_bytes..]
                .chars()
                .next()
                .map_or(text.len(), |c| run.shown_bytes + c.len_utf8());
            run.shown_bytes = end;
            run.sink.update(index, &text[..end]);
        }

        // The sink may have cancelled playback.
        if this.timers.is_closed() {
            return;
        }
        let next = Rc::clone(this);
        this.timers
            .schedule(this.pacing.char_delay, move || Self::step(&next));
    }

    fn step(this: &Rc<Self>) {
        let line_complete = {
            let run = this.run.borrow();
            run.shown_bytes >= run.lines[run.line].text.len()
        };
        if line_complete {
            Self::finish_line(this);
        } else {
            Self::reveal(this);
        }
    }

    fn finish_line(this: &Rc<Self>) {
        {
            let mut run = this.run.borrow_mut();
            let index = run.line;
            run.sink.line_finished(index);
            run.line += 1;
        }

        if this.timers.is_closed() {
            return;
        }
        let next = Rc::clone(this);
        this.timers
            .schedule(this.pacing.line_delay, move || Self::start_line(&next));
    }
}

/// Plays scripts character by character on a [`Scheduler`].
///
/// One run at a time. Cancelling (or dropping) the engine cancels every
/// pending timer, after which the sink hears nothing more.
pub struct ScriptedPlayback {
    timers: TimerGroup,
    pacing: Pacing,
    running: Rc<Cell<bool>>,
}

impl ScriptedPlayback {
    pub fn new(scheduler: Rc<dyn Scheduler>, pacing: Pacing) -> Self {
        Self {
            timers: TimerGroup::new(scheduler),
            pacing,
            running: Rc::new(Cell::new(false)),
        }
    }

    /// Start playing `lines` into `sink`.
    ///
    /// The first line starts immediately. Returns `false` without doing
    /// anything if a run is already in progress or the engine was cancelled.
    pub fn play<S>(&self, lines: impl Into<Rc<[ScriptLine]>>, sink: S) -> bool
    where
        S: PlaybackSink + 'static,
    {
        if self.timers.is_closed() {
            tracing::debug!("Playback ignored: engine cancelled");
            return false;
        }
        if self.running.get() {
            tracing::debug!("Playback ignored: already running");
            return false;
        }

        let lines = lines.into();
        tracing::debug!(lines = lines.len(), "Playback started");
        self.running.set(true);

        let cursor = Rc::new(Cursor {
            timers: self.timers.clone(),
            pacing: self.pacing,
            running: Rc::clone(&self.running),
            run: RefCell::new(Run {
                lines,
                line: 0,
                shown_bytes: 0,
                sink: Box::new(sink),
            }),
        });
        Cursor::start_line(&cursor);
        true
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Stop for good: cancel pending timers and refuse further runs.
    pub fn cancel(&self) {
        self.timers.cancel_all();
        self.running.set(false);
    }
}

impl Drop for ScriptedPlayback {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::manual::ManualScheduler;

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Seen {
        Started(usize, Option<Emphasis>),
        Update(usize, String),
        Finished(usize),
        Done,
    }

    #[derive(Clone, Default)]
    pub(crate) struct Recorder(pub Rc<RefCell<Vec<Seen>>>);

    impl Recorder {
        pub fn events(&self) -> Vec<Seen> {
            self.0.borrow().clone()
        }

        fn count(&self, pred: impl Fn(&Seen) -> bool) -> usize {
            self.0.borrow().iter().filter(|e| pred(e)).count()
        }
    }

    impl PlaybackSink for Recorder {
        fn line_started(&mut self, index: usize, emphasis: Option<Emphasis>) {
            self.0.borrow_mut().push(Seen::Started(index, emphasis));
        }

        fn update(&mut self, index: usize, partial: &str) {
            self.0
                .borrow_mut()
                .push(Seen::Update(index, partial.to_string()));
        }

        fn line_finished(&mut self, index: usize) {
            self.0.borrow_mut().push(Seen::Finished(index));
        }

        fn done(&mut self) {
            self.0.borrow_mut().push(Seen::Done);
        }
    }

    fn setup() -> (Rc<ManualScheduler>, ScriptedPlayback) {
        let clock = Rc::new(ManualScheduler::new());
        let playback = ScriptedPlayback::new(clock.clone(), Pacing::default());
        (clock, playback)
    }

    fn script(lens: &[usize]) -> Vec<ScriptLine> {
        lens.iter()
            .map(|&n| ScriptLine::plain("x".repeat(n)))
            .collect()
    }

    #[test]
    fn test_event_counts_for_zero_five_ten() {
        let (clock, playback) = setup();
        let rec = Recorder::default();

        assert!(playback.play(script(&[0, 5, 10]), rec.clone()));
        clock.run_until_idle();

        assert_eq!(rec.count(|e| matches!(e, Seen::Update(..))), 15);
        assert_eq!(rec.count(|e| matches!(e, Seen::Finished(_))), 3);
        assert_eq!(rec.count(|e| matches!(e, Seen::Done)), 1);
        assert_eq!(rec.events().last(), Some(&Seen::Done));
        assert!(!playback.is_running());
    }

    #[test]
    fn test_timing_follows_pacing() {
        let (clock, playback) = setup();
        let rec = Recorder::default();
        playback.play(script(&[0, 5, 10]), rec.clone());

        // 3 gaps of 200ms plus 15 characters of 15ms.
        clock.run_until_idle();
        assert_eq!(clock.now(), Duration::from_millis(3 * 200 + 15 * 15));
    }

    #[test]
    fn test_partials_are_prefixes() {
        let (clock, playback) = setup();
        let rec = Recorder::default();
        playback.play(vec![ScriptLine::plain("héy")], rec.clone());
        clock.run_until_idle();

        assert_eq!(
            rec.events(),
            vec![
                Seen::Started(0, None),
                Seen::Update(0, "h".to_string()),
                Seen::Update(0, "hé".to_string()),
                Seen::Update(0, "héy".to_string()),
                Seen::Finished(0),
                Seen::Done,
            ]
        );
    }

    #[test]
    fn test_first_character_shows_when_line_starts() {
        let (clock, playback) = setup();
        let rec = Recorder::default();
        playback.play(
            vec![ScriptLine::styled("ok", Emphasis::Success)],
            rec.clone(),
        );

        assert_eq!(
            rec.events(),
            vec![
                Seen::Started(0, Some(Emphasis::Success)),
                Seen::Update(0, "o".to_string()),
            ]
        );
        clock.advance(Duration::from_millis(14));
        assert_eq!(rec.events().len(), 2);
        clock.advance(Duration::from_millis(1));
        assert_eq!(rec.events().last(), Some(&Seen::Update(0, "ok".to_string())));

        // The line closes one character delay after its last character.
        clock.advance(Duration::from_millis(14));
        assert_eq!(rec.events().len(), 3);
        clock.advance(Duration::from_millis(1));
        assert_eq!(rec.events().last(), Some(&Seen::Finished(0)));
    }

    #[test]
    fn test_later_lines_start_with_a_character() {
        let (clock, playback) = setup();
        let rec = Recorder::default();
        playback.play(script(&[0, 2]), rec.clone());

        // The empty line finishes at once; the next starts after the gap.
        assert_eq!(rec.events(), vec![Seen::Started(0, None), Seen::Finished(0)]);
        clock.advance(Duration::from_millis(200));
        assert_eq!(
            &rec.events()[2..],
            &[Seen::Started(1, None), Seen::Update(1, "x".to_string())]
        );
    }

    #[test]
    fn test_no_events_after_cancel() {
        let (clock, playback) = setup();
        let rec = Recorder::default();
        playback.play(script(&[0, 5, 10]), rec.clone());

        // Midway through the second line.
        clock.advance(Duration::from_millis(200 + 3 * 15));
        let before = rec.events();
        assert_eq!(before.last(), Some(&Seen::Update(1, "xxxx".to_string())));

        playback.cancel();
        assert_eq!(clock.pending(), 0);
        clock.advance(Duration::from_secs(10));
        assert_eq!(rec.events(), before);
    }

    #[test]
    fn test_drop_cancels_pending_timers() {
        let (clock, playback) = setup();
        let rec = Recorder::default();
        playback.play(script(&[4]), rec.clone());
        drop(playback);

        assert_eq!(clock.pending(), 0);
        clock.run_until_idle();
        assert_eq!(
            rec.events(),
            vec![Seen::Started(0, None), Seen::Update(0, "x".to_string())]
        );
    }

    #[test]
    fn test_reentrant_play_is_ignored() {
        let (clock, playback) = setup();
        let first = Recorder::default();
        let second = Recorder::default();

        assert!(playback.play(script(&[3]), first.clone()));
        assert!(!playback.play(script(&[3]), second.clone()));
        clock.run_until_idle();

        assert!(second.events().is_empty());
        assert_eq!(first.events().last(), Some(&Seen::Done));

        // A finished engine may play again.
        assert!(playback.play(script(&[1]), second.clone()));
        clock.run_until_idle();
        assert_eq!(second.events().last(), Some(&Seen::Done));
    }

    #[test]
    fn test_play_after_cancel_is_ignored() {
        let (_clock, playback) = setup();
        playback.cancel();
        let rec = Recorder::default();
        assert!(!playback.play(script(&[1]), rec.clone()));
        assert!(rec.events().is_empty());
    }

    #[test]
    fn test_empty_script_finishes_at_once() {
        let (clock, playback) = setup();
        let rec = Recorder::default();
        playback.play(Vec::<ScriptLine>::new(), rec.clone());
        assert_eq!(rec.events(), vec![Seen::Done]);
        assert_eq!(clock.pending(), 0);
        assert!(!playback.is_running());
    }

    #[test]
    fn test_sink_cancelling_mid_line() {
        struct StopAfterTwo {
            seen: Rc<Cell<usize>>,
            playback: Rc<RefCell<Option<Rc<ScriptedPlayback>>>>,
        }

        impl PlaybackSink for StopAfterTwo {
            fn update(&mut self, _index: usize, _partial: &str) {
                self.seen.set(self.seen.get() + 1);
                if self.seen.get() == 2 {
                    if let Some(p) = self.playback.borrow().as_ref() {
                        p.cancel();
                    }
                }
            }

            fn done(&mut self) {
                panic!("cancelled playback must not finish");
            }
        }

        let clock = Rc::new(ManualScheduler::new());
        let playback = Rc::new(ScriptedPlayback::new(clock.clone(), Pacing::default()));
        let slot = Rc::new(RefCell::new(Some(Rc::clone(&playback))));
        let seen = Rc::new(Cell::new(0));

        playback.play(
            script(&[5]),
            StopAfterTwo {
                seen: Rc::clone(&seen),
                playback: Rc::clone(&slot),
            },
        );
        clock.run_until_idle();
        slot.borrow_mut().take();

        assert_eq!(seen.get(), 2);
    }
}
