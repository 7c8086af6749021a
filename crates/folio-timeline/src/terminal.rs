//! The "terminal boot" view: a transcript filled once by playback.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use folio_core::types::{Emphasis, ScriptLine};

use crate::playback::{Pacing, PlaybackSink, ScriptedPlayback};
use crate::scheduler::Scheduler;

/// A line as currently visible on the terminal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedLine {
    pub text: String,
    pub emphasis: Option<Emphasis>,
}

/// Records playback into the transcript, then forwards to the caller's sink.
struct Transcript<S> {
    lines: Rc<RefCell<Vec<RenderedLine>>>,
    echo: S,
}

impl<S: PlaybackSink> PlaybackSink for Transcript<S> {
    fn line_started(&mut self, index: usize, emphasis: Option<Emphasis>) {
        self.lines.borrow_mut().push(RenderedLine {
            text: String::new(),
            emphasis,
        });
        self.echo.line_started(index, emphasis);
    }

    fn update(&mut self, index: usize, partial: &str) {
        if let Some(line) = self.lines.borrow_mut().get_mut(index) {
            line.text.clear();
            line.text.push_str(partial);
        }
        self.echo.update(index, partial);
    }

    fn line_finished(&mut self, index: usize) {
        self.echo.line_finished(index);
    }

    fn done(&mut self) {
        self.echo.done();
    }
}

/// Boot terminal that types its script exactly once.
///
/// Only the first open starts playback; reopening later shows the
/// transcript as it stands.
pub struct BootTerminal {
    script: Rc<[ScriptLine]>,
    lines: Rc<RefCell<Vec<RenderedLine>>>,
    played: Cell<bool>,
    playback: ScriptedPlayback,
}

impl BootTerminal {
    pub fn new(scheduler: Rc<dyn Scheduler>, pacing: Pacing, script: Vec<ScriptLine>) -> Self {
        Self {
            script: script.into(),
            lines: Rc::new(RefCell::new(Vec::new())),
            played: Cell::new(false),
            playback: ScriptedPlayback::new(scheduler, pacing),
        }
    }

    /// Open the terminal, starting playback on first open.
    ///
    /// Returns whether playback started.
    pub fn open<S>(&self, echo: S) -> bool
    where
        S: PlaybackSink + 'static,
    {
        if self.played.get() || self.playback.is_running() {
            return false;
        }
        let started = self.playback.play(
            Rc::clone(&self.script),
            Transcript {
                lines: Rc::clone(&self.lines),
                echo,
            },
        );
        self.played.set(started);
        started
    }

    /// Snapshot of the visible transcript.
    pub fn lines(&self) -> Vec<RenderedLine> {
        self.lines.borrow().clone()
    }

    pub fn is_typing(&self) -> bool {
        self.playback.is_running()
    }

    /// Tear the view down, cancelling any playback in flight.
    pub fn close(&self) {
        self.playback.cancel();
    }
}
