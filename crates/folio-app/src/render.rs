//! Terminal output: chat turns, typewriter playback and demo progress.

use std::io::{self, IsTerminal, Write};

use serde_json::json;
use tokio::sync::oneshot;

use folio_core::types::{ChatTurn, Emphasis, TurnRole};
use folio_timeline::{DemoEvent, PlaybackSink, RenderedLine};

const RESET: &str = "\x1b[0m";

/// Whether stdout should carry ANSI colors.
pub fn color_enabled() -> bool {
    io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

fn ansi(emphasis: Emphasis) -> &'static str {
    match emphasis {
        Emphasis::Success => "\x1b[32m",
        Emphasis::Info => "\x1b[36m",
        Emphasis::Strong => "\x1b[1;32m",
    }
}

pub fn paint(text: &str, emphasis: Option<Emphasis>, color: bool) -> String {
    match emphasis {
        Some(e) if color => format!("{}{}{}", ansi(e), text, RESET),
        _ => text.to_string(),
    }
}

pub fn format_turn(turn: &ChatTurn) -> String {
    match turn.role {
        TurnRole::User => format!("you> {}", turn.text),
        TurnRole::BotPending => format!("folio> {}", turn.text),
        TurnRole::Bot => match &turn.source {
            Some(source) => format!(
                "folio> {}\n       [source: {} ({})]",
                turn.text, source.title, source.chunk_id
            ),
            None => format!("folio> {}", turn.text),
        },
    }
}

pub fn format_demo_event(event: &DemoEvent) -> String {
    match event {
        DemoEvent::Log(line) => format!("> {line}"),
        DemoEvent::Progress { processed, total } => {
            let percent = if *total == 0 {
                100
            } else {
                u64::from(*processed) * 100 / u64::from(*total)
            };
            format!("culled {processed}/{total} photos ({percent}%)")
        }
        DemoEvent::Finished => "> done".to_string(),
    }
}

pub fn demo_event_json(event: &DemoEvent) -> serde_json::Value {
    match event {
        DemoEvent::Log(line) => json!({ "type": "log", "line": line }),
        DemoEvent::Progress { processed, total } => {
            json!({ "type": "progress", "processed": processed, "total": total })
        }
        DemoEvent::Finished => json!({ "type": "finished" }),
    }
}

pub fn transcript_json(lines: &[RenderedLine]) -> serde_json::Value {
    lines
        .iter()
        .map(|line| json!({ "text": line.text, "emphasis": line.emphasis }))
        .collect()
}

/// Writes playback to stdout as it is typed and signals completion.
pub struct TypewriterSink {
    color: bool,
    styled: bool,
    /// Bytes of the current line already written.
    shown: usize,
    done: Option<oneshot::Sender<()>>,
}

impl TypewriterSink {
    pub fn new(color: bool, done: oneshot::Sender<()>) -> Self {
        Self {
            color,
            styled: false,
            shown: 0,
            done: Some(done),
        }
    }
}

impl PlaybackSink for TypewriterSink {
    fn line_started(&mut self, _index: usize, emphasis: Option<Emphasis>) {
        self.shown = 0;
        self.styled = false;
        if let (true, Some(e)) = (self.color, emphasis) {
            print!("{}", ansi(e));
            self.styled = true;
        }
    }

    fn update(&mut self, _index: usize, partial: &str) {
        print!("{}", partial.get(self.shown..).unwrap_or_default());
        self.shown = partial.len();
        let _ = io::stdout().flush();
    }

    fn line_finished(&mut self, _index: usize) {
        if self.styled {
            print!("{RESET}");
        }
        println!();
    }

    fn done(&mut self) {
        if let Some(tx) = self.done.take() {
            let _ = tx.send(());
        }
    }
}

/// Signals completion without writing anything.
pub struct Completion(Option<oneshot::Sender<()>>);

impl Completion {
    pub fn new(done: oneshot::Sender<()>) -> Self {
        Self(Some(done))
    }
}

impl PlaybackSink for Completion {
    fn update(&mut self, _index: usize, _partial: &str) {}

    fn done(&mut self) {
        if let Some(tx) = self.0.take() {
            let _ = tx.send(());
        }
    }
}
