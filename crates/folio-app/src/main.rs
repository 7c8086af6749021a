//! folio application binary - composition root.
//!
//! Ties the folio crates into a single executable:
//! 1. Initialize tracing to stderr
//! 2. Resolve and load configuration from TOML, then apply its log level
//! 3. Load the knowledge base (a JSON file or the built-in resume)
//! 4. Run the requested command on a single-threaded runtime
//!
//! Sessions, playback and demos hold `Rc` state and schedule timers with
//! `spawn_local`, so every command runs inside a [`LocalSet`].

mod cli;
mod render;

use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use clap::Parser;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::oneshot;
use tokio::task::LocalSet;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

use folio_chat::retrieval::normalize_query;
use folio_chat::{ConversationSession, RetrievalEngine};
use folio_core::config::FolioConfig;
use folio_core::knowledge::KnowledgeBase;
use folio_core::resume::boot_script;
use folio_core::types::{ChatTurn, Emphasis, TurnRole};
use folio_core::SessionEvent;
use folio_timeline::{
    BootTerminal, DemoEvent, DemoRunner, DemoScript, ManualScheduler, Pacing, Scheduler,
    TokioScheduler,
};

use cli::{CliArgs, Command, DemoKind, OutputFormat};
use render::{Completion, TypewriterSink};

type AppResult<T> = Result<T, Box<dyn std::error::Error>>;

const DEFAULT_LOG_FILTER: &str = "warn";

#[tokio::main(flavor = "current_thread")]
async fn main() -> AppResult<()> {
    let args = CliArgs::parse();

    let filter = init_tracing(
        args.log_level_override()
            .as_deref()
            .unwrap_or(DEFAULT_LOG_FILTER),
    );

    let config_file = args.resolve_config_path();
    let config = FolioConfig::load_or_default(&config_file);
    tracing::debug!(path = %config_file.display(), "Configuration resolved");

    let level = args.resolve_log_level(&config);
    if let Err(e) = filter.reload(parse_filter(&level)) {
        tracing::warn!(error = %e, "Failed to apply configured log level");
    }

    let local = LocalSet::new();
    local.run_until(run(args, config)).await
}

fn parse_filter(filter: &str) -> EnvFilter {
    EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Install the stderr subscriber. The returned handle swaps the filter once
/// the config file's level is known.
fn init_tracing(filter: &str) -> reload::Handle<EnvFilter, Registry> {
    let (filter, handle) = reload::Layer::new(parse_filter(filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
    handle
}

async fn run(args: CliArgs, config: FolioConfig) -> AppResult<()> {
    let format = args.format;
    match &args.command {
        Command::Ask { query } => {
            let engine = build_engine(&args, &config)?;
            ask(engine, &config, &CliArgs::query_text(query), format)
        }
        Command::Explain { query } => {
            let engine = build_engine(&args, &config)?;
            explain(&engine, &CliArgs::query_text(query), format)
        }
        Command::Chat => {
            let engine = build_engine(&args, &config)?;
            chat(engine, &config, format).await
        }
        Command::Boot { instant } => boot(&config, *instant, format).await,
        Command::Demo { which, instant } => demo(&config, *which, *instant, format).await,
        Command::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn build_engine(args: &CliArgs, config: &FolioConfig) -> AppResult<Arc<RetrievalEngine>> {
    let knowledge = match args.resolve_knowledge_path(config) {
        Some(path) => load_knowledge(&path)?,
        None => KnowledgeBase::resume(),
    };
    tracing::debug!(chunks = knowledge.len(), "Knowledge base ready");
    Ok(Arc::new(RetrievalEngine::new(Arc::new(knowledge))))
}

fn load_knowledge(path: &Path) -> AppResult<KnowledgeBase> {
    KnowledgeBase::load(path).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Failed to load knowledge base");
        e.into()
    })
}

/// Timer source for playback and demos.
enum Clock {
    /// Deterministic clock drained at once.
    Instant(Rc<ManualScheduler>),
    /// Wall-clock timers on the local task set.
    RealTime(Rc<TokioScheduler>),
}

impl Clock {
    fn new(instant: bool) -> Self {
        if instant {
            Clock::Instant(Rc::new(ManualScheduler::new()))
        } else {
            Clock::RealTime(Rc::new(TokioScheduler::new()))
        }
    }

    fn scheduler(&self) -> Rc<dyn Scheduler> {
        match self {
            Clock::Instant(clock) => Rc::clone(clock) as Rc<dyn Scheduler>,
            Clock::RealTime(runtime) => Rc::clone(runtime) as Rc<dyn Scheduler>,
        }
    }

    /// Drive timers until `done` fires. Returns false if interrupted.
    async fn settle(&self, done: oneshot::Receiver<()>) -> bool {
        match self {
            Clock::Instant(clock) => {
                clock.run_until_idle();
                true
            }
            Clock::RealTime(_) => {
                tokio::select! {
                    _ = done => true,
                    _ = tokio::signal::ctrl_c() => false,
                }
            }
        }
    }
}

fn ask(
    engine: Arc<RetrievalEngine>,
    config: &FolioConfig,
    query: &str,
    format: OutputFormat,
) -> AppResult<()> {
    let clock = Rc::new(ManualScheduler::new());
    let scheduler: Rc<dyn Scheduler> = Rc::clone(&clock) as Rc<dyn Scheduler>;
    let session = ConversationSession::new(engine, scheduler, &config.chat);

    if session.submit(query).is_none() {
        return Err("the question is blank".into());
    }
    clock.run_until_idle();

    let answer = session
        .turns()
        .into_iter()
        .rev()
        .find(|turn| turn.role == TurnRole::Bot)
        .ok_or("no answer was produced")?;

    match format {
        OutputFormat::Text => println!("{}", render::format_turn(&answer)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&answer)?),
    }
    Ok(())
}

fn explain(engine: &RetrievalEngine, query: &str, format: OutputFormat) -> AppResult<()> {
    let scores = engine.score(query);
    let winner = engine.search(query);
    let normalized = normalize_query(query);
    let boosts = engine.triggered_boosts(query);
    let total = engine.knowledge().len();

    match format {
        OutputFormat::Json => {
            let matches: Vec<_> = scores
                .iter()
                .map(|s| json!({ "id": s.chunk.id, "title": s.chunk.title, "score": s.score }))
                .collect();
            let triggered: Vec<_> = boosts
                .iter()
                .map(|b| json!({ "trigger": b.trigger, "bonus": b.bonus }))
                .collect();
            let report = json!({
                "query": query,
                "normalized": normalized,
                "chunks": total,
                "boosts": triggered,
                "matches": matches,
                "answer": winner.map(|chunk| &chunk.id),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            println!("normalized: {normalized}");
            for boost in &boosts {
                println!("boost: \"{}\" +{}", boost.trigger, boost.bonus);
            }
            println!("scored {} of {} chunks", scores.len(), total);
            if scores.is_empty() {
                println!("no chunk scored; the fallback answer is used");
            }
            for s in &scores {
                // Ids are not unique, so compare the chunk itself.
                let mark = if winner.is_some_and(|w| std::ptr::eq(w, s.chunk)) {
                    '*'
                } else {
                    ' '
                };
                println!("{mark} {:>4}  {:<24} {}", s.score, s.chunk.id, s.chunk.title);
            }
        }
    }
    Ok(())
}

/// Print `event` and replay it onto the local transcript.
fn handle_event(
    event: &SessionEvent,
    transcript: &mut Vec<ChatTurn>,
    format: OutputFormat,
) -> AppResult<()> {
    event.apply(transcript);
    print_event(event, format)
}

fn print_event(event: &SessionEvent, format: OutputFormat) -> AppResult<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(event)?),
        OutputFormat::Text => {
            // The visitor's own input is already on screen.
            if let SessionEvent::TurnAppended { turn } = event {
                if turn.role != TurnRole::User {
                    println!("{}", render::format_turn(turn));
                }
            }
        }
    }
    Ok(())
}

async fn chat(
    engine: Arc<RetrievalEngine>,
    config: &FolioConfig,
    format: OutputFormat,
) -> AppResult<()> {
    let scheduler = Rc::new(TokioScheduler::new());
    let session = ConversationSession::new(engine, scheduler, &config.chat);
    let mut events = session.subscribe();
    let mut transcript = Vec::new();
    session.open();
    while let Ok(event) = events.try_recv() {
        handle_event(&event, &mut transcript, format)?;
    }

    let suggestions = session.suggestions();
    if format == OutputFormat::Text {
        println!();
        for (i, suggestion) in suggestions.iter().enumerate() {
            println!("  {}. {}", i + 1, suggestion);
        }
        println!("Ask a question, pick a number, or type /quit.");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;

    loop {
        if !input_open && session.pending_count() == 0 {
            break;
        }
        tokio::select! {
            line = lines.next_line(), if input_open => match line? {
                None => input_open = false,
                Some(raw) => {
                    let line = raw.trim();
                    if line == "/quit" || line == "/exit" {
                        break;
                    }
                    let query = match line.parse::<usize>() {
                        Ok(n) if (1..=suggestions.len()).contains(&n) => suggestions[n - 1],
                        _ => line,
                    };
                    session.submit(query);
                }
            },
            Some(event) = events.recv() => handle_event(&event, &mut transcript, format)?,
            _ = tokio::signal::ctrl_c() => break,
            else => break,
        }
    }

    // Answers resolved on the last tick are already queued.
    while let Ok(event) = events.try_recv() {
        handle_event(&event, &mut transcript, format)?;
    }
    session.close();
    while let Ok(event) = events.try_recv() {
        event.apply(&mut transcript);
        if format == OutputFormat::Json {
            print_event(&event, format)?;
        }
    }
    tracing::info!(turns = transcript.len(), "Chat session closed");
    Ok(())
}

async fn boot(config: &FolioConfig, instant: bool, format: OutputFormat) -> AppResult<()> {
    let clock = Clock::new(instant);
    let terminal = BootTerminal::new(
        clock.scheduler(),
        Pacing::from(&config.playback),
        boot_script(),
    );

    let (tx, rx) = oneshot::channel();
    match format {
        OutputFormat::Text => terminal.open(TypewriterSink::new(render::color_enabled(), tx)),
        OutputFormat::Json => terminal.open(Completion::new(tx)),
    };

    if !clock.settle(rx).await {
        if terminal.is_typing() {
            terminal.close();
            tracing::info!(
                lines = terminal.lines().len(),
                "Boot playback interrupted"
            );
        }
        return Ok(());
    }

    if format == OutputFormat::Json {
        let transcript = render::transcript_json(&terminal.lines());
        println!("{}", serde_json::to_string_pretty(&transcript)?);
    }
    Ok(())
}

async fn demo(
    config: &FolioConfig,
    which: DemoKind,
    instant: bool,
    format: OutputFormat,
) -> AppResult<()> {
    let clock = Clock::new(instant);
    let runner = DemoRunner::new(clock.scheduler());
    let script = match which {
        DemoKind::Bridge => DemoScript::bridge(&config.demo),
        DemoKind::Flashcull => DemoScript::flashcull(&config.demo),
    };

    let (tx, rx) = oneshot::channel();
    let mut done = Some(tx);
    let color = render::color_enabled();
    runner.start(script, move |event| {
        match format {
            OutputFormat::Text => {
                let emphasis = (event == DemoEvent::Finished).then_some(Emphasis::Success);
                println!(
                    "{}",
                    render::paint(&render::format_demo_event(&event), emphasis, color)
                );
            }
            OutputFormat::Json => println!("{}", render::demo_event_json(&event)),
        }
        if event == DemoEvent::Finished {
            if let Some(tx) = done.take() {
                let _ = tx.send(());
            }
        }
    });

    if !clock.settle(rx).await {
        runner.cancel();
        tracing::info!(demo = ?which, "Demo interrupted");
    }
    Ok(())
}
