//! Timer-driven timelines for folio.
//!
//! A small single-threaded scheduling layer (real tokio timers or a
//! deterministic manual clock) and the scripted animations built on it:
//! the typewriter playback, the boot terminal and the project demos.

pub mod demo;
pub mod manual;
pub mod playback;
pub mod runtime;
pub mod scheduler;
pub mod terminal;

pub use demo::{DemoEvent, DemoRunner, DemoScript};
pub use manual::ManualScheduler;
pub use playback::{Pacing, PlaybackSink, ScriptedPlayback};
pub use runtime::TokioScheduler;
pub use scheduler::{Scheduler, Task, TimerGroup, TimerId};
pub use terminal::{BootTerminal, RenderedLine};
