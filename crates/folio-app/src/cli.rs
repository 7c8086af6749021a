//! CLI argument definitions for the folio binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use folio_core::config::FolioConfig;

/// Ask questions about a resume, or replay the portfolio timelines.
#[derive(Parser, Debug)]
#[command(name = "folio", version, about)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// JSON knowledge base to use instead of the built-in resume.
    #[arg(short = 'k', long = "knowledge", global = true)]
    pub knowledge: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DemoKind {
    /// Multi-tenant boot log of the Bridge SaaS.
    Bridge,
    /// Photo culling counter of FlashCull.
    Flashcull,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ask a single question and print the answer
    Ask {
        /// The question
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Show how every knowledge chunk scores for a question
    Explain {
        /// The question
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Start an interactive chat session
    Chat,

    /// Play the terminal boot script
    Boot {
        /// Print immediately instead of typing in real time
        #[arg(long)]
        instant: bool,
    },

    /// Run a project demo timeline
    Demo {
        /// Which demo
        #[arg(value_enum)]
        which: DemoKind,
        /// Run without waiting between ticks
        #[arg(long)]
        instant: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > FOLIO_CONFIG env var > ~/.folio/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("FOLIO_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the knowledge base file, if any.
    ///
    /// Priority: --knowledge flag > config `general.knowledge_path`.
    /// `None` means the built-in resume.
    pub fn resolve_knowledge_path(&self, config: &FolioConfig) -> Option<PathBuf> {
        self.knowledge
            .clone()
            .or_else(|| config.general.knowledge_path.as_ref().map(PathBuf::from))
    }

    /// Log filter given on the command line or in the environment.
    ///
    /// Priority: --log-level flag > RUST_LOG env var.
    pub fn log_level_override(&self) -> Option<String> {
        if let Some(ref level) = self.log_level {
            return Some(level.clone());
        }
        std::env::var("RUST_LOG")
            .ok()
            .filter(|filter| !filter.trim().is_empty())
    }

    /// Resolve the log filter.
    ///
    /// Priority: --log-level flag > RUST_LOG env var > config file value.
    pub fn resolve_log_level(&self, config: &FolioConfig) -> String {
        self.log_level_override()
            .unwrap_or_else(|| config.general.log_level.clone())
    }

    /// The question for `ask` / `explain`, words joined by spaces.
    pub fn query_text(words: &[String]) -> String {
        words.join(" ")
    }
}

/// Default config file path.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".folio").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".folio").join("config.toml");
    }
    PathBuf::from("config.toml")
}
