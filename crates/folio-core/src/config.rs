use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{FolioError, Result};

/// Top-level configuration for folio.
///
/// Loaded from `~/.folio/config.toml` by default. Every field has a
/// default, so an empty file (or no file) is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolioConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub demo: DemoConfig,
}

impl FolioConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: FolioConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    ///
    /// A missing file is logged at debug level only.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Render as pretty TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| FolioError::Config(e.to_string()))
    }
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// Optional JSON knowledge base replacing the built-in resume.
    pub knowledge_path: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            knowledge_path: None,
        }
    }
}

/// Chat assistant settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Simulated "thinking" latency before an answer appears.
    pub thinking_delay_ms: u64,
    /// First bot turn of every session.
    pub welcome_message: String,
    /// Answer used when no chunk matches the question.
    pub fallback_message: String,
}

impl ChatConfig {
    pub fn thinking_delay(&self) -> Duration {
        Duration::from_millis(self.thinking_delay_ms)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            thinking_delay_ms: 1200,
            welcome_message: "Hi! I'm an AI assistant trained on Shubham's resume. Ask me about his SaaS platform 'Bridge', his local-first app 'FlashCull', or his tech stack!".to_string(),
            fallback_message: "I'm not sure I have details on that. Try asking about Bridge, FlashCull, Next.js, or Shubham's experience.".to_string(),
        }
    }
}

/// Typewriter pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Delay before each revealed character.
    pub char_delay_ms: u64,
    /// Pause after a line is complete.
    pub line_delay_ms: u64,
}

impl PlaybackConfig {
    pub fn char_delay(&self) -> Duration {
        Duration::from_millis(self.char_delay_ms)
    }

    pub fn line_delay(&self) -> Duration {
        Duration::from_millis(self.line_delay_ms)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            char_delay_ms: 15,
            line_delay_ms: 200,
        }
    }
}

/// Project demo timelines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Interval between Bridge log lines.
    pub bridge_step_ms: u64,
    /// Interval between FlashCull counter ticks.
    pub cull_tick_ms: u64,
    /// Photos processed per FlashCull tick.
    pub cull_batch: u32,
    /// Photos in the FlashCull demo library.
    pub cull_total: u32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            bridge_step_ms: 800,
            cull_tick_ms: 50,
            cull_batch: 125,
            cull_total: 5000,
        }
    }
}
