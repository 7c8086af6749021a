use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// Who a chat turn belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    /// Text typed (or picked from a suggestion) by the visitor.
    User,
    /// A resolved assistant answer, or the welcome message.
    Bot,
    /// Placeholder shown while an answer is being "thought about".
    /// Removed, never relabeled, once the answer arrives.
    BotPending,
}

/// Semantic style tag on a scripted line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emphasis {
    /// Something completed successfully (`[OK]` lines).
    Success,
    /// Informational detail.
    Info,
    /// Final, highlighted status.
    Strong,
}

// =============================================================================
// Newtype Wrappers
// =============================================================================

/// Unique identifier for a chat turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TurnId(pub Uuid);

impl TurnId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TurnId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TurnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Unix timestamp in seconds since epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp())
    }
}

// =============================================================================
// Chat
// =============================================================================

/// Link from an answer back to the knowledge chunk it came from.
///
/// The UI decides how to render it (anchor, footnote, plain text).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub chunk_id: String,
    pub title: String,
}

/// One entry of a conversation history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub id: TurnId,
    pub role: TurnRole,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceRef>,
    pub created_at: Timestamp,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self::with_role(TurnRole::User, text.into(), None)
    }

    pub fn bot(text: impl Into<String>, source: Option<SourceRef>) -> Self {
        Self::with_role(TurnRole::Bot, text.into(), source)
    }

    /// A "typing..." placeholder.
    pub fn pending() -> Self {
        Self::with_role(TurnRole::BotPending, "...".to_string(), None)
    }

    pub fn is_pending(&self) -> bool {
        self.role == TurnRole::BotPending
    }

    fn with_role(role: TurnRole, text: String, source: Option<SourceRef>) -> Self {
        Self {
            id: TurnId::new(),
            role,
            text,
            source,
            created_at: Timestamp::now(),
        }
    }
}

// =============================================================================
// Scripted playback
// =============================================================================

/// One line of a pre-authored typewriter script.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptLine {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emphasis: Option<Emphasis>,
}

impl ScriptLine {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasis: None,
        }
    }

    pub fn styled(text: impl Into<String>, emphasis: Emphasis) -> Self {
        Self {
            text: text.into(),
            emphasis: Some(emphasis),
        }
    }
}
