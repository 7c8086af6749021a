use serde::{Deserialize, Serialize};

use crate::types::{ChatTurn, TurnId};

/// State transitions of a conversation session.
///
/// Published after the session's history has changed, so a consumer
/// applying them in order reproduces the session's turn list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum SessionEvent {
    /// A turn was appended to the end of the history.
    TurnAppended { turn: ChatTurn },

    /// A turn (always a pending placeholder) was removed.
    TurnRemoved { id: TurnId },

    /// The session was closed; no further events follow.
    Closed,
}

impl SessionEvent {
    /// Apply this event to a rendered copy of the history.
    pub fn apply(&self, turns: &mut Vec<ChatTurn>) {
        match self {
            SessionEvent::TurnAppended { turn } => turns.push(turn.clone()),
            SessionEvent::TurnRemoved { id } => turns.retain(|t| t.id != *id),
            SessionEvent::Closed => {}
        }
    }
}
