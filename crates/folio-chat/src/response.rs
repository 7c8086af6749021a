//! Response generation for chat queries.
//!
//! Turns a retrieval outcome into answer text plus an optional source
//! reference. No markup is produced; rendering belongs to the UI.

use folio_core::config::ChatConfig;
use folio_core::knowledge::KnowledgeChunk;
use folio_core::types::{ChatTurn, SourceRef};

/// Answer content before it becomes a turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub source: Option<SourceRef>,
}

impl Answer {
    pub fn into_turn(self) -> ChatTurn {
        ChatTurn::bot(self.text, self.source)
    }
}

/// Composes the fixed bot messages and retrieval answers.
pub struct ResponseGenerator {
    welcome: String,
    fallback: String,
}

impl ResponseGenerator {
    pub fn new(config: &ChatConfig) -> Self {
        Self {
            welcome: config.welcome_message.clone(),
            fallback: config.fallback_message.clone(),
        }
    }

    /// The greeting that opens every session.
    pub fn welcome(&self) -> ChatTurn {
        ChatTurn::bot(self.welcome.clone(), None)
    }

    /// Answer for a retrieval result: the chunk's content with a link back
    /// to it, or the fallback message when nothing matched.
    pub fn compose(&self, hit: Option<&KnowledgeChunk>) -> Answer {
        match hit {
            Some(chunk) => Answer {
                text: chunk.content.clone(),
                source: Some(SourceRef {
                    chunk_id: chunk.id.clone(),
                    title: chunk.title.clone(),
                }),
            },
            None => Answer {
                text: self.fallback.clone(),
                source: None,
            },
        }
    }
}

impl Default for ResponseGenerator {
    fn default() -> Self {
        Self::new(&ChatConfig::default())
    }
}
