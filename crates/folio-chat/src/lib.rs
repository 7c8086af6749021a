//! Conversational interface for the portfolio.
//!
//! Keyword retrieval over the knowledge base, answer composition, and the
//! turn-based chat session that ties them to a scheduler.

pub mod response;
pub mod retrieval;
pub mod session;

pub use response::{Answer, ResponseGenerator};
pub use retrieval::{Boost, BoostTarget, RetrievalEngine, ScoredChunk};
pub use session::ConversationSession;
