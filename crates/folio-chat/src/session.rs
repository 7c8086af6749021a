//! Turn-based chat session.
//!
//! Each submitted question appends a user turn and a pending placeholder,
//! then resolves after a fixed "thinking" delay: the placeholder is removed
//! and the answer appended. Submissions are independent: several may be
//! pending at once, each resolving on its own timer.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use folio_core::config::ChatConfig;
use folio_core::events::SessionEvent;
use folio_core::resume::SUGGESTIONS;
use folio_core::types::{ChatTurn, TurnId};
use folio_timeline::scheduler::{Scheduler, TimerGroup};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::response::ResponseGenerator;
use crate::retrieval::RetrievalEngine;

struct SessionCore {
    engine: Arc<RetrievalEngine>,
    responder: ResponseGenerator,
    turns: RefCell<Vec<ChatTurn>>,
    subscribers: RefCell<Vec<UnboundedSender<SessionEvent>>>,
    closed: Cell<bool>,
}

impl SessionCore {
    fn publish(&self, event: SessionEvent) {
        self.subscribers
            .borrow_mut()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn append(&self, turn: ChatTurn) {
        self.turns.borrow_mut().push(turn.clone());
        self.publish(SessionEvent::TurnAppended { turn });
    }

    /// Replace the pending turn `pending` with the answer to `query`.
    fn resolve(&self, pending: TurnId, query: &str) {
        if self.closed.get() {
            return;
        }

        let removed = {
            let mut turns = self.turns.borrow_mut();
            let before = turns.len();
            turns.retain(|t| t.id != pending);
            turns.len() != before
        };
        if !removed {
            tracing::debug!(%pending, "Pending turn already gone; resolution skipped");
            return;
        }
        self.publish(SessionEvent::TurnRemoved { id: pending });

        let hit = self.engine.search(query);
        let answer = self.responder.compose(hit);
        tracing::info!(
            matched = answer.source.is_some(),
            source = answer.source.as_ref().map(|s| s.chunk_id.as_str()),
            "Answer resolved"
        );
        self.append(answer.into_turn());
    }
}

/// One visitor's conversation with the resume assistant.
///
/// Closing or dropping the session cancels every outstanding answer.
pub struct ConversationSession {
    core: Rc<SessionCore>,
    timers: TimerGroup,
    thinking_delay: Duration,
}

impl ConversationSession {
    pub fn new(
        engine: Arc<RetrievalEngine>,
        scheduler: Rc<dyn Scheduler>,
        config: &ChatConfig,
    ) -> Self {
        Self {
            core: Rc::new(SessionCore {
                engine,
                responder: ResponseGenerator::new(config),
                turns: RefCell::new(Vec::new()),
                subscribers: RefCell::new(Vec::new()),
                closed: Cell::new(false),
            }),
            timers: TimerGroup::new(scheduler),
            thinking_delay: config.thinking_delay(),
        }
    }

    /// Receive every future [`SessionEvent`].
    pub fn subscribe(&self) -> UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.core.subscribers.borrow_mut().push(tx);
        rx
    }

    /// Show the session: greet the visitor if nothing has been said yet.
    pub fn open(&self) {
        if self.core.closed.get() || !self.core.turns.borrow().is_empty() {
            return;
        }
        self.core.append(self.core.responder.welcome());
    }

    /// Ask a question.
    ///
    /// Blank input is ignored and yields `None`. Otherwise the user turn and
    /// a pending placeholder are appended and the placeholder's id returned;
    /// the answer replaces it after the thinking delay.
    pub fn submit(&self, query: &str) -> Option<TurnId> {
        let query = query.trim();
        if query.is_empty() {
            tracing::debug!("Blank query ignored");
            return None;
        }
        if self.core.closed.get() {
            tracing::debug!("Query after close ignored");
            return None;
        }

        self.core.append(ChatTurn::user(query));
        let pending = ChatTurn::pending();
        let pending_id = pending.id;
        self.core.append(pending);

        let core = Rc::downgrade(&self.core);
        let query = query.to_string();
        self.timers.schedule(self.thinking_delay, move || {
            if let Some(core) = core.upgrade() {
                core.resolve(pending_id, &query);
            }
        });

        tracing::debug!(%pending_id, "Query submitted");
        Some(pending_id)
    }

    /// Tear the session down.
    ///
    /// Cancels outstanding answers and drops their placeholders. Later
    /// `open` and `submit` calls do nothing.
    pub fn close(&self) {
        if self.core.closed.replace(true) {
            return;
        }
        self.timers.cancel_all();

        let stale: Vec<TurnId> = {
            let mut turns = self.core.turns.borrow_mut();
            let stale = turns
                .iter()
                .filter(|t| t.is_pending())
                .map(|t| t.id)
                .collect();
            turns.retain(|t| !t.is_pending());
            stale
        };
        for id in stale {
            self.core.publish(SessionEvent::TurnRemoved { id });
        }
        self.core.publish(SessionEvent::Closed);
        self.core.subscribers.borrow_mut().clear();
        tracing::debug!("Session closed");
    }

    /// Snapshot of the history, oldest first.
    pub fn turns(&self) -> Vec<ChatTurn> {
        self.core.turns.borrow().clone()
    }

    /// Number of questions still waiting for an answer.
    pub fn pending_count(&self) -> usize {
        self.core
            .turns
            .borrow()
            .iter()
            .filter(|t| t.is_pending())
            .count()
    }

    pub fn is_closed(&self) -> bool {
        self.core.closed.get()
    }

    /// Pre-canned questions; submit them like any other query.
    pub fn suggestions(&self) -> &'static [&'static str] {
        &SUGGESTIONS
    }
}

impl Drop for ConversationSession {
    fn drop(&mut self) {
        self.timers.cancel_all();
    }
}
