//! Keyword-scoring retrieval over the knowledge base.
//!
//! Every chunk is scored against the query and the single best chunk is
//! returned. Scores:
//! - +1 per query token found inside the chunk content,
//! - +3 per query token equal to one of the chunk's keywords,
//! - fixed boosts when the normalized query contains a trigger word.
//!
//! Ties go to the chunk declared first.

use std::sync::{Arc, LazyLock};

use folio_core::knowledge::{KnowledgeBase, KnowledgeChunk};
use folio_core::resume::{BRIDGE_CHUNK_ID, FLASHCULL_CHUNK_ID};
use regex::Regex;

/// Tokens shorter than this are ignored.
const MIN_TOKEN_CHARS: usize = 3;

const CONTENT_HIT: u32 = 1;
const KEYWORD_HIT: u32 = 3;

static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?,.]").expect("Invalid punctuation regex"));

/// Lowercase and strip `?`, `,` and `.`.
pub fn normalize_query(query: &str) -> String {
    PUNCTUATION
        .replace_all(&query.to_lowercase(), "")
        .into_owned()
}

/// Split a normalized query into scoring tokens.
pub fn tokenize(normalized: &str) -> Vec<&str> {
    normalized
        .split_whitespace()
        .filter(|t| t.chars().count() >= MIN_TOKEN_CHARS)
        .collect()
}

// =============================================================================
// Boosts
// =============================================================================

/// Which chunks a boost applies to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BoostTarget {
    /// Chunks whose id equals this value.
    ChunkId(String),
    /// Chunks whose id contains this value.
    IdContains(String),
}

impl BoostTarget {
    fn matches(&self, chunk: &KnowledgeChunk) -> bool {
        match self {
            BoostTarget::ChunkId(id) => chunk.id == *id,
            BoostTarget::IdContains(part) => chunk.id.contains(part.as_str()),
        }
    }
}

/// Fixed bonus granted when the normalized query contains `trigger`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Boost {
    pub trigger: String,
    pub target: BoostTarget,
    pub bonus: u32,
}

impl Boost {
    pub fn new(trigger: &str, target: BoostTarget, bonus: u32) -> Self {
        Self {
            trigger: trigger.to_lowercase(),
            target,
            bonus,
        }
    }

    /// Boosts tuned for the built-in resume.
    pub fn resume_defaults() -> Vec<Boost> {
        vec![
            Boost::new("bridge", BoostTarget::ChunkId(BRIDGE_CHUNK_ID.into()), 10),
            Boost::new("flashcull", BoostTarget::ChunkId(FLASHCULL_CHUNK_ID.into()), 10),
            Boost::new("performance", BoostTarget::ChunkId(FLASHCULL_CHUNK_ID.into()), 5),
            Boost::new("stack", BoostTarget::IdContains("skills".into()), 5),
        ]
    }
}

// =============================================================================
// RetrievalEngine
// =============================================================================

/// A chunk and its score for one query. Borrowed from the engine, so it
/// cannot outlive the call that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoredChunk<'a> {
    pub chunk: &'a KnowledgeChunk,
    pub score: u32,
}

/// Scores queries against an immutable knowledge base.
pub struct RetrievalEngine {
    knowledge: Arc<KnowledgeBase>,
    /// Lowercased content, parallel to `knowledge.chunks()`.
    haystacks: Vec<String>,
    boosts: Vec<Boost>,
}

impl RetrievalEngine {
    /// Engine with the resume boost table.
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        Self::with_boosts(knowledge, Boost::resume_defaults())
    }

    pub fn with_boosts(knowledge: Arc<KnowledgeBase>, boosts: Vec<Boost>) -> Self {
        for boost in &boosts {
            if let BoostTarget::ChunkId(id) = &boost.target {
                if knowledge.find(id).is_none() {
                    tracing::debug!(trigger = %boost.trigger, chunk = %id, "Boost target not in knowledge base");
                }
            }
        }

        let haystacks = knowledge
            .iter()
            .map(|chunk| chunk.content.to_lowercase())
            .collect();
        Self {
            knowledge,
            haystacks,
            boosts,
        }
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Boosts whose trigger appears in `query` once normalized.
    pub fn triggered_boosts(&self, query: &str) -> Vec<&Boost> {
        let normalized = normalize_query(query);
        self.boosts
            .iter()
            .filter(|b| normalized.contains(b.trigger.as_str()))
            .collect()
    }

    /// Every chunk with a positive score, in declaration order.
    pub fn score(&self, query: &str) -> Vec<ScoredChunk<'_>> {
        let normalized = normalize_query(query);
        let tokens = tokenize(&normalized);

        self.knowledge
            .iter()
            .zip(&self.haystacks)
            .filter_map(|(chunk, haystack)| {
                let mut score = 0;
                for token in &tokens {
                    if haystack.contains(token) {
                        score += CONTENT_HIT;
                    }
                    if chunk.has_keyword(token) {
                        score += KEYWORD_HIT;
                    }
                }
                score += self
                    .boosts
                    .iter()
                    .filter(|b| normalized.contains(b.trigger.as_str()) && b.target.matches(chunk))
                    .map(|b| b.bonus)
                    .sum::<u32>();

                (score > 0).then_some(ScoredChunk { chunk, score })
            })
            .collect()
    }

    /// The best-matching chunk, or `None` when nothing scores.
    pub fn search(&self, query: &str) -> Option<&KnowledgeChunk> {
        let mut best: Option<ScoredChunk<'_>> = None;
        for candidate in self.score(query) {
            match best {
                Some(b) if b.score >= candidate.score => {}
                _ => best = Some(candidate),
            }
        }

        match best {
            Some(hit) => {
                tracing::debug!(chunk = %hit.chunk.id, score = hit.score, "Retrieval hit");
                Some(hit.chunk)
            }
            None => {
                tracing::debug!("Retrieval miss");
                None
            }
        }
    }
}
