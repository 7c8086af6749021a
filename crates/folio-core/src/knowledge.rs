//! The knowledge base the chat assistant answers from.
//!
//! A knowledge base is an ordered, immutable, non-empty list of chunks.
//! Declaration order matters: retrieval breaks score ties in favor of the
//! earlier chunk.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{FolioError, Result};

/// One retrievable unit of the knowledge base.
///
/// `id` is a topical anchor, not a primary key: several chunks may share it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeChunk {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl KnowledgeChunk {
    pub fn new(id: &str, title: &str, content: &str, keywords: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Whether `token` equals one of the curated keywords.
    pub fn has_keyword(&self, token: &str) -> bool {
        self.keywords.iter().any(|k| k == token)
    }
}

/// Immutable, ordered set of knowledge chunks.
#[derive(Clone, Debug)]
pub struct KnowledgeBase {
    chunks: Vec<KnowledgeChunk>,
}

impl KnowledgeBase {
    /// Build a knowledge base, normalizing keywords to trimmed lowercase.
    ///
    /// Fails if `chunks` is empty or a chunk has an empty id or content.
    pub fn new(chunks: Vec<KnowledgeChunk>) -> Result<Self> {
        if chunks.is_empty() {
            return Err(FolioError::EmptyKnowledgeBase);
        }

        let mut normalized = Vec::with_capacity(chunks.len());
        for (index, mut chunk) in chunks.into_iter().enumerate() {
            if chunk.id.trim().is_empty() {
                return Err(FolioError::InvalidChunk {
                    index,
                    reason: "id is empty".to_string(),
                });
            }
            if chunk.content.trim().is_empty() {
                return Err(FolioError::InvalidChunk {
                    index,
                    reason: format!("chunk '{}' has no content", chunk.id),
                });
            }
            chunk.keywords = chunk
                .keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect();
            normalized.push(chunk);
        }

        Ok(Self { chunks: normalized })
    }

    /// The built-in resume knowledge base.
    pub fn resume() -> Self {
        // The built-in data is non-empty and well-formed; see the tests.
        Self {
            chunks: crate::resume::chunks(),
        }
    }

    /// Parse a JSON array of `{id, title, content, keywords}` records.
    pub fn from_json(json: &str) -> Result<Self> {
        let chunks: Vec<KnowledgeChunk> = serde_json::from_str(json)?;
        Self::new(chunks)
    }

    /// Load a knowledge base from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let kb = Self::from_json(&content)?;
        info!(
            path = %path.display(),
            chunks = kb.len(),
            "Knowledge base loaded"
        );
        Ok(kb)
    }

    pub fn chunks(&self) -> &[KnowledgeChunk] {
        &self.chunks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KnowledgeChunk> {
        self.chunks.iter()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Always false for a constructed knowledge base.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// First chunk carrying `id`.
    pub fn find(&self, id: &str) -> Option<&KnowledgeChunk> {
        self.chunks.iter().find(|c| c.id == id)
    }
}

impl<'a> IntoIterator for &'a KnowledgeBase {
    type Item = &'a KnowledgeChunk;
    type IntoIter = std::slice::Iter<'a, KnowledgeChunk>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.iter()
    }
}
