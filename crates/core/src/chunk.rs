//! Shared data model: chunks, document summaries, citations, responses.

use serde::{Deserialize, Serialize};

/// An immutable unit of retrievable text with full provenance.
///
/// Chunks are created only during ingestion of their owning document and
/// removed only when that document is replaced or the store is cleared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// `"{doc_id}:{ordinal}"`, unique across the store.
    pub chunk_id: String,
    pub doc_id: String,
    /// Display name of the owning document.
    pub doc_name: String,
    /// 1-based page number within the document.
    pub page: usize,
    /// 1-based paragraph index within the page (start <= end).
    pub paragraph_start: usize,
    pub paragraph_end: usize,
    /// 0-based position within the document, assigned in ingestion order.
    pub ordinal: usize,
    /// Whitespace-normalized, non-empty chunk body.
    pub text: String,
}

/// Summary projection of one ingested document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// Derived deterministically from the display name; stable across
    /// re-ingestion of the same name.
    pub doc_id: String,
    pub doc_name: String,
    pub pages: usize,
    /// Chunk count produced; zero when no text was extractable.
    pub chunks: usize,
}

/// Deduplicated, truncated provenance record surfaced alongside an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub doc_name: String,
    pub page: usize,
    pub paragraph_start: usize,
    pub paragraph_end: usize,
    pub snippet: String,
}

/// Retrieval strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Rag,
    LongContext,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Rag => "rag",
            Mode::LongContext => "long_context",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of answering one question against the current corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub mode: Mode,
    pub answer: String,
    pub citations: Vec<Citation>,
    pub latency_ms: u64,
    /// Number of chunks forwarded as context.
    pub context_chunks: usize,
    /// Character count of the assembled context string.
    pub context_chars: usize,
    /// Estimated token count of the assembled context.
    pub context_tokens: usize,
}
