//! Retrieval strategies over the chunk store: sparse lexical ranking (RAG
//! path), budget-constrained multi-document context assembly (long-context
//! path), and the shared citation/formatting logic both depend on.

pub mod context;
pub mod long_context;
pub mod rag;
pub mod router;
pub mod tfidf;

pub use context::{build_citations, build_context, fallback_answer, format_chunk};
pub use long_context::LongContextEngine;
pub use rag::{RagEngine, SharedStore};
pub use router::RetrievalRouter;
pub use tfidf::{IndexError, TfidfIndex};
