//! Sparse lexical retrieval with a version-keyed index cache.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use docnav_core::config::RetrievalConfig;
use docnav_core::{AskResponse, Chunk, Mode};
use docnav_llm::AnswerService;
use docnav_store::DocumentStore;

use crate::context::{answer_or_fallback, build_citations, build_context, no_documents_response};
use crate::tfidf::TfidfIndex;

pub type SharedStore = Arc<RwLock<DocumentStore>>;

#[derive(Default)]
struct IndexCache {
    version: Option<u64>,
    index: Option<Arc<TfidfIndex>>,
}

/// Ranks the current corpus against a query by unigram+bigram cosine
/// similarity, rebuilding its index only when the store version moves.
pub struct RagEngine {
    store: SharedStore,
    llm: Arc<dyn AnswerService>,
    config: RetrievalConfig,
    cache: Mutex<IndexCache>,
}

impl RagEngine {
    pub fn new(store: SharedStore, llm: Arc<dyn AnswerService>, config: RetrievalConfig) -> Self {
        Self {
            store,
            llm,
            config,
            cache: Mutex::new(IndexCache::default()),
        }
    }

    pub async fn ask(&self, question: &str, top_k: usize) -> AskResponse {
        let started = Instant::now();

        let (version, chunks) = {
            let store = self.store.read().await;
            (store.version(), store.all_chunks().to_vec())
        };
        if chunks.is_empty() {
            return no_documents_response(Mode::Rag, started);
        }

        let index = self.ensure_index(version, &chunks).await;
        let scores = match index.as_deref() {
            Some(index) => index.similarities(question),
            None => vec![0.0; chunks.len()],
        };

        let mut ranked: Vec<(usize, f64)> = scores.into_iter().enumerate().collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut selected: Vec<Chunk> = ranked
            .iter()
            .take(top_k)
            .filter(|(_, score)| *score > 0.0)
            .map(|(i, _)| chunks[*i].clone())
            .collect();
        if selected.is_empty() {
            // No lexical overlap anywhere: degrade to rank order rather
            // than returning nothing from a non-empty corpus.
            selected = ranked
                .iter()
                .take(top_k)
                .map(|(i, _)| chunks[*i].clone())
                .collect();
        }

        let context = build_context(&selected);
        let context_tokens = self.llm.estimate_tokens(&context);
        let answer =
            answer_or_fallback(self.llm.as_ref(), Mode::Rag, question, &context, &selected).await;

        AskResponse {
            mode: Mode::Rag,
            answer,
            citations: build_citations(&selected, self.config.citation_max_items),
            latency_ms: started.elapsed().as_millis() as u64,
            context_chunks: selected.len(),
            context_chars: context.chars().count(),
            context_tokens,
        }
    }

    /// The (version, index) pair is read and replaced inside one critical
    /// section, so no query can observe a fresh version paired with a
    /// stale index.
    async fn ensure_index(&self, version: u64, chunks: &[Chunk]) -> Option<Arc<TfidfIndex>> {
        let mut cache = self.cache.lock().await;
        if cache.version == Some(version) {
            return cache.index.clone();
        }

        debug!(version, chunks = chunks.len(), "rebuilding sparse index");
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let index = TfidfIndex::fit_lenient(&texts, true).map(Arc::new);

        cache.version = Some(version);
        cache.index = index.clone();
        index
    }
}
