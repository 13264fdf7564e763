//! Budget-constrained multi-document context assembly.
//!
//! Scores every chunk against the query, ranks documents by aggregate
//! relevance, and greedily admits chunks in two phases — coverage across
//! ranked documents first, then depth sweeps — under a character ceiling
//! and a token ceiling that are checked strictly before each admission.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

use indexmap::IndexMap;

use docnav_core::config::RetrievalConfig;
use docnav_core::{AskResponse, Chunk, Mode};
use docnav_llm::AnswerService;

use crate::context::{
    answer_or_fallback, build_citations, build_context, format_chunk, no_documents_response,
};
use crate::rag::SharedStore;
use crate::tfidf::TfidfIndex;

pub struct LongContextEngine {
    store: SharedStore,
    llm: Arc<dyn AnswerService>,
    config: RetrievalConfig,
}

enum Admit {
    Added,
    Exhausted,
    BudgetHit,
}

struct Fill {
    selected: Vec<Chunk>,
    running_chars: usize,
    running_tokens: usize,
    pointers: IndexMap<String, usize>,
}

impl LongContextEngine {
    pub fn new(store: SharedStore, llm: Arc<dyn AnswerService>, config: RetrievalConfig) -> Self {
        Self { store, llm, config }
    }

    pub async fn ask(&self, question: &str, top_k: usize) -> AskResponse {
        let started = Instant::now();

        let mut chunks = { self.store.read().await.all_chunks().to_vec() };
        chunks.sort_by(|a, b| {
            (a.doc_name.as_str(), a.page, a.ordinal).cmp(&(b.doc_name.as_str(), b.page, b.ordinal))
        });
        if chunks.is_empty() {
            return no_documents_response(Mode::LongContext, started);
        }

        let (mut selected, mut running_tokens) = self.assemble_context(question, &chunks);
        if selected.is_empty() {
            // Degenerate scoring left nothing: hand back a plain top-k so
            // the caller always receives something from a non-empty corpus.
            selected = rank_relevant(question, &chunks, top_k.max(1));
            running_tokens = self.llm.estimate_tokens(&build_context(&selected));
        }

        let context = build_context(&selected);
        let relevant = rank_relevant(question, &selected, top_k);
        let answer = answer_or_fallback(
            self.llm.as_ref(),
            Mode::LongContext,
            question,
            &context,
            &relevant,
        )
        .await;

        AskResponse {
            mode: Mode::LongContext,
            answer,
            citations: build_citations(&relevant, self.config.citation_max_items),
            latency_ms: started.elapsed().as_millis() as u64,
            context_chunks: selected.len(),
            context_chars: context.chars().count(),
            context_tokens: running_tokens,
        }
    }

    fn assemble_context(&self, question: &str, chunks: &[Chunk]) -> (Vec<Chunk>, usize) {
        let scores = score_chunks(question, chunks);

        let mut doc_to_chunks: IndexMap<&str, Vec<&Chunk>> = IndexMap::new();
        for chunk in chunks {
            doc_to_chunks
                .entry(chunk.doc_name.as_str())
                .or_default()
                .push(chunk);
        }

        let mut ranked_docs = rank_documents(
            chunks,
            &scores,
            self.config.doc_score_threshold,
            self.config.min_survivor_docs,
        );
        ranked_docs.truncate(self.config.max_docs_for_context);

        let mut fill = Fill {
            selected: Vec::new(),
            running_chars: 0,
            running_tokens: 0,
            pointers: ranked_docs.iter().map(|d| (d.clone(), 0)).collect(),
        };

        // Phase A (coverage): a first allowance per ranked document, in
        // rank order, so every relevant document reaches the context.
        for doc in &ranked_docs {
            for _ in 0..self.config.min_chunks_per_doc {
                match self.admit_next(&mut fill, doc, &doc_to_chunks) {
                    Admit::BudgetHit => return (fill.selected, fill.running_tokens),
                    Admit::Exhausted => break,
                    Admit::Added => {}
                }
            }
        }

        // Phase B (depth fill): keep sweeping the ranked documents while
        // any sweep still admits something.
        let mut progress = true;
        while progress {
            progress = false;
            for doc in &ranked_docs {
                for _ in 0..self.config.depth_batch_size {
                    match self.admit_next(&mut fill, doc, &doc_to_chunks) {
                        Admit::BudgetHit => return (fill.selected, fill.running_tokens),
                        Admit::Exhausted => break,
                        Admit::Added => progress = true,
                    }
                }
            }
        }

        (fill.selected, fill.running_tokens)
    }

    /// Both ceilings are checked strictly before admission; a block that
    /// would pass either one stops the whole fill.
    fn admit_next(
        &self,
        fill: &mut Fill,
        doc: &str,
        doc_to_chunks: &IndexMap<&str, Vec<&Chunk>>,
    ) -> Admit {
        let Some(list) = doc_to_chunks.get(doc) else {
            return Admit::Exhausted;
        };
        let Some(pointer) = fill.pointers.get_mut(doc) else {
            return Admit::Exhausted;
        };
        if *pointer >= list.len() {
            return Admit::Exhausted;
        }

        let chunk = list[*pointer];
        let block = format_chunk(chunk);
        let block_chars = block.chars().count();
        let block_tokens = self.llm.estimate_tokens(&block);

        if fill.running_chars + block_chars > self.config.max_context_chars {
            return Admit::BudgetHit;
        }
        if fill.running_tokens + block_tokens > self.config.max_context_tokens {
            return Admit::BudgetHit;
        }

        fill.selected.push(chunk.clone());
        *pointer += 1;
        fill.running_chars += block_chars + 2;
        fill.running_tokens += block_tokens;
        Admit::Added
    }
}

/// Rank documents by aggregate relevance: 0.7 × best chunk score + 0.3 ×
/// mean of the top five chunk scores. Documents below `threshold` relative
/// to the leader are dropped, unless that leaves fewer than
/// `min_survivors`, in which case the top-ranked documents are kept
/// regardless. With no signal at all, encounter order is preserved.
pub(crate) fn rank_documents(
    chunks: &[Chunk],
    scores: &[f64],
    threshold: f64,
    min_survivors: usize,
) -> Vec<String> {
    let mut grouped: IndexMap<&str, Vec<f64>> = IndexMap::new();
    for (chunk, score) in chunks.iter().zip(scores) {
        grouped
            .entry(chunk.doc_name.as_str())
            .or_default()
            .push(*score);
    }

    let mut scored_docs: Vec<(&str, f64)> = grouped
        .iter()
        .map(|(name, values)| {
            let mut ordered = values.clone();
            ordered.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
            let max_score = ordered.first().copied().unwrap_or(0.0);
            let top = &ordered[..ordered.len().min(5)];
            let mean_top = if top.is_empty() {
                0.0
            } else {
                top.iter().sum::<f64>() / top.len() as f64
            };
            (*name, max_score * 0.7 + mean_top * 0.3)
        })
        .collect();

    let best = scored_docs.iter().map(|(_, s)| *s).fold(0.0_f64, f64::max);
    if !scored_docs.is_empty() && best > 0.0 {
        scored_docs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        let cutoff = scored_docs[0].1 * threshold;
        let filtered: Vec<String> = scored_docs
            .iter()
            .filter(|(_, score)| *score >= cutoff && *score > 0.0)
            .map(|(name, _)| name.to_string())
            .collect();
        if filtered.len() >= min_survivors {
            return filtered;
        }
        return scored_docs
            .iter()
            .take(min_survivors)
            .map(|(name, _)| name.to_string())
            .collect();
    }

    // No lexical signal anywhere: keep documents in encounter order.
    grouped.keys().map(|name| name.to_string()).collect()
}

/// Unigram-only similarity of every chunk to the question, over a space
/// fitted on the question plus the chunk texts.
fn score_chunks(question: &str, chunks: &[Chunk]) -> Vec<f64> {
    let mut texts: Vec<&str> = Vec::with_capacity(chunks.len() + 1);
    texts.push(question);
    texts.extend(chunks.iter().map(|c| c.text.as_str()));

    match TfidfIndex::fit_lenient(&texts, false) {
        Some(index) => (1..index.len()).map(|i| index.row_similarity(0, i)).collect(),
        None => vec![0.0; chunks.len()],
    }
}

/// Top-k chunks by unigram similarity; short inputs pass through as-is.
pub(crate) fn rank_relevant(question: &str, chunks: &[Chunk], top_k: usize) -> Vec<Chunk> {
    if chunks.is_empty() {
        return Vec::new();
    }
    if chunks.len() <= top_k {
        return chunks.to_vec();
    }

    let scores = score_chunks(question, chunks);
    let mut ranked: Vec<(usize, f64)> = scores.into_iter().enumerate().collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranked
        .into_iter()
        .take(top_k)
        .map(|(i, _)| chunks[i].clone())
        .collect()
}
