//! Mode dispatch over the two retrieval engines.
//!
//! The router owns one engine per strategy; both share the same store and
//! answer service handles, with no process-wide globals.

use std::sync::Arc;

use docnav_core::config::RetrievalConfig;
use docnav_core::{AskResponse, Mode};
use docnav_llm::AnswerService;

use crate::long_context::LongContextEngine;
use crate::rag::{RagEngine, SharedStore};

pub struct RetrievalRouter {
    rag: RagEngine,
    long_context: LongContextEngine,
    config: RetrievalConfig,
}

impl RetrievalRouter {
    pub fn new(store: SharedStore, llm: Arc<dyn AnswerService>, config: RetrievalConfig) -> Self {
        Self {
            rag: RagEngine::new(store.clone(), llm.clone(), config.clone()),
            long_context: LongContextEngine::new(store, llm, config.clone()),
            config,
        }
    }

    /// Answer `question` with the selected strategy. `top_k` falls back to
    /// the configured default when not supplied.
    pub async fn ask(&self, question: &str, top_k: Option<usize>, mode: Mode) -> AskResponse {
        let top_k = top_k.unwrap_or(self.config.rag_top_k);
        match mode {
            Mode::Rag => self.rag.ask(question, top_k).await,
            Mode::LongContext => self.long_context.ask(question, top_k).await,
        }
    }
}
