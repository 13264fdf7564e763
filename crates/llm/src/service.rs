use async_trait::async_trait;

use docnav_core::Mode;

#[derive(Debug, thiserror::Error)]
pub enum AnswerError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status} — {body}")]
    Api { status: u16, body: String },
    #[error("failed to parse response: {0}")]
    Parse(String),
    #[error("answer service is not configured; set GEMINI_API_KEY to enable generated answers")]
    NotConfigured,
}

/// Estimates how many tokens a piece of context will consume.
pub trait TokenEstimator: Send + Sync {
    fn estimate(&self, text: &str) -> usize;
}

/// Cheap one-token-per-four-characters heuristic, fast enough to run once
/// per candidate chunk during context packing.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharHeuristic;

impl TokenEstimator for CharHeuristic {
    fn estimate(&self, text: &str) -> usize {
        (text.chars().count() / 4).max(1)
    }
}

/// Trait for answer backends — each service implements this.
///
/// Implementations receive a fully assembled, budget-respecting context
/// string; they never see the raw corpus.
#[async_trait]
pub trait AnswerService: Send + Sync {
    /// Generate an answer for `question` grounded in `context`.
    async fn answer(
        &self,
        mode: Mode,
        question: &str,
        context: &str,
    ) -> Result<String, AnswerError>;

    /// Fast token estimate used while packing context.
    fn estimate_tokens(&self, text: &str) -> usize {
        CharHeuristic.estimate(text)
    }
}
