//! Context block formatting, citation building, and extractive fallbacks.

use std::collections::HashSet;
use std::time::Instant;

use docnav_core::{AskResponse, Chunk, Citation, Mode};
use docnav_llm::AnswerService;

/// Snippet truncation length for citations.
const SNIPPET_CHARS: usize = 220;

/// Excerpt length used in extractive fallback answers.
const EXCERPT_CHARS: usize = 240;

/// The literal context framing for one chunk. Citation parsing and token
/// budgeting depend on this exact shape.
pub fn format_chunk(chunk: &Chunk) -> String {
    format!(
        "[{}|{}|¶{}-{}|chunk:{}] {}",
        chunk.doc_name,
        chunk.page,
        chunk.paragraph_start,
        chunk.paragraph_end,
        chunk.ordinal,
        chunk.text,
    )
}

/// Formatted blocks joined pairwise by a blank line.
pub fn build_context(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .map(format_chunk)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Deduplicate provenance and emit at most `max_items` citations, first
/// occurrence order, with whitespace-collapsed snippets.
pub fn build_citations(chunks: &[Chunk], max_items: usize) -> Vec<Citation> {
    let mut citations: Vec<Citation> = Vec::new();
    let mut seen: HashSet<(&str, usize, usize, usize)> = HashSet::new();

    for chunk in chunks {
        let key = (
            chunk.doc_name.as_str(),
            chunk.page,
            chunk.paragraph_start,
            chunk.paragraph_end,
        );
        if !seen.insert(key) {
            continue;
        }
        let flat = chunk.text.split_whitespace().collect::<Vec<_>>().join(" ");
        citations.push(Citation {
            doc_name: chunk.doc_name.clone(),
            page: chunk.page,
            paragraph_start: chunk.paragraph_start,
            paragraph_end: chunk.paragraph_end,
            snippet: flat.chars().take(SNIPPET_CHARS).collect(),
        });
        if citations.len() >= max_items {
            break;
        }
    }
    citations
}

/// Deterministic extractive answer built from the strongest matches, used
/// when the answer service is unavailable.
pub fn fallback_answer(question: &str, chunks: &[Chunk]) -> String {
    if chunks.is_empty() {
        return "No relevant content was found in uploaded documents.".to_string();
    }

    let mut lines = vec![
        format!("Question: {question}"),
        "Summary from strongest matches:".to_string(),
    ];
    for chunk in chunks.iter().take(3) {
        let excerpt: String = chunk.text.chars().take(EXCERPT_CHARS).collect();
        lines.push(format!(
            "- [{}|{}|¶{}-{}] {}",
            chunk.doc_name, chunk.page, chunk.paragraph_start, chunk.paragraph_end, excerpt,
        ));
    }
    lines.join("\n")
}

/// Ask the answer service; any failure degrades to the extractive
/// fallback so nothing propagates past the ask boundary.
pub(crate) async fn answer_or_fallback(
    llm: &dyn AnswerService,
    mode: Mode,
    question: &str,
    context: &str,
    fallback_chunks: &[Chunk],
) -> String {
    match llm.answer(mode, question, context).await {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(%mode, %err, "answer service unavailable; using extractive fallback");
            format!("LLM fallback: {err}\n\n{}", fallback_answer(question, fallback_chunks))
        }
    }
}

pub(crate) fn no_documents_response(mode: Mode, started: Instant) -> AskResponse {
    AskResponse {
        mode,
        answer: "No documents are loaded.".to_string(),
        citations: Vec::new(),
        latency_ms: started.elapsed().as_millis() as u64,
        context_chunks: 0,
        context_chars: 0,
        context_tokens: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(doc: &str, page: usize, span: (usize, usize), ordinal: usize, text: &str) -> Chunk {
        Chunk {
            chunk_id: format!("{doc}:{ordinal}"),
            doc_id: doc.to_string(),
            doc_name: doc.to_string(),
            page,
            paragraph_start: span.0,
            paragraph_end: span.1,
            ordinal,
            text: text.to_string(),
        }
    }

    #[test]
    fn format_chunk_matches_expected_framing() {
        let c = chunk("policy.pdf", 3, (2, 4), 7, "Retention is five years.");
        assert_eq!(
            format_chunk(&c),
            "[policy.pdf|3|¶2-4|chunk:7] Retention is five years.",
        );
    }

    #[test]
    fn context_blocks_join_with_blank_line() {
        let chunks = vec![
            chunk("a.txt", 1, (1, 1), 0, "First."),
            chunk("a.txt", 1, (2, 2), 1, "Second."),
        ];
        assert_eq!(
            build_context(&chunks),
            "[a.txt|1|¶1-1|chunk:0] First.\n\n[a.txt|1|¶2-2|chunk:1] Second.",
        );
    }

    #[test]
    fn citations_deduplicate_by_provenance() {
        let chunks = vec![
            chunk("a.txt", 1, (1, 2), 0, "Body one."),
            chunk("a.txt", 1, (1, 2), 1, "Same provenance, different chunk."),
            chunk("a.txt", 2, (1, 2), 2, "Different page."),
        ];
        let citations = build_citations(&chunks, 5);
        assert_eq!(citations.len(), 2);
        assert_eq!(citations[0].snippet, "Body one.");
        assert_eq!(citations[1].page, 2);
    }

    #[test]
    fn citations_respect_max_items() {
        let chunks: Vec<Chunk> = (0..10)
            .map(|i| chunk("a.txt", i + 1, (1, 1), i, "Text."))
            .collect();
        assert_eq!(build_citations(&chunks, 5).len(), 5);
        assert_eq!(build_citations(&chunks, 2).len(), 2);
    }

    #[test]
    fn citation_snippet_is_collapsed_and_truncated() {
        let long = format!("lead\n\n{}", "word ".repeat(100));
        let chunks = vec![chunk("a.txt", 1, (1, 2), 0, &long)];
        let citations = build_citations(&chunks, 5);
        assert!(!citations[0].snippet.contains('\n'));
        assert_eq!(citations[0].snippet.chars().count(), 220);
    }

    #[test]
    fn fallback_answer_lists_top_three() {
        let chunks: Vec<Chunk> = (0..5)
            .map(|i| chunk("doc.pdf", 1, (i + 1, i + 1), i, &format!("Match {i}.")))
            .collect();
        let answer = fallback_answer("what applies?", &chunks);
        assert!(answer.starts_with("Question: what applies?"));
        assert_eq!(answer.matches("- [doc.pdf|").count(), 3);
    }

    #[test]
    fn fallback_answer_handles_empty_input() {
        assert_eq!(
            fallback_answer("anything", &[]),
            "No relevant content was found in uploaded documents.",
        );
    }
}
