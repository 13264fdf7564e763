//! Sparse lexical term-vector space shared by both retrieval strategies.
//!
//! Texts become vectors of word (and optionally adjacent word-pair)
//! frequencies weighted by corpus-wide rarity; similarity is the cosine of
//! l2-normalized vectors, so ranking reduces to sparse dot products.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("vocabulary is empty after filtering")]
    EmptyVocabulary,
}

/// Common English stop words excluded from the vocabulary unless the
/// corpus reduces to nothing else.
static STOPWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        // Articles
        "a", "an", "the", // Prepositions
        "in", "on", "at", "to", "of", "with", "by", "from", "as", "into", "through", "during",
        "before", "after", "above", "below", "between", "under", "over", "out", "up", "down",
        "off", // Conjunctions
        "and", "or", "but", "nor", "so", "yet", // Pronouns
        "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them", "my",
        "your", "his", "its", "our", "their", "this", "that", "these", "those", "which", "who",
        "whom", "whose", "what", "where", "when", "how", "why",
        // Common verbs
        "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "having", "do",
        "does", "did", "doing", "will", "would", "could", "should", "may", "might", "must",
        "shall", "can", // Other common words
        "not", "no", "all", "any", "both", "each", "few", "more", "most", "other", "some",
        "such", "than", "too", "very", "just", "also", "only", "own", "same", "then", "there",
        "here", "now", "if", "because", "while", "about", "again", "further", "once",
    ]
    .into_iter()
    .collect()
});

/// Lowercased alphanumeric word runs of at least two characters.
fn tokenize(text: &str, filter_stopwords: bool) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            current.extend(ch.to_lowercase());
        } else if !current.is_empty() {
            push_token(&mut tokens, std::mem::take(&mut current), filter_stopwords);
        }
    }
    if !current.is_empty() {
        push_token(&mut tokens, current, filter_stopwords);
    }
    tokens
}

fn push_token(tokens: &mut Vec<String>, token: String, filter_stopwords: bool) {
    if token.chars().count() < 2 {
        return;
    }
    if filter_stopwords && STOPWORDS.contains(token.as_str()) {
        return;
    }
    tokens.push(token);
}

/// Unigram terms, plus adjacent bigrams when requested.
fn terms(text: &str, bigrams: bool, filter_stopwords: bool) -> Vec<String> {
    let tokens = tokenize(text, filter_stopwords);
    let mut terms = tokens.clone();
    if bigrams {
        for pair in tokens.windows(2) {
            terms.push(format!("{} {}", pair[0], pair[1]));
        }
    }
    terms
}

pub struct TfidfIndex {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    /// l2-normalized sparse rows, one per fitted text, term-index sorted.
    rows: Vec<Vec<(usize, f64)>>,
    bigrams: bool,
    filter_stopwords: bool,
}

impl TfidfIndex {
    /// Fit the vector space over `texts`. Fails only when no term at all
    /// survives filtering.
    pub fn fit(texts: &[&str], bigrams: bool, filter_stopwords: bool) -> Result<Self, IndexError> {
        let n_docs = texts.len();

        let mut doc_counts: Vec<HashMap<String, usize>> = Vec::with_capacity(n_docs);
        for text in texts {
            let mut counts: HashMap<String, usize> = HashMap::new();
            for term in terms(text, bigrams, filter_stopwords) {
                *counts.entry(term).or_insert(0) += 1;
            }
            doc_counts.push(counts);
        }

        // Document frequency per term; BTreeMap gives a deterministic
        // term-index assignment.
        let mut df: BTreeMap<&str, usize> = BTreeMap::new();
        for counts in &doc_counts {
            for term in counts.keys() {
                *df.entry(term).or_insert(0) += 1;
            }
        }
        if df.is_empty() {
            return Err(IndexError::EmptyVocabulary);
        }

        let mut vocabulary: HashMap<String, usize> = HashMap::with_capacity(df.len());
        let mut idf: Vec<f64> = Vec::with_capacity(df.len());
        for (i, (term, count)) in df.iter().enumerate() {
            vocabulary.insert((*term).to_string(), i);
            // Smoothed inverse document frequency.
            idf.push((((1 + n_docs) as f64) / ((1 + count) as f64)).ln() + 1.0);
        }

        let rows = doc_counts
            .iter()
            .map(|counts| {
                let mut entries: Vec<(usize, f64)> = counts
                    .iter()
                    .map(|(term, tf)| {
                        let idx = vocabulary[term.as_str()];
                        (idx, *tf as f64 * idf[idx])
                    })
                    .collect();
                entries.sort_by_key(|(idx, _)| *idx);
                l2_normalize(&mut entries);
                entries
            })
            .collect();

        Ok(Self {
            vocabulary,
            idf,
            rows,
            bigrams,
            filter_stopwords,
        })
    }

    /// Fit with stop-word filtering, retrying without the filter when the
    /// corpus reduces to stop words only. `None` means the corpus has no
    /// usable terms at all; callers treat every similarity as zero.
    pub fn fit_lenient(texts: &[&str], bigrams: bool) -> Option<Self> {
        match Self::fit(texts, bigrams, true) {
            Ok(index) => Some(index),
            Err(IndexError::EmptyVocabulary) => Self::fit(texts, bigrams, false).ok(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Project a query into the fitted space (unknown terms are dropped).
    fn transform(&self, text: &str) -> Vec<(usize, f64)> {
        let mut counts: HashMap<usize, usize> = HashMap::new();
        for term in terms(text, self.bigrams, self.filter_stopwords) {
            if let Some(&idx) = self.vocabulary.get(term.as_str()) {
                *counts.entry(idx).or_insert(0) += 1;
            }
        }
        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf as f64 * self.idf[idx]))
            .collect();
        entries.sort_by_key(|(idx, _)| *idx);
        l2_normalize(&mut entries);
        entries
    }

    /// Cosine similarity of `query` against every fitted row, in row order.
    pub fn similarities(&self, query: &str) -> Vec<f64> {
        let query_vec = self.transform(query);
        self.rows
            .iter()
            .map(|row| sparse_dot(&query_vec, row))
            .collect()
    }

    /// Cosine similarity between two fitted rows.
    pub fn row_similarity(&self, a: usize, b: usize) -> f64 {
        sparse_dot(&self.rows[a], &self.rows[b])
    }
}

fn l2_normalize(entries: &mut [(usize, f64)]) {
    let norm = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for (_, w) in entries.iter_mut() {
            *w /= norm;
        }
    }
}

/// Dot product of two term-index-sorted sparse vectors.
fn sparse_dot(a: &[(usize, f64)], b: &[(usize, f64)]) -> f64 {
    let mut dot = 0.0;
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                dot += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    dot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_lowercases_and_drops_short_words() {
        let tokens = tokenize("A quick-Brown FOX v2 x", false);
        assert_eq!(tokens, vec!["quick", "brown", "fox", "v2"]);
    }

    #[test]
    fn tokenize_removes_stop_words() {
        let tokens = tokenize("the dosage of the medication", true);
        assert_eq!(tokens, vec!["dosage", "medication"]);
    }

    #[test]
    fn bigrams_join_adjacent_tokens() {
        let t = terms("renal dosing guidance", false, true);
        assert_eq!(t, vec!["renal", "dosing", "guidance"]);
        let t = terms("renal dosing guidance", true, true);
        assert!(t.contains(&"renal dosing".to_string()));
        assert!(t.contains(&"dosing guidance".to_string()));
    }

    #[test]
    fn identical_text_scores_highest() {
        let texts = vec![
            "renal dosing must be adjusted for impairment",
            "storage requirements for refrigerated samples",
            "consent forms are archived for seven years",
        ];
        let index = TfidfIndex::fit(&texts, true, true).unwrap();
        let scores = index.similarities("renal dosing adjusted impairment");
        assert!(scores[0] > scores[1]);
        assert!(scores[0] > scores[2]);
        assert!(scores[0] > 0.9, "near-identical text should score ~1, got {}", scores[0]);
    }

    #[test]
    fn disjoint_query_scores_zero() {
        let texts = vec!["alpha bravo charlie", "delta echo foxtrot"];
        let index = TfidfIndex::fit(&texts, true, true).unwrap();
        let scores = index.similarities("zulu yankee");
        assert_eq!(scores, vec![0.0, 0.0]);
    }

    #[test]
    fn stop_word_corpus_falls_back_to_unfiltered() {
        let texts = vec!["the of and", "is are was"];
        assert!(matches!(
            TfidfIndex::fit(&texts, true, true),
            Err(IndexError::EmptyVocabulary),
        ));
        let index = TfidfIndex::fit_lenient(&texts, true).expect("unfiltered rebuild");
        let scores = index.similarities("the of");
        assert!(scores[0] > 0.0);
    }

    #[test]
    fn unusable_corpus_yields_none() {
        let texts = vec!["! ?", "% &"];
        assert!(TfidfIndex::fit_lenient(&texts, true).is_none());
    }

    #[test]
    fn rare_terms_outweigh_common_ones() {
        // "protocol" appears everywhere; "zanubrutinib" only in one text.
        let texts = vec![
            "protocol zanubrutinib schedule",
            "protocol visit windows",
            "protocol deviations log",
        ];
        let index = TfidfIndex::fit(&texts, false, true).unwrap();
        let scores = index.similarities("zanubrutinib");
        assert!(scores[0] > 0.0);
        assert_eq!(scores[1], 0.0);
        assert_eq!(scores[2], 0.0);
    }

    #[test]
    fn row_similarity_is_symmetric() {
        let texts = vec!["alpha beta gamma", "alpha beta delta", "unrelated words entirely"];
        let index = TfidfIndex::fit(&texts, false, true).unwrap();
        let ab = index.row_similarity(0, 1);
        let ba = index.row_similarity(1, 0);
        assert!((ab - ba).abs() < 1e-12);
        assert!(ab > index.row_similarity(0, 2));
    }
}
