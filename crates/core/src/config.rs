use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_usize(key: &str, default: usize) -> usize {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_f64(key: &str, default: f64) -> f64 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    env_opt(key)
        .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub ingest: IngestConfig,
    pub retrieval: RetrievalConfig,
    pub gemini: GeminiConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            ingest: IngestConfig::from_env(),
            retrieval: RetrievalConfig::from_env(),
            gemini: GeminiConfig::from_env(),
        }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!(
            "  ingest:     upload_dir={}, chunk_size={}, redaction={}",
            self.ingest.upload_dir.display(),
            self.ingest.chunk_size,
            self.ingest.enable_pii_redaction,
        );
        tracing::info!(
            "  retrieval:  top_k={}, max_chars={}, max_tokens={}",
            self.retrieval.rag_top_k,
            self.retrieval.max_context_chars,
            self.retrieval.max_context_tokens,
        );
        tracing::info!(
            "  gemini:     model={}, configured={}",
            self.gemini.model,
            self.gemini.is_configured(),
        );
    }

    /// Return a redacted view safe for API responses (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "ingest": {
                "upload_dir": self.ingest.upload_dir,
                "chunk_size": self.ingest.chunk_size,
                "allowed_extensions": self.ingest.allowed_extensions,
                "pii_redaction": self.ingest.enable_pii_redaction,
            },
            "retrieval": {
                "rag_top_k": self.retrieval.rag_top_k,
                "max_context_chars": self.retrieval.max_context_chars,
                "max_context_tokens": self.retrieval.max_context_tokens,
                "max_docs_for_context": self.retrieval.max_docs_for_context,
            },
            "gemini": {
                "model": self.gemini.model,
                "configured": self.gemini.is_configured(),
            },
        })
    }
}

// ── Ingestion ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Directory holding uploaded source files.
    pub upload_dir: PathBuf,
    /// Target chunk size in characters.
    pub chunk_size: usize,
    /// Paragraphs longer than `chunk_size * oversize_factor` are split on
    /// their own rather than packed with neighbours.
    pub oversize_factor: f64,
    /// Pseudo-page accumulation limit for plain-text sources.
    pub page_char_limit: usize,
    /// Minimum stitched-line length before a sentence terminator ends a
    /// paragraph on densely line-wrapped pages.
    pub stitch_min_chars: usize,
    pub enable_pii_redaction: bool,
    /// Comma-separated extension list, each with a leading dot.
    pub allowed_extensions: String,
}

impl IngestConfig {
    fn from_env() -> Self {
        Self {
            upload_dir: PathBuf::from(env_or("DOCNAV_UPLOAD_DIR", "data/uploads")),
            chunk_size: env_usize("DOCNAV_CHUNK_SIZE", 1400),
            oversize_factor: env_f64("DOCNAV_OVERSIZE_FACTOR", 1.3),
            page_char_limit: env_usize("DOCNAV_PAGE_CHAR_LIMIT", 3500),
            stitch_min_chars: env_usize("DOCNAV_STITCH_MIN_CHARS", 240),
            enable_pii_redaction: env_bool("DOCNAV_ENABLE_PII_REDACTION", true),
            allowed_extensions: env_or("DOCNAV_ALLOWED_EXTENSIONS", ".pdf,.txt,.md"),
        }
    }

    /// Normalized extension list (lowercase, leading dot required).
    pub fn extensions(&self) -> Vec<String> {
        self.allowed_extensions
            .split(',')
            .map(|x| x.trim().to_lowercase())
            .filter(|x| x.starts_with('.'))
            .collect()
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("data/uploads"),
            chunk_size: 1400,
            oversize_factor: 1.3,
            page_char_limit: 3500,
            stitch_min_chars: 240,
            enable_pii_redaction: true,
            allowed_extensions: ".pdf,.txt,.md".to_string(),
        }
    }
}

// ── Retrieval ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub rag_top_k: usize,
    /// Character ceiling for the assembled long-context string.
    pub max_context_chars: usize,
    /// Token ceiling for the assembled long-context string.
    pub max_context_tokens: usize,
    pub max_docs_for_context: usize,
    /// Coverage-phase chunk allowance per ranked document.
    pub min_chunks_per_doc: usize,
    /// Depth-fill sweep allowance per ranked document.
    pub depth_batch_size: usize,
    /// Documents scoring below `threshold * top_score` are dropped.
    pub doc_score_threshold: f64,
    /// Keep at least this many ranked documents when the relative
    /// threshold filters too aggressively.
    pub min_survivor_docs: usize,
    pub citation_max_items: usize,
}

impl RetrievalConfig {
    fn from_env() -> Self {
        Self {
            rag_top_k: env_usize("DOCNAV_RAG_TOP_K", 8),
            max_context_chars: env_usize("DOCNAV_MAX_CONTEXT_CHARS", 500_000),
            max_context_tokens: env_usize("DOCNAV_MAX_CONTEXT_TOKENS", 120_000),
            max_docs_for_context: env_usize("DOCNAV_MAX_DOCS_FOR_CONTEXT", 5),
            min_chunks_per_doc: env_usize("DOCNAV_MIN_CHUNKS_PER_DOC", 12),
            depth_batch_size: env_usize("DOCNAV_DEPTH_BATCH_SIZE", 4),
            doc_score_threshold: env_f64("DOCNAV_DOC_SCORE_THRESHOLD", 0.35),
            min_survivor_docs: env_usize("DOCNAV_MIN_SURVIVOR_DOCS", 3),
            citation_max_items: env_usize("DOCNAV_CITATION_MAX_ITEMS", 5),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            rag_top_k: 8,
            max_context_chars: 500_000,
            max_context_tokens: 120_000,
            max_docs_for_context: 5,
            min_chunks_per_doc: 12,
            depth_batch_size: 4,
            doc_score_threshold: 0.35,
            min_survivor_docs: 3,
            citation_max_items: 5,
        }
    }
}

// ── Gemini (answer service) ───────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub retry_max_attempts: u32,
    pub retry_initial_delay_secs: f64,
    pub retry_backoff_multiplier: f64,
    pub retry_max_delay_secs: f64,
}

impl GeminiConfig {
    fn from_env() -> Self {
        Self {
            api_key: env_opt("GEMINI_API_KEY"),
            model: env_or("GEMINI_MODEL", "gemini-3-flash-preview"),
            temperature: env_f64("GEMINI_TEMPERATURE", 0.0) as f32,
            max_output_tokens: env_usize("GEMINI_MAX_OUTPUT_TOKENS", 1200) as u32,
            retry_max_attempts: env_usize("GEMINI_RETRY_MAX_ATTEMPTS", 3) as u32,
            retry_initial_delay_secs: env_f64("GEMINI_RETRY_INITIAL_DELAY_SECONDS", 20.0),
            retry_backoff_multiplier: env_f64("GEMINI_RETRY_BACKOFF_MULTIPLIER", 2.0),
            retry_max_delay_secs: env_f64("GEMINI_RETRY_MAX_DELAY_SECONDS", 75.0),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-3-flash-preview".to_string(),
            temperature: 0.0,
            max_output_tokens: 1200,
            retry_max_attempts: 3,
            retry_initial_delay_secs: 20.0,
            retry_backoff_multiplier: 2.0,
            retry_max_delay_secs: 75.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_normalized() {
        let config = IngestConfig {
            allowed_extensions: ".PDF, .txt ,md,.Md".to_string(),
            ..IngestConfig::default()
        };
        // "md" has no leading dot and is dropped.
        assert_eq!(config.extensions(), vec![".pdf", ".txt", ".md"]);
    }

    #[test]
    fn redacted_summary_has_no_api_key() {
        let config = Config {
            ingest: IngestConfig::default(),
            retrieval: RetrievalConfig::default(),
            gemini: GeminiConfig {
                api_key: Some("secret-key".to_string()),
                ..GeminiConfig::default()
            },
        };
        let summary = config.redacted_summary().to_string();
        assert!(!summary.contains("secret-key"));
        assert!(summary.contains("\"configured\":true"));
    }
}
