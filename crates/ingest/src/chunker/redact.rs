//! PII scrubbing applied to paragraphs before chunking.

use std::sync::LazyLock;

use regex::Regex;

static SSN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap());

static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:\+?1[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b").unwrap()
});

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b").unwrap()
});

static MRN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:MRN|Medical\s*Record\s*Number)\s*[:#]?\s*[A-Z0-9-]{4,}\b").unwrap()
});

static DOB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:DOB|Date\s*of\s*Birth)\s*[:#]?\s*\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b")
        .unwrap()
});

/// Collapse sensitive-looking patterns to fixed placeholder tokens.
pub fn redact_pii(text: &str) -> String {
    let redacted = SSN.replace_all(text, "[REDACTED_SSN]");
    let redacted = PHONE.replace_all(&redacted, "[REDACTED_PHONE]");
    let redacted = EMAIL.replace_all(&redacted, "[REDACTED_EMAIL]");
    let redacted = MRN.replace_all(&redacted, "MRN [REDACTED]");
    let redacted = DOB.replace_all(&redacted, "DOB [REDACTED]");
    redacted.into_owned()
}
