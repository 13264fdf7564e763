//! Paragraph segmentation and size-bounded chunk packing.
//!
//! Splits extracted page text into whitespace-normalized paragraphs (with a
//! line-stitching fallback for densely wrapped pages), optionally scrubs
//! PII patterns, and packs paragraphs into chunks that carry their
//! paragraph span for provenance.

mod packing;
mod paragraphs;
mod redact;
mod types;

pub use packing::pack_paragraphs;
pub use paragraphs::{normalize_spaces, split_page_paragraphs};
pub use redact::redact_pii;
pub use types::{ChunkerConfig, PackedChunk};
