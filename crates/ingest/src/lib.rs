//! Document ingestion: page-level text extraction, paragraph segmentation,
//! PII redaction, and size-bounded chunk packing.

pub mod chunker;
pub mod document;

pub use chunker::{
    pack_paragraphs, redact_pii, split_page_paragraphs, ChunkerConfig, PackedChunk,
};
pub use document::{extract_pages, ExtractionError};
