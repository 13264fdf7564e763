//! Versioned in-memory chunk store.
//!
//! Holds the current corpus of ingested chunks grouped by document and
//! exposes it to the retrieval engines. Structural mutation (ingest,
//! clear) is serialized by the caller holding `&mut self`; the version
//! counter bumps exactly once per document processed and acts purely as a
//! cache-invalidation token for downstream indexes.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use walkdir::WalkDir;

use docnav_core::config::IngestConfig;
use docnav_core::{Chunk, DocumentInfo};
use docnav_ingest::{
    extract_pages, pack_paragraphs, redact_pii, split_page_paragraphs, ChunkerConfig,
};

pub struct DocumentStore {
    upload_dir: PathBuf,
    config: IngestConfig,
    chunks: Vec<Chunk>,
    docs: IndexMap<String, DocumentInfo>,
    version: u64,
}

impl DocumentStore {
    pub fn new(config: IngestConfig) -> std::io::Result<Self> {
        let upload_dir = config.upload_dir.clone();
        std::fs::create_dir_all(&upload_dir)?;
        Ok(Self {
            upload_dir,
            config,
            chunks: Vec::new(),
            docs: IndexMap::new(),
            version: 0,
        })
    }

    /// Monotonic corpus version; bumps once per mutating operation.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn list_documents(&self) -> Vec<DocumentInfo> {
        self.docs.values().cloned().collect()
    }

    /// Flat chunk sequence across all documents, insertion order.
    pub fn all_chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Ingest one file, replacing any prior generation of chunks for the
    /// same display name (upsert). Malformed or unreadable content never
    /// errors past this boundary; it degrades to a zero-chunk document.
    pub fn ingest_file(&mut self, path: &Path, source_name: Option<&str>) -> DocumentInfo {
        let display_name = source_name
            .map(str::to_string)
            .or_else(|| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| path.display().to_string());

        let pages = match extract_pages(path, self.config.page_char_limit) {
            Ok(pages) => pages,
            Err(err) => {
                warn!(file = %path.display(), %err, "extraction failed; ingesting empty document");
                Vec::new()
            }
        };

        let doc_id = doc_id_for(&display_name);
        if self.docs.contains_key(&doc_id) {
            self.remove_doc(&doc_id);
        }

        let chunker = ChunkerConfig {
            chunk_size: self.config.chunk_size,
            oversize_factor: self.config.oversize_factor,
        };

        let mut doc_chunks: Vec<Chunk> = Vec::new();
        let mut ordinal = 0usize;

        for (page_no, page_text) in pages.iter().enumerate() {
            let page_no = page_no + 1;
            let mut paragraphs = split_page_paragraphs(page_text, self.config.stitch_min_chars);
            if paragraphs.is_empty() {
                continue;
            }

            if self.config.enable_pii_redaction {
                paragraphs = paragraphs.iter().map(|p| redact_pii(p)).collect();
            }

            for packed in pack_paragraphs(&paragraphs, &chunker) {
                doc_chunks.push(Chunk {
                    chunk_id: format!("{doc_id}:{ordinal}"),
                    doc_id: doc_id.clone(),
                    doc_name: display_name.clone(),
                    page: page_no,
                    paragraph_start: packed.paragraph_start,
                    paragraph_end: packed.paragraph_end,
                    ordinal,
                    text: packed.text,
                });
                ordinal += 1;
            }
        }

        let document = DocumentInfo {
            doc_id: doc_id.clone(),
            doc_name: display_name,
            pages: pages.len(),
            chunks: doc_chunks.len(),
        };
        self.chunks.extend(doc_chunks);
        self.docs.insert(doc_id, document.clone());
        self.version += 1;

        info!(
            doc = %document.doc_name,
            pages = document.pages,
            chunks = document.chunks,
            "document ingested",
        );
        document
    }

    /// Ingest every matching file directly under `folder`, sorted by name
    /// for determinism. A missing or non-directory path yields an empty
    /// result rather than an error; non-matching files are skipped.
    pub fn ingest_folder(
        &mut self,
        folder: &Path,
        allowed_extensions: Option<&[String]>,
    ) -> Vec<DocumentInfo> {
        if !folder.is_dir() {
            return Vec::new();
        }

        let default_extensions = self.config.extensions();
        let allowed = allowed_extensions.unwrap_or(&default_extensions);

        let mut infos = Vec::new();
        for entry in WalkDir::new(folder)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !matches_extension(path, allowed) {
                continue;
            }
            let source_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string);
            infos.push(self.ingest_file(path, source_name.as_deref()));
        }
        infos
    }

    /// Re-ingest everything already present in the upload directory.
    pub fn load_existing_files(&mut self) -> Vec<DocumentInfo> {
        let upload_dir = self.upload_dir.clone();
        self.ingest_folder(&upload_dir, None)
    }

    /// Remove all chunks, optionally deleting stored source files.
    /// Individual file-deletion failures are swallowed.
    pub fn clear(&mut self, delete_uploaded_files: bool) {
        self.chunks.clear();
        self.docs.clear();

        if delete_uploaded_files {
            let allowed = self.config.extensions();
            for entry in WalkDir::new(&self.upload_dir)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if !path.is_file() || !matches_extension(path, &allowed) {
                    continue;
                }
                if let Err(err) = std::fs::remove_file(path) {
                    warn!(file = %path.display(), %err, "could not delete stored file");
                }
            }
        }

        self.version += 1;
    }

    fn remove_doc(&mut self, doc_id: &str) {
        self.chunks.retain(|c| c.doc_id != doc_id);
        self.docs.shift_remove(doc_id);
    }
}

/// Deterministic document id: truncated SHA-256 of the display name.
fn doc_id_for(source_name: &str) -> String {
    let digest = Sha256::digest(source_name.as_bytes());
    let hex = format!("{digest:x}");
    hex[..12].to_string()
}

fn matches_extension(path: &Path, allowed: &[String]) -> bool {
    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!(".{}", ext.to_lowercase()),
        None => return false,
    };
    allowed.iter().any(|a| a == &ext)
}

#[cfg(test)]
mod tests;
