//! Chunker configuration and output types.

// ── Configuration ───────────────────────────────────────────────────────────

/// Policy knobs for paragraph packing.
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    /// Target chunk size in characters (default: 1400).
    pub chunk_size: usize,
    /// Paragraphs longer than `chunk_size * oversize_factor` are split
    /// independently instead of being packed with neighbours (default: 1.3).
    pub oversize_factor: f64,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1400,
            oversize_factor: 1.3,
        }
    }
}

impl ChunkerConfig {
    /// Character count above which a paragraph counts as oversized.
    pub fn oversize_limit(&self) -> usize {
        (self.chunk_size as f64 * self.oversize_factor) as usize
    }
}

// ── Chunk output ────────────────────────────────────────────────────────────

/// A packed chunk body with its paragraph span (1-based, within the page).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedChunk {
    pub text: String,
    pub paragraph_start: usize,
    pub paragraph_end: usize,
}
