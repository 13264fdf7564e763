//! Greedy paragraph packing with oversized-paragraph splitting.

use super::types::{ChunkerConfig, PackedChunk};

/// Pack paragraphs (in page order) into size-bounded chunks.
///
/// Paragraphs accumulate into a buffer until adding the next one would pass
/// `chunk_size`; the buffer then flushes as one chunk spanning every
/// buffered paragraph, joined by a blank line. Oversized paragraphs flush
/// the buffer first and are split on their own; their pieces never merge
/// with neighbouring paragraphs and carry the single paragraph index as
/// both ends of the span.
pub fn pack_paragraphs(paragraphs: &[String], config: &ChunkerConfig) -> Vec<PackedChunk> {
    let oversize_limit = config.oversize_limit();
    let mut chunks: Vec<PackedChunk> = Vec::new();

    let mut buffer: Vec<&str> = Vec::new();
    let mut buffer_start = 0usize;
    let mut buffer_end = 0usize;
    let mut current_len = 0usize;

    for (idx, paragraph) in paragraphs.iter().enumerate() {
        let idx = idx + 1; // 1-based paragraph index within the page
        if paragraph.is_empty() {
            continue;
        }

        let para_len = paragraph.chars().count();
        if para_len > oversize_limit {
            flush(&mut buffer, &mut buffer_start, &mut buffer_end, &mut current_len, &mut chunks);
            for piece in split_long_paragraph(paragraph, config.chunk_size) {
                chunks.push(PackedChunk {
                    text: piece,
                    paragraph_start: idx,
                    paragraph_end: idx,
                });
            }
            continue;
        }

        let additional = para_len + if buffer.is_empty() { 0 } else { 2 };
        if !buffer.is_empty() && current_len + additional > config.chunk_size {
            flush(&mut buffer, &mut buffer_start, &mut buffer_end, &mut current_len, &mut chunks);
        }

        if buffer.is_empty() {
            buffer_start = idx;
        }
        buffer.push(paragraph);
        buffer_end = idx;
        current_len += additional;
    }

    flush(&mut buffer, &mut buffer_start, &mut buffer_end, &mut current_len, &mut chunks);
    chunks
}

fn flush(
    buffer: &mut Vec<&str>,
    buffer_start: &mut usize,
    buffer_end: &mut usize,
    current_len: &mut usize,
    chunks: &mut Vec<PackedChunk>,
) {
    if buffer.is_empty() {
        return;
    }
    chunks.push(PackedChunk {
        text: buffer.join("\n\n"),
        paragraph_start: *buffer_start,
        paragraph_end: *buffer_end,
    });
    buffer.clear();
    *buffer_start = 0;
    *buffer_end = 0;
    *current_len = 0;
}

/// Split an oversized paragraph: sentence accumulation up to `chunk_size`,
/// then hard character windows for any piece that is still too long.
pub(crate) fn split_long_paragraph(paragraph: &str, chunk_size: usize) -> Vec<String> {
    let mut pieces: Vec<String> = Vec::new();
    let mut current = String::new();

    for sentence in split_sentences(paragraph) {
        let candidate = if current.is_empty() {
            sentence.clone()
        } else {
            format!("{current} {sentence}")
        };
        if !current.is_empty() && candidate.chars().count() > chunk_size {
            pieces.push(current.trim().to_string());
            current = sentence;
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        pieces.push(current.trim().to_string());
    }

    let mut final_pieces: Vec<String> = Vec::new();
    for piece in pieces {
        if piece.chars().count() <= chunk_size {
            final_pieces.push(piece);
            continue;
        }
        let chars: Vec<char> = piece.chars().collect();
        let mut start = 0;
        while start < chars.len() {
            let end = (start + chunk_size).min(chars.len());
            let window: String = chars[start..end].iter().collect();
            final_pieces.push(window.trim().to_string());
            start = end;
        }
    }

    final_pieces.into_iter().filter(|p| !p.is_empty()).collect()
}

/// Split at `.`, `!`, or `?` followed by whitespace; the whitespace run is
/// consumed and the terminal punctuation stays with its sentence.
pub(crate) fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences: Vec<String> = Vec::new();
    let bytes = text.as_bytes();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let is_terminal = matches!(bytes[i], b'.' | b'!' | b'?');
        if is_terminal && i + 1 < bytes.len() && bytes[i + 1].is_ascii_whitespace() {
            let end = i + 1; // include the terminal punctuation
            let s = &text[start..end];
            if !s.is_empty() {
                sentences.push(s.to_string());
            }
            let mut j = end;
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            start = j;
            i = j;
            continue;
        }
        i += 1;
    }

    if start < text.len() {
        sentences.push(text[start..].to_string());
    }
    sentences
}
