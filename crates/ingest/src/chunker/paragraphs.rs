//! Paragraph segmentation with a line-stitching fallback for pages that
//! have no blank-line structure.

use std::sync::LazyLock;

use regex::Regex;

static PARAGRAPH_SPLIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n+").unwrap());
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Collapse whitespace runs to single spaces and trim.
pub fn normalize_spaces(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}

/// Split one page of text into whitespace-normalized paragraphs.
///
/// Primary split is on one-or-more blank lines. When that yields at most
/// one block (a densely line-wrapped page), lines are stitched into
/// sentence-ish paragraphs instead: a paragraph ends once the stitched
/// buffer reaches `stitch_min_chars` characters and closes with `.`, `;`,
/// or `:`.
pub fn split_page_paragraphs(page_text: &str, stitch_min_chars: usize) -> Vec<String> {
    if page_text.is_empty() {
        return Vec::new();
    }

    let raw = page_text.replace('\r', "\n");
    let mut blocks: Vec<String> = PARAGRAPH_SPLIT
        .split(&raw)
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_string)
        .collect();

    if blocks.len() <= 1 {
        blocks = stitch_lines(&raw, stitch_min_chars);
    }

    blocks
        .iter()
        .map(|b| normalize_spaces(b))
        .filter(|b| !b.is_empty())
        .collect()
}

fn stitch_lines(raw: &str, min_chars: usize) -> Vec<String> {
    let lines: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        return Vec::new();
    }

    let mut stitched: Vec<String> = Vec::new();
    let mut bucket: Vec<&str> = Vec::new();
    for line in lines {
        bucket.push(line);
        let joined = bucket.join(" ");
        if joined.ends_with(['.', ';', ':']) && joined.chars().count() >= min_chars {
            stitched.push(joined);
            bucket.clear();
        }
    }
    if !bucket.is_empty() {
        stitched.push(bucket.join(" "));
    }
    stitched
}
