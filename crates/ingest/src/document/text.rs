use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::ExtractionError;

static SECTION_SPLIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());

pub fn extract_text_pages(
    path: &Path,
    page_char_limit: usize,
) -> Result<Vec<String>, ExtractionError> {
    let bytes = std::fs::read(path)?;
    // Try UTF-8 first, fall back to lossy conversion
    let raw = String::from_utf8(bytes).unwrap_or_else(|e| {
        String::from_utf8_lossy(e.as_bytes()).into_owned()
    });
    Ok(paginate(&raw, page_char_limit))
}

/// Split raw text into pseudo-pages by accumulating blank-line-delimited
/// sections until the running character count would pass `limit`.
///
/// Text with no split points stays a single page.
pub(crate) fn paginate(raw: &str, limit: usize) -> Vec<String> {
    let mut pages: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut char_count = 0usize;

    for section in SECTION_SPLIT.split(raw) {
        let size = section.chars().count();
        if char_count + size > limit && !current.is_empty() {
            pages.push(current.join("\n\n"));
            current = vec![section];
            char_count = size;
        } else {
            current.push(section);
            char_count += size;
        }
    }
    if !current.is_empty() {
        pages.push(current.join("\n\n"));
    }

    if pages.is_empty() {
        pages.push(raw.to_string());
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_page() {
        let pages = paginate("Hello.\n\nWorld.", 3500);
        assert_eq!(pages, vec!["Hello.\n\nWorld."]);
    }

    #[test]
    fn long_text_splits_at_section_boundaries() {
        let section = "x".repeat(2000);
        let raw = format!("{section}\n\n{section}\n\n{section}");
        let pages = paginate(&raw, 3500);
        // 2000 + 2000 > 3500 forces a page break after each section.
        assert_eq!(pages.len(), 3);
        for page in &pages {
            assert_eq!(page.chars().count(), 2000);
        }
    }

    #[test]
    fn sections_accumulate_until_limit() {
        let section = "y".repeat(1000);
        let raw = format!("{section}\n\n{section}\n\n{section}\n\n{section}");
        let pages = paginate(&raw, 3500);
        // Three sections fit (3000), the fourth starts a new page.
        assert_eq!(pages.len(), 2);
        assert!(pages[0].chars().count() > pages[1].chars().count());
    }

    #[test]
    fn dense_text_without_blank_lines_stays_whole() {
        let raw = "a".repeat(10_000);
        let pages = paginate(&raw, 3500);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].chars().count(), 10_000);
    }

    #[test]
    fn empty_input_yields_single_empty_page() {
        let pages = paginate("", 3500);
        assert_eq!(pages, vec![""]);
    }

    #[test]
    fn reads_file_lossily() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"plain \xFF text").unwrap();
        let pages = extract_text_pages(&path, 3500).unwrap();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].contains("plain"));
        assert!(pages[0].contains("text"));
    }
}
