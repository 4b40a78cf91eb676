//! Heuristic document summarizer, no model involved.
//!
//! Splits extracted text into sentence-like segments, keeps the opening and
//! closing segments as the summary, and estimates reading time.

use std::sync::LazyLock;

use super::pdf::is_page_marker;

static SENTENCE_END_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"[.!?]+").expect("sentence regex is valid"));

/// Segments shorter than this are headings, numbering or noise.
const MIN_SEGMENT_CHARS: usize = 20;
const LEADING_SEGMENTS: usize = 3;
const TRAILING_SEGMENTS: usize = 2;
const WORDS_PER_MINUTE: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSummary {
    /// `None` when no segment is long enough to summarize.
    pub summary: Option<String>,
    pub segment_count: usize,
    pub word_count: usize,
    pub reading_minutes: usize,
}

pub fn summarize(text: &str) -> DocumentSummary {
    let body = strip_page_markers(text);

    let segments: Vec<&str> = SENTENCE_END_RE
        .split(&body)
        .map(str::trim)
        .filter(|s| s.chars().count() >= MIN_SEGMENT_CHARS)
        .collect();

    let summary = if segments.is_empty() {
        None
    } else if segments.len() <= LEADING_SEGMENTS + TRAILING_SEGMENTS {
        Some(format!("{}.", segments.join(". ")))
    } else {
        let head = segments[..LEADING_SEGMENTS].join(". ");
        let tail = segments[segments.len() - TRAILING_SEGMENTS..].join(". ");
        Some(format!("{}. ... {}.", head, tail))
    };

    let word_count = body.split_whitespace().count();

    DocumentSummary {
        summary,
        segment_count: segments.len(),
        word_count,
        reading_minutes: word_count.div_ceil(WORDS_PER_MINUTE),
    }
}

fn strip_page_markers(text: &str) -> String {
    text.lines()
        .filter(|line| !is_page_marker(line))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_segments_are_discarded() {
        let text = "Bab 1. Produktivitas adalah kebiasaan yang dibangun setiap hari! Ok? \
                    Jadwal yang jelas membantu kita tetap fokus pada tujuan.";
        let result = summarize(text);
        assert_eq!(result.segment_count, 2);
        let summary = result.summary.unwrap();
        assert!(summary.starts_with("Produktivitas adalah kebiasaan"));
        assert!(!summary.contains("Bab 1"));
    }

    #[test]
    fn test_long_text_keeps_first_three_and_last_two() {
        let text = (1..=8)
            .map(|i| format!("Kalimat panjang nomor {} berisi cukup banyak kata", i))
            .collect::<Vec<_>>()
            .join(". ");
        let result = summarize(&text);

        assert_eq!(result.segment_count, 8);
        let summary = result.summary.unwrap();
        for kept in [1, 2, 3, 7, 8] {
            assert!(summary.contains(&format!("nomor {} ", kept)), "missing {}", kept);
        }
        for dropped in [4, 5, 6] {
            assert!(!summary.contains(&format!("nomor {} ", dropped)), "kept {}", dropped);
        }
        assert!(summary.contains(" ... "));
    }

    #[test]
    fn test_reading_time_rounds_up() {
        let text = vec!["kata"; 201].join(" ");
        let result = summarize(&text);
        assert_eq!(result.word_count, 201);
        assert_eq!(result.reading_minutes, 2);

        let exact = vec!["kata"; 200].join(" ");
        assert_eq!(summarize(&exact).reading_minutes, 1);
    }

    #[test]
    fn test_page_markers_do_not_count() {
        let text = "Satu dua tiga\n--- Halaman 1 ---\n";
        let result = summarize(text);
        assert_eq!(result.word_count, 3);
        assert!(result.summary.is_none());
    }

    #[test]
    fn test_empty_text() {
        let result = summarize("");
        assert_eq!(result.word_count, 0);
        assert_eq!(result.reading_minutes, 0);
        assert!(result.summary.is_none());
    }
}
