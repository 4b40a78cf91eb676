//! Page-ordered PDF text extraction, bounded by a page cap.
//!
//! Text runs come from the `Tj`, `TJ`, `'` and `"` operators of each page's
//! content stream. Runs on a page are joined with single spaces and every page
//! is followed by a `--- Halaman N ---` marker line.

use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("file PDF tidak dapat dibaca ({0})")]
    Unreadable(String),

    #[error("file PDF dilindungi kata sandi")]
    Encrypted,

    #[error("file PDF tidak memiliki halaman")]
    NoPages,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionInfo {
    pub pages_read: usize,
    pub is_truncated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedDocument {
    pub text: String,
    pub page_count: usize,
    pub title: Option<String>,
    pub info: ExtractionInfo,
}

pub struct PdfExtractor {
    max_pages: usize,
}

impl PdfExtractor {
    pub fn new(max_pages: usize) -> Self {
        Self {
            max_pages: max_pages.max(1),
        }
    }

    /// Extract text from the first `max_pages` pages. All-or-nothing: any
    /// failure yields an error and no partial text.
    pub fn extract(&self, bytes: &[u8]) -> Result<ExtractedDocument, ExtractionError> {
        let mut doc = Document::load_mem(bytes).map_err(|e| ExtractionError::Unreadable(e.to_string()))?;

        // Owner-password-only files open with the empty user password.
        if doc.trailer.get(b"Encrypt").is_ok() {
            doc.decrypt("").map_err(|e| {
                tracing::debug!(error = %e, "Empty user password rejected");
                ExtractionError::Encrypted
            })?;
        }

        // BTreeMap keyed by 1-based page number, so iteration is page order.
        let pages = doc.get_pages();
        let page_count = pages.len();
        if page_count == 0 {
            return Err(ExtractionError::NoPages);
        }

        let pages_read = page_count.min(self.max_pages);
        let mut text = String::new();

        for (&page_number, &page_id) in pages.iter().take(pages_read) {
            let runs = page_text_runs(&doc, page_id)?;
            text.push_str(&runs.join(" "));
            text.push_str(&format!("\n--- Halaman {} ---\n", page_number));
        }

        let info = ExtractionInfo {
            pages_read,
            is_truncated: page_count > self.max_pages,
        };

        tracing::info!(
            page_count = page_count,
            pages_read = info.pages_read,
            truncated = info.is_truncated,
            chars = text.len(),
            "PDF extraction complete"
        );

        Ok(ExtractedDocument {
            text,
            page_count,
            title: document_title(&doc),
            info,
        })
    }
}

/// Returns true for lines produced as page markers by [`PdfExtractor`].
pub fn is_page_marker(line: &str) -> bool {
    let line = line.trim();
    line.starts_with("--- Halaman ") && line.ends_with(" ---")
}

fn page_text_runs(doc: &Document, page_id: ObjectId) -> Result<Vec<String>, ExtractionError> {
    let data = doc
        .get_page_content(page_id)
        .map_err(|e| ExtractionError::Unreadable(e.to_string()))?;
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let content = Content::decode(&data).map_err(|e| ExtractionError::Unreadable(e.to_string()))?;

    let mut runs = Vec::new();
    for op in &content.operations {
        match op.operator.as_str() {
            "Tj" | "'" => {
                if let Some(Object::String(bytes, _)) = op.operands.last() {
                    push_run(&mut runs, bytes);
                }
            }
            "\"" => {
                if let Some(Object::String(bytes, _)) = op.operands.get(2) {
                    push_run(&mut runs, bytes);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = op.operands.first() {
                    let mut joined = String::new();
                    for item in items {
                        if let Object::String(bytes, _) = item {
                            joined.push_str(&decode_pdf_string(bytes));
                        }
                    }
                    let joined = joined.trim();
                    if !joined.is_empty() {
                        runs.push(joined.to_string());
                    }
                }
            }
            _ => {}
        }
    }
    Ok(runs)
}

fn push_run(runs: &mut Vec<String>, bytes: &[u8]) {
    let text = decode_pdf_string(bytes);
    if !text.is_empty() {
        runs.push(text);
    }
}

/// Resolve the Title entry of the Info dictionary from the trailer.
fn document_title(doc: &Document) -> Option<String> {
    let info = doc.trailer.get(b"Info").ok().and_then(|info_ref| match info_ref {
        Object::Reference(ref_id) => doc.get_object(*ref_id).ok(),
        other => Some(other),
    })?;

    let dict = info.as_dict().ok()?;
    let bytes = dict.get(b"Title").ok()?.as_str().ok()?;
    let title = decode_pdf_string(bytes);
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

// ── PDF string decoding ──────────────────────────────────────────────

/// Decode a PDF string: UTF-16 with BOM, UTF-8, or Latin-1 style bytes.
pub fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return String::new();
    }

    if bytes.starts_with(&[0xFE, 0xFF]) {
        return decode_utf16(&bytes[2..], u16::from_be_bytes);
    }
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return decode_utf16(&bytes[2..], u16::from_le_bytes);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => clean_decoded(s),
        // PDFDocEncoding overlaps Latin-1 for printable characters.
        Err(_) => clean_decoded(&bytes.iter().map(|&b| b as char).collect::<String>()),
    }
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| to_unit([c[0], c[1]]))
        .collect();
    clean_decoded(&String::from_utf16_lossy(&units))
}

fn clean_decoded(s: &str) -> String {
    s.chars()
        .filter(|&c| c != '\0' && (c >= ' ' || c == '\t'))
        .collect::<String>()
        .trim()
        .to_string()
}


#[cfg(test)]
mod tests {
    use super::test_support::{build_encrypted_pdf, build_pdf};
    use super::*;

    #[test]
    fn test_short_document_is_read_completely() {
        let bytes = build_pdf(3);
        let doc = PdfExtractor::new(10).extract(&bytes).unwrap();

        assert_eq!(doc.page_count, 3);
        assert_eq!(doc.info.pages_read, 3);
        assert!(!doc.info.is_truncated);
        assert!(doc.text.contains("Halaman nomor 1 isi tambahan\n--- Halaman 1 ---"));
        assert!(doc.text.contains("--- Halaman 3 ---"));
    }

    #[test]
    fn test_long_document_is_capped_at_ten_pages() {
        let bytes = build_pdf(12);
        let doc = PdfExtractor::new(10).extract(&bytes).unwrap();

        assert_eq!(doc.page_count, 12);
        assert_eq!(doc.info.pages_read, 10);
        assert!(doc.info.is_truncated);
        assert!(doc.text.contains("--- Halaman 10 ---"));
        assert!(!doc.text.contains("Halaman nomor 11"));
        assert_eq!(doc.text.lines().filter(|l| is_page_marker(l)).count(), 10);
    }

    #[test]
    fn test_exactly_ten_pages_is_not_truncated() {
        let doc = PdfExtractor::new(10).extract(&build_pdf(10)).unwrap();
        assert_eq!(doc.info.pages_read, 10);
        assert!(!doc.info.is_truncated);
    }

    #[test]
    fn test_pages_appear_in_order() {
        let doc = PdfExtractor::new(10).extract(&build_pdf(4)).unwrap();
        let positions: Vec<usize> = (1..=4)
            .map(|n| doc.text.find(&format!("--- Halaman {} ---", n)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_garbage_bytes_are_unreadable() {
        let err = PdfExtractor::new(10).extract(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, ExtractionError::Unreadable(_)));
        assert!(err.to_string().contains("tidak dapat dibaca"));
    }

    #[test]
    fn test_document_without_pages_fails() {
        let err = PdfExtractor::new(10).extract(&build_pdf(0)).unwrap_err();
        assert!(matches!(err, ExtractionError::NoPages));
    }

    #[test]
    fn test_owner_only_encryption_is_readable() {
        let bytes = build_encrypted_pdf(2, "");
        assert!(!bytes.windows(13).any(|w| w == b"Halaman nomor"));

        let doc = PdfExtractor::new(10).extract(&bytes).unwrap();
        assert_eq!(doc.page_count, 2);
        assert!(doc.text.contains("Halaman nomor 1 isi tambahan"));
        assert!(doc.text.contains("Halaman nomor 2 isi tambahan"));
    }

    #[test]
    fn test_user_password_is_encrypted_error() {
        let bytes = build_encrypted_pdf(2, "rahasia");
        let err = PdfExtractor::new(10).extract(&bytes).unwrap_err();
        assert!(matches!(err, ExtractionError::Encrypted));
        assert!(err.to_string().contains("kata sandi"));
    }

    #[test]
    fn test_decode_utf16_with_bom() {
        let bytes = [0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69];
        assert_eq!(decode_pdf_string(&bytes), "Hi");
    }

    #[test]
    fn test_page_marker_detection() {
        assert!(is_page_marker("--- Halaman 7 ---"));
        assert!(!is_page_marker("Halaman 7"));
    }
}
