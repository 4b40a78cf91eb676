//! Prompt composition for the remote model.

use crate::types::{DocumentAnalysis, UserContext};

const PERSONA: &str = r#"Kamu adalah asisten produktivitas pribadi yang ramah dan suportif.
Bantu pengguna dengan belajar, keuangan, kebiasaan, kesehatan mental, manajemen waktu, dan tujuan.
Jawab dalam Bahasa Indonesia yang santai namun jelas. Gunakan data aktivitas pengguna di bawah
untuk membuat jawaban yang personal, dan jangan mengarang angka yang tidak ada di data."#;

/// Build the single prompt sent to the generation endpoint.
///
/// Document text is cut to `doc_char_budget` characters to bound payload size.
pub fn compose_prompt(
    message: &str,
    context: &UserContext,
    document: Option<&DocumentAnalysis>,
    doc_char_budget: usize,
) -> String {
    let mut parts = Vec::with_capacity(4);
    parts.push(PERSONA.to_string());

    let context_json = serde_json::to_string_pretty(context).unwrap_or_else(|_| "{}".to_string());
    parts.push(format!("Data pengguna:\n{}", context_json));

    if let Some(doc) = document {
        let (excerpt, cut) = truncate_chars(&doc.text, doc_char_budget);
        let mut block = format!(
            "Dokumen: {} ({} halaman, {} dibaca{})",
            doc.file_name,
            doc.page_count,
            doc.pages_read,
            if doc.is_truncated { ", sebagian" } else { "" }
        );
        block.push_str("\nIsi dokumen:\n");
        block.push_str(excerpt);
        if cut {
            block.push_str("\n[...teks dipotong...]");
        }
        parts.push(block);
    }

    parts.push(format!("Pesan pengguna: {}", message));
    parts.join("\n\n")
}

/// Cut to at most `max_chars` characters on a char boundary.
fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => (&text[..idx], true),
        None => (text, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> DocumentAnalysis {
        DocumentAnalysis {
            file_name: "catatan.pdf".to_string(),
            page_count: 12,
            pages_read: 10,
            is_truncated: true,
            title: None,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_prompt_contains_context_and_message() {
        let ctx = UserContext::empty("Rina");
        let prompt = compose_prompt("bagaimana cara fokus?", &ctx, None, 100);
        assert!(prompt.contains("\"userName\": \"Rina\""));
        assert!(prompt.contains("\"balance\": \"Rp 0\""));
        assert!(prompt.ends_with("Pesan pengguna: bagaimana cara fokus?"));
        assert!(!prompt.contains("Dokumen:"));
    }

    #[test]
    fn test_document_text_is_capped() {
        let ctx = UserContext::empty("Rina");
        let text = "é".repeat(50);
        let prompt = compose_prompt("ringkas", &ctx, Some(&doc(&text)), 10);
        assert!(prompt.contains(&"é".repeat(10)));
        assert!(!prompt.contains(&"é".repeat(11)));
        assert!(prompt.contains("[...teks dipotong...]"));
        assert!(prompt.contains("catatan.pdf (12 halaman, 10 dibaca, sebagian)"));
    }

    #[test]
    fn test_short_document_not_marked_cut() {
        let ctx = UserContext::empty("Rina");
        let prompt = compose_prompt("ringkas", &ctx, Some(&doc("pendek")), 100);
        assert!(prompt.contains("pendek"));
        assert!(!prompt.contains("dipotong"));
    }
}
