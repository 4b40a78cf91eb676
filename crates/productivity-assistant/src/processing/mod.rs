pub mod pdf;
pub mod summarizer;

pub use pdf::{ExtractedDocument, ExtractionError, ExtractionInfo, PdfExtractor};
pub use summarizer::{summarize, DocumentSummary};
