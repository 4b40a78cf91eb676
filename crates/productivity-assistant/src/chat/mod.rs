//! Chat turn handling: intent classification, the offline template engine
//! and the orchestrator that ties them to the remote gateway.

pub mod intent;
pub mod offline;
pub mod orchestrator;
pub mod templates;

pub use intent::{classify, Intent};
pub use offline::{OfflineEngine, OfflineReply};
pub use orchestrator::{
    DocumentUpload, ResponseMode, ResponseOrchestrator, TurnOutcome, UploadError, PDF_MEDIA_TYPE,
};
