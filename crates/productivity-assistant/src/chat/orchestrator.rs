//! Response orchestration.
//!
//! One turn runs `AwaitingContext -> (RemoteAttempt | OfflineDirect) -> Done`.
//! The remote gateway is tried only when a credential is configured; any
//! gateway failure degrades to the offline engine with a short notice on top.
//! Document turns extract the PDF first and stop at an extraction failure.

use std::sync::Arc;
use thiserror::Error;

use crate::config::AssistantConfig;
use crate::context::ContextAggregator;
use crate::llm::{compose_prompt, GatewayError, ModelGateway};
use crate::memory::ConversationStore;
use crate::processing::PdfExtractor;
use crate::settings::Settings;
use crate::storage::{KeyValueStore, StoreError};
use crate::types::{DocumentAnalysis, Message, MessageRole};

use super::offline::OfflineEngine;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";

const DOCUMENT_REQUEST: &str =
    "Tolong analisis dokumen ini: ringkas isinya, sebutkan poin pentingnya, dan beri saran cara mempelajarinya.";

const APOLOGY: &str = "😔 Maaf, terjadi kesalahan saat memproses pesanmu. Silakan coba lagi.";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("tipe file tidak didukung: {0} (hanya PDF)")]
    UnsupportedMediaType(String),

    #[error("file kosong")]
    Empty,
}

/// A file selected by the user, already checked to be a PDF.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    file_name: String,
    bytes: Vec<u8>,
}

impl DocumentUpload {
    pub fn new(
        file_name: impl Into<String>,
        media_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Self, UploadError> {
        let media_type = media_type.trim();
        if !media_type.eq_ignore_ascii_case(PDF_MEDIA_TYPE) {
            return Err(UploadError::UnsupportedMediaType(media_type.to_string()));
        }
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        Ok(Self {
            file_name: file_name.into(),
            bytes,
        })
    }
}

/// How the assistant message of a turn was produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseMode {
    Remote,
    /// Remote attempt failed; offline answer prefixed with the error notice.
    Degraded(GatewayError),
    Offline,
    ExtractionFailed,
    Failed,
}

#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub user_message: Message,
    pub assistant_message: Message,
    pub mode: ResponseMode,
}

#[derive(Debug, Clone, Copy)]
enum TurnState {
    AwaitingContext,
    RemoteAttempt,
    OfflineDirect,
    Done,
}

pub struct ResponseOrchestrator {
    aggregator: ContextAggregator,
    gateway: Arc<dyn ModelGateway>,
    offline: OfflineEngine,
    conversations: ConversationStore,
    settings: Settings,
    extractor: Arc<PdfExtractor>,
    prompt_char_budget: usize,
}

impl ResponseOrchestrator {
    pub fn new(
        config: &AssistantConfig,
        store: Arc<dyn KeyValueStore>,
        gateway: Arc<dyn ModelGateway>,
    ) -> Self {
        Self {
            aggregator: ContextAggregator::new(store.clone()),
            gateway,
            offline: OfflineEngine::new(&config.offline),
            conversations: ConversationStore::new(store.clone(), config.conversation.max_messages),
            settings: Settings::new(store, config.gemini.fallback_api_key.clone()),
            extractor: Arc::new(PdfExtractor::new(config.documents.max_pages)),
            prompt_char_budget: config.gemini.prompt_char_budget,
        }
    }

    /// Replace the offline engine, e.g. with a seeded one.
    pub fn with_offline_engine(mut self, engine: OfflineEngine) -> Self {
        self.offline = engine;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn history(&mut self, user_id: &str, user_name: &str) -> Result<Vec<Message>, StoreError> {
        self.conversations.load(user_id, user_name)
    }

    pub fn clear_history(&mut self, user_id: &str) -> Result<(), StoreError> {
        self.conversations.clear(user_id)
    }

    /// Run one text turn. Blank input is ignored and yields `None`.
    pub async fn send_message(
        &mut self,
        user_id: &str,
        user_name: &str,
        text: &str,
    ) -> Option<TurnOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        self.open_session(user_id, user_name);
        let user_message = self.conversations.create_message(MessageRole::User, text);
        if !self.record(user_id, &user_message) {
            return Some(self.finish_turn(user_id, user_message, APOLOGY.to_string(), ResponseMode::Failed));
        }

        let (content, mode) = self.respond(user_id, user_name, text, None).await;
        Some(self.finish_turn(user_id, user_message, content, mode))
    }

    /// Run one document turn: extract, then answer about the document.
    pub async fn analyze_document(
        &mut self,
        user_id: &str,
        user_name: &str,
        upload: DocumentUpload,
    ) -> TurnOutcome {
        let DocumentUpload { file_name, bytes } = upload;

        self.open_session(user_id, user_name);
        let user_message = self
            .conversations
            .create_message(MessageRole::User, format!("📄 Menganalisis dokumen: {}", file_name));
        if !self.record(user_id, &user_message) {
            return self.finish_turn(user_id, user_message, APOLOGY.to_string(), ResponseMode::Failed);
        }

        let extractor = self.extractor.clone();
        let extracted = tokio::task::spawn_blocking(move || extractor.extract(&bytes)).await;

        let (content, mode) = match extracted {
            Ok(Ok(doc)) => {
                let analysis = DocumentAnalysis {
                    file_name,
                    page_count: doc.page_count,
                    pages_read: doc.info.pages_read,
                    is_truncated: doc.info.is_truncated,
                    title: doc.title,
                    text: doc.text,
                };
                self.respond(user_id, user_name, DOCUMENT_REQUEST, Some(&analysis))
                    .await
            }
            Ok(Err(e)) => {
                tracing::warn!(file = %file_name, error = %e, "Document extraction failed");
                (format!("❌ Gagal membaca dokumen: {}", e), ResponseMode::ExtractionFailed)
            }
            Err(e) => {
                tracing::error!(file = %file_name, error = %e, "Extraction task did not complete");
                (APOLOGY.to_string(), ResponseMode::Failed)
            }
        };

        self.finish_turn(user_id, user_message, content, mode)
    }

    async fn respond(
        &self,
        user_id: &str,
        user_name: &str,
        message: &str,
        document: Option<&DocumentAnalysis>,
    ) -> (String, ResponseMode) {
        tracing::debug!(state = ?TurnState::AwaitingContext, user = %user_id, "Turn started");
        let context = self.aggregator.aggregate(user_id, user_name);

        let Some(credential) = self.settings.api_key(user_id) else {
            tracing::debug!(state = ?TurnState::OfflineDirect, "No API key configured");
            let reply = self.offline.respond(message, &context, document).await;
            return (reply.text, ResponseMode::Offline);
        };

        tracing::debug!(state = ?TurnState::RemoteAttempt, "Calling remote model");
        let prompt = compose_prompt(message, &context, document, self.prompt_char_budget);

        match self.gateway.invoke(&prompt, &credential).await {
            Ok(text) => (text, ResponseMode::Remote),
            Err(err) => {
                tracing::warn!(error = %err, "Remote model failed, using offline engine");
                let reply = self.offline.respond(message, &context, document).await;
                (format!("{}\n\n{}", err.user_notice(), reply.text), ResponseMode::Degraded(err))
            }
        }
    }

    /// Make sure the session transcript (and its welcome message) exists
    /// before the first message of the turn is appended.
    fn open_session(&mut self, user_id: &str, user_name: &str) {
        if let Err(e) = self.conversations.load(user_id, user_name) {
            tracing::warn!(user = %user_id, error = %e, "Could not load conversation");
        }
    }

    fn record(&mut self, user_id: &str, message: &Message) -> bool {
        match self.conversations.append(user_id, message.clone()) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(user = %user_id, error = %e, "Failed to persist message");
                false
            }
        }
    }

    fn finish_turn(
        &mut self,
        user_id: &str,
        user_message: Message,
        content: String,
        mode: ResponseMode,
    ) -> TurnOutcome {
        let assistant_message = self.conversations.create_message(MessageRole::Assistant, content);
        self.record(user_id, &assistant_message);

        tracing::info!(
            state = ?TurnState::Done,
            user = %user_id,
            mode = ?mode,
            chars = assistant_message.content.len(),
            "Turn complete"
        );

        TurnOutcome {
            user_message,
            assistant_message,
            mode,
        }
    }
}
