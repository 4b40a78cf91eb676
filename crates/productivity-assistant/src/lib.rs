//! Core of a personal productivity assistant: context aggregation over the
//! user's activity logs, PDF extraction, a remote Gemini gateway with an
//! offline template fallback, and a persisted conversation transcript.

pub mod chat;
pub mod config;
pub mod context;
pub mod llm;
pub mod memory;
pub mod processing;
pub mod settings;
pub mod storage;
pub mod types;

pub use chat::{DocumentUpload, ResponseMode, ResponseOrchestrator, TurnOutcome};
pub use config::AssistantConfig;
pub use context::ContextAggregator;
pub use llm::{GatewayError, GeminiGateway, ModelGateway};
pub use memory::ConversationStore;
pub use processing::{ExtractionError, PdfExtractor};
pub use settings::Settings;
pub use storage::{InMemoryStore, JsonFileStore, KeyValueStore, StoreError, StoreKey};
pub use types::{DocumentAnalysis, Message, MessageRole, Money, UserContext};

pub use anyhow::{Error, Result};
