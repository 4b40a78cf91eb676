//! Remote model gateway.
//!
//! A single provider (Gemini) behind the [`ModelGateway`] trait so the
//! orchestrator can be driven by a scripted gateway in tests.

pub mod gemini;
pub mod prompt;

pub use gemini::{select_model, GeminiGateway};
pub use prompt::compose_prompt;

use async_trait::async_trait;
use thiserror::Error;

/// Stable taxonomy for remote failures. Every variant is recoverable: the
/// orchestrator falls back to the offline engine.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GatewayError {
    #[error("API key rejected: {0}")]
    Auth(String),

    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("model returned no candidates")]
    NoCandidates,

    #[error("upstream error ({code}): {message}")]
    Upstream { code: u16, message: String },
}

impl GatewayError {
    /// Short Indonesian notice shown above a degraded (offline) answer.
    pub fn user_notice(&self) -> String {
        match self {
            Self::Transport(_) => {
                "⚠️ Koneksi ke layanan AI sedang bermasalah. Periksa koneksi internetmu.".to_string()
            }
            Self::Upstream { code: 404, .. } => {
                "⚠️ Model AI tidak tersedia saat ini.".to_string()
            }
            Self::Auth(_) => {
                "⚠️ API key tidak valid atau sudah kedaluwarsa. Perbarui di pengaturan.".to_string()
            }
            Self::QuotaExceeded(_) => {
                "⚠️ Batas penggunaan API tercapai. Coba lagi nanti.".to_string()
            }
            Self::NoCandidates => format!("⚠️ {}", self),
            Self::Upstream { message, .. } => format!("⚠️ {}", message),
        }
    }
}

#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Send one composed prompt and return the model's text verbatim.
    async fn invoke(&self, prompt: &str, credential: &str) -> Result<String, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_mapping() {
        assert!(GatewayError::Transport("dns".into()).user_notice().contains("Koneksi"));
        assert!(GatewayError::Auth("bad".into()).user_notice().contains("API key"));
        assert!(GatewayError::QuotaExceeded("429".into())
            .user_notice()
            .contains("Batas penggunaan"));
        assert!(GatewayError::Upstream { code: 404, message: "not found".into() }
            .user_notice()
            .contains("tidak tersedia"));
    }

    #[test]
    fn test_other_upstream_errors_pass_message_through() {
        let err = GatewayError::Upstream {
            code: 500,
            message: "Internal error encountered.".into(),
        };
        assert_eq!(err.user_notice(), "⚠️ Internal error encountered.");
    }
}
