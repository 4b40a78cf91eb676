use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub data_dir: PathBuf,
    pub gemini: GeminiConfig,
    pub documents: DocumentConfig,
    pub offline: OfflineConfig,
    pub conversation: ConversationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub base_url: String,
    /// Preferred models, most capable / lowest latency first.
    pub model_priority: Vec<String>,
    /// Used when the model listing cannot be fetched or is empty.
    pub default_model: String,
    /// Maximum characters of document text embedded in a prompt.
    pub prompt_char_budget: usize,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// Credential used when the user has not configured their own key.
    #[serde(skip_serializing)]
    pub fallback_api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    pub max_pages: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OfflineConfig {
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    pub max_messages: usize,
}

impl AssistantConfig {
    /// Validate config values, returning errors for clearly broken configurations.
    pub fn validate(&self) -> Result<(), String> {
        if self.gemini.model_priority.is_empty() {
            return Err("gemini.model_priority must not be empty".into());
        }
        if self.gemini.default_model.trim().is_empty() {
            return Err("gemini.default_model must not be empty".into());
        }
        if self.gemini.prompt_char_budget == 0 {
            return Err("gemini.prompt_char_budget must be > 0".into());
        }
        if self.documents.max_pages == 0 {
            return Err("documents.max_pages must be > 0".into());
        }
        if self.conversation.max_messages == 0 {
            return Err("conversation.max_messages must be > 0".into());
        }
        if self.offline.min_delay_ms > self.offline.max_delay_ms {
            return Err("offline.min_delay_ms must be <= offline.max_delay_ms".into());
        }
        Ok(())
    }

    /// Load config from a JSON file, falling back to defaults for missing fields.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        let mut config: Self = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            let key = key.trim();
            if !key.is_empty() {
                self.gemini.fallback_api_key = Some(key.to_string());
            }
        }
        if let Ok(dir) = std::env::var("ASSISTANT_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
    }

    /// Configuration for non-interactive runs: no artificial delay.
    pub fn without_delay(mut self) -> Self {
        self.offline.min_delay_ms = 0;
        self.offline.max_delay_ms = 0;
        self
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("productivity-assistant");

        Self {
            data_dir,
            gemini: GeminiConfig::default(),
            documents: DocumentConfig::default(),
            offline: OfflineConfig::default(),
            conversation: ConversationConfig::default(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model_priority: vec![
                "gemini-1.5-flash-latest".to_string(),
                "gemini-1.5-flash".to_string(),
                "gemini-1.5-pro-latest".to_string(),
                "gemini-1.5-pro".to_string(),
                "gemini-pro".to_string(),
            ],
            default_model: "gemini-1.5-flash".to_string(),
            prompt_char_budget: 10_000,
            temperature: 0.7,
            max_output_tokens: 1024,
            connect_timeout_secs: 15,
            request_timeout_secs: 60,
            fallback_api_key: None,
        }
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self { max_pages: 10 }
    }
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 800,
            max_delay_ms: 2000,
        }
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self { max_messages: 50 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AssistantConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.documents.max_pages, 10);
        assert_eq!(config.conversation.max_messages, 50);
        assert_eq!(config.gemini.model_priority[0], "gemini-1.5-flash-latest");
    }

    #[test]
    fn test_validate_rejects_inverted_delay() {
        let mut config = AssistantConfig::default();
        config.offline.min_delay_ms = 3000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"documents":{"max_pages":5},"offline":{"min_delay_ms":0,"max_delay_ms":0}}"#)
            .unwrap();

        let config = AssistantConfig::from_file(&path).unwrap();
        assert_eq!(config.documents.max_pages, 5);
        assert_eq!(config.offline.max_delay_ms, 0);
        assert_eq!(config.conversation.max_messages, 50);
        assert_eq!(config.gemini.default_model, "gemini-1.5-flash");
    }

    #[test]
    fn test_fallback_key_not_serialized() {
        let mut config = AssistantConfig::default();
        config.gemini.fallback_api_key = Some("secret".to_string());
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
