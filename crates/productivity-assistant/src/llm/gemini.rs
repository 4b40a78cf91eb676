//! Gemini REST client: model resolution plus `generateContent`.
//!
//! Resolution is best-effort. Any failure while listing models is logged and
//! replaced by the configured default model, so it never blocks the request.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{GatewayError, ModelGateway};
use crate::config::GeminiConfig;

pub struct GeminiGateway {
    client: Client,
    base_url: String,
    model_priority: Vec<String>,
    default_model: String,
    temperature: f32,
    max_output_tokens: u32,
}

// ── Wire types ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ModelListing {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelInfo {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<u16>,
    #[serde(default)]
    message: String,
    status: Option<String>,
}

impl GeminiGateway {
    pub fn new(config: &GeminiConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .tcp_nodelay(true)
            .build()?;

        tracing::info!(
            base_url = %config.base_url,
            default_model = %config.default_model,
            "Creating GeminiGateway"
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model_priority: config.model_priority.clone(),
            default_model: config.default_model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    /// Pick a model for this call. Never fails.
    pub async fn resolve_model(&self, credential: &str) -> String {
        match self.list_generation_models(credential).await {
            Ok(available) => {
                let model = select_model(&available, &self.model_priority, &self.default_model);
                tracing::debug!(available = available.len(), model = %model, "Resolved Gemini model");
                model
            }
            Err(e) => {
                tracing::warn!(error = %e, fallback = %self.default_model, "Model listing failed, using default model");
                self.default_model.clone()
            }
        }
    }

    async fn list_generation_models(&self, credential: &str) -> Result<Vec<String>, GatewayError> {
        let endpoint = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&endpoint)
            .header("x-goog-api-key", credential)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(classify_status(status.as_u16(), &body));
        }

        let listing: ModelListing = serde_json::from_str(&body).map_err(|e| GatewayError::Upstream {
            code: status.as_u16(),
            message: format!("malformed model listing: {}", e),
        })?;
        Ok(generation_capable(listing))
    }

    async fn generate(&self, model: &str, prompt: &str, credential: &str) -> Result<String, GatewayError> {
        let endpoint = format!("{}/models/{}:generateContent", self.base_url, model);
        let request = json!({
            "contents": [{
                "parts": [{"text": prompt}]
            }],
            "generationConfig": {
                "temperature": self.temperature,
                "maxOutputTokens": self.max_output_tokens,
            }
        });

        let response = self
            .client
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", credential)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Transport(format!("request to {} timed out", model))
                } else {
                    GatewayError::Transport(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        classify_generation_response(status, &body)
    }
}

#[async_trait]
impl ModelGateway for GeminiGateway {
    async fn invoke(&self, prompt: &str, credential: &str) -> Result<String, GatewayError> {
        let model = self.resolve_model(credential).await;
        let start = std::time::Instant::now();
        let result = self.generate(&model, prompt, credential).await;

        match &result {
            Ok(text) => tracing::info!(
                model = %model,
                latency_ms = start.elapsed().as_millis() as u64,
                chars = text.len(),
                "Gemini generation succeeded"
            ),
            Err(e) => tracing::warn!(model = %model, error = %e, "Gemini generation failed"),
        }
        result
    }
}

// ── Pure helpers ───────────────────────────────────────────────────────────

/// First priority entry that is available, else the first available model,
/// else the default.
pub fn select_model(available: &[String], priority: &[String], default_model: &str) -> String {
    priority
        .iter()
        .find(|wanted| available.contains(*wanted))
        .or_else(|| available.first())
        .cloned()
        .unwrap_or_else(|| default_model.to_string())
}

/// Ids (without the `models/` prefix) of models that support generateContent.
fn generation_capable(listing: ModelListing) -> Vec<String> {
    listing
        .models
        .into_iter()
        .filter(|m| m.supported_generation_methods.iter().any(|g| g == "generateContent"))
        .map(|m| m.name.trim_start_matches("models/").to_string())
        .collect()
}

fn classify_generation_response(status: u16, body: &str) -> Result<String, GatewayError> {
    let parsed: GenerateResponse = match serde_json::from_str(body) {
        Ok(p) => p,
        Err(e) if (200..300).contains(&status) => {
            return Err(GatewayError::Upstream {
                code: status,
                message: format!("malformed response: {}", e),
            });
        }
        Err(_) => return Err(classify_status(status, body)),
    };

    if let Some(err) = parsed.error {
        return Err(classify_api_error(err.code.unwrap_or(status), err.status.as_deref(), err.message));
    }
    if !(200..300).contains(&status) {
        return Err(classify_status(status, body));
    }

    let candidate = parsed.candidates.into_iter().next().ok_or(GatewayError::NoCandidates)?;
    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
    let text: String = parts.into_iter().filter_map(|p| p.text).collect();
    if text.is_empty() {
        return Err(GatewayError::NoCandidates);
    }
    Ok(text)
}

fn classify_api_error(code: u16, status: Option<&str>, message: String) -> GatewayError {
    let lower = message.to_lowercase();
    match (code, status) {
        (429, _) | (_, Some("RESOURCE_EXHAUSTED")) => GatewayError::QuotaExceeded(message),
        (401 | 403, _) | (_, Some("UNAUTHENTICATED" | "PERMISSION_DENIED")) => GatewayError::Auth(message),
        (400, _) if lower.contains("api key") => GatewayError::Auth(message),
        _ => GatewayError::Upstream { code, message },
    }
}

/// Non-2xx response without a structured error body.
fn classify_status(status: u16, body: &str) -> GatewayError {
    let preview: String = body.trim().chars().take(200).collect();
    let message = if preview.is_empty() {
        format!("HTTP {}", status)
    } else {
        preview
    };
    classify_api_error(status, None, message)
}
