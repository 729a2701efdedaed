//! Gemini `generateContent` client, used for chat, solutions and as the
//! vision OCR fallback.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::{info, warn};

use studybot_core::{BotError, CompletionProvider, ImageInput};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(45);
const PROVIDER: &str = "Gemini API";

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self { client, api_key: api_key.into(), model: DEFAULT_MODEL.to_string() }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body(prompt: &str, image: Option<&ImageInput>) -> Value {
        let mut parts = vec![json!({ "text": prompt })];
        if let Some(image) = image {
            parts.push(json!({
                "inlineData": { "mimeType": image.mime_type, "data": STANDARD.encode(&image.data) }
            }));
        }
        json!({ "contents": [{ "parts": parts }] })
    }
}

#[async_trait]
impl CompletionProvider for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, prompt: &str, image: Option<&ImageInput>) -> Result<String, BotError> {
        info!(model = %self.model, with_image = image.is_some(), "Sending request to Gemini");
        let url = format!("{API_BASE}/{}:generateContent", self.model);
        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&Self::request_body(prompt, image))
            .send()
            .await
            .map_err(|e| BotError::provider(PROVIDER, e.without_url().to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(%status, "Gemini request failed");
            return Err(classify_status(status, &body));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| BotError::provider(PROVIDER, format!("invalid response: {}", e.without_url())))?;
        extract_text(&json).map_err(|message| BotError::provider(PROVIDER, message))
    }
}

fn classify_status(status: StatusCode, body: &str) -> BotError {
    let message = match status {
        StatusCode::TOO_MANY_REQUESTS => "Limit erreicht".to_string(),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => "API Key Problem".to_string(),
        StatusCode::BAD_REQUEST if body.contains("API_KEY") => "API Key Problem".to_string(),
        _ => format!("HTTP {status}"),
    };
    BotError::provider(PROVIDER, message)
}

/// Pull the first candidate's text out of a `generateContent` reply.
pub fn extract_text(json: &Value) -> Result<String, String> {
    if let Some(reason) = json["promptFeedback"]["blockReason"].as_str() {
        return Err(format!("Anfrage blockiert ({reason})"));
    }
    let candidate = &json["candidates"][0];
    if candidate.is_null() {
        return Err("keine Antwort erhalten".to_string());
    }
    if candidate["finishReason"].as_str() == Some("SAFETY") {
        return Err("Anfrage aus Sicherheitsgründen blockiert".to_string());
    }
    let text: String = candidate["content"]["parts"]
        .as_array()
        .map(|parts| parts.iter().filter_map(|p| p["text"].as_str()).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err("leere Antwort".to_string());
    }
    Ok(text)
}
