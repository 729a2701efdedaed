//! OCR backends: OCR.space (keyed and free tier), the vision-model fallback,
//! and the unconfigured alternative slot.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use serde::Deserialize;
use tracing::{debug, info};

use studybot_core::{BotError, CompletionProvider, ImageInput, OcrProvider};
use studybot_media::{optimize_for_ocr, ImageKind};

use crate::prompts;

const OCR_SPACE_ENDPOINT: &str = "https://api.ocr.space/parse/image";
pub const DEFAULT_LANGUAGE: &str = "ger";

/// Request knobs that differ between the keyed and the free-tier service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrSpaceOptions {
    pub engine: u8,
    pub table: bool,
    pub timeout: Duration,
    pub language: String,
}

impl OcrSpaceOptions {
    /// Engine 2 with table detection, 30 s timeout.
    pub fn primary() -> Self {
        Self { engine: 2, table: true, timeout: Duration::from_secs(30), language: DEFAULT_LANGUAGE.into() }
    }

    /// Engine 1, no table detection, 45 s timeout.
    pub fn free_tier() -> Self {
        Self { engine: 1, table: false, timeout: Duration::from_secs(45), language: DEFAULT_LANGUAGE.into() }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

/// OCR.space client for one API key.
pub struct OcrSpaceProvider {
    client: reqwest::Client,
    label: String,
    api_key: String,
    options: OcrSpaceOptions,
    endpoint: String,
}

impl OcrSpaceProvider {
    pub fn new(
        client: reqwest::Client,
        label: impl Into<String>,
        api_key: impl Into<String>,
        options: OcrSpaceOptions,
    ) -> Self {
        Self {
            client,
            label: label.into(),
            api_key: api_key.into(),
            options,
            endpoint: OCR_SPACE_ENDPOINT.to_string(),
        }
    }

    /// Point at a different OCR.space-compatible endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn form(&self, base64_image: String) -> Vec<(&'static str, String)> {
        let mut form = vec![
            ("apikey", self.api_key.clone()),
            ("base64Image", format!("data:image/jpeg;base64,{base64_image}")),
            ("language", self.options.language.clone()),
            ("isOverlayRequired", "false".to_string()),
            ("detectOrientation", "true".to_string()),
            ("scale", "true".to_string()),
            ("OCREngine", self.options.engine.to_string()),
        ];
        if self.options.table {
            form.push(("isTable", "true".to_string()));
        }
        form
    }
}

#[async_trait]
impl OcrProvider for OcrSpaceProvider {
    fn name(&self) -> &str {
        &self.label
    }

    async fn recognize(&self, image: &[u8]) -> Result<String, BotError> {
        let optimized = optimize_for_ocr(Bytes::copy_from_slice(image)).await;
        let form = self.form(STANDARD.encode(&optimized));

        debug!(provider = %self.label, engine = self.options.engine, "Sending image to OCR.space");
        let resp = self
            .client
            .post(&self.endpoint)
            .timeout(self.options.timeout)
            .form(&form)
            .send()
            .await
            .map_err(|e| BotError::provider(&self.label, e.without_url().to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(BotError::provider(&self.label, format!("HTTP {status}")));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| BotError::provider(&self.label, e.without_url().to_string()))?;

        let text = OcrResponse::parse(&body)
            .and_then(OcrResponse::into_text)
            .map_err(|message| BotError::provider(&self.label, message))?;
        info!(provider = %self.label, chars = text.len(), "OCR.space succeeded");
        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// Response mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawOcrResponse {
    #[serde(rename = "OCRExitCode", default)]
    ocr_exit_code: Option<i64>,
    #[serde(default)]
    parsed_results: Option<Vec<RawParsedResult>>,
    #[serde(default)]
    error_message: Option<RawErrorMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawParsedResult {
    #[serde(default)]
    parsed_text: String,
}

/// OCR.space sends `ErrorMessage` as a string or a list of strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawErrorMessage {
    One(String),
    Many(Vec<String>),
}

/// The parts of an OCR.space reply the resolver cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrResponse {
    pub text: Option<String>,
    pub exit_code: i64,
    pub error_message: Option<String>,
}

impl From<RawOcrResponse> for OcrResponse {
    fn from(raw: RawOcrResponse) -> Self {
        let text = raw
            .parsed_results
            .and_then(|results| results.into_iter().next())
            .map(|r| r.parsed_text);
        let error_message = raw.error_message.map(|m| match m {
            RawErrorMessage::One(s) => s,
            RawErrorMessage::Many(v) => v.join("; "),
        });
        Self { text, exit_code: raw.ocr_exit_code.unwrap_or(0), error_message }
    }
}

impl OcrResponse {
    /// Parse a raw JSON body. Malformed JSON is an error, never a panic.
    pub fn parse(body: &str) -> Result<Self, String> {
        serde_json::from_str::<RawOcrResponse>(body)
            .map(Self::from)
            .map_err(|e| format!("invalid response: {e}"))
    }

    /// The recognized text when the service reported success.
    pub fn into_text(self) -> Result<String, String> {
        match (self.exit_code, self.text) {
            (1, Some(text)) => Ok(text),
            (1, None) => Err("no parsed results".to_string()),
            (code, _) => Err(format!(
                "exit code {code}: {}",
                self.error_message.as_deref().unwrap_or("unknown error")
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Vision fallback
// ---------------------------------------------------------------------------

/// Asks a vision-capable completion model to transcribe the image.
pub struct VisionOcrProvider {
    completion: Arc<dyn CompletionProvider>,
}

impl VisionOcrProvider {
    pub fn new(completion: Arc<dyn CompletionProvider>) -> Self {
        Self { completion }
    }
}

#[async_trait]
impl OcrProvider for VisionOcrProvider {
    fn name(&self) -> &str {
        "vision fallback"
    }

    async fn recognize(&self, image: &[u8]) -> Result<String, BotError> {
        let mime_type = ImageKind::sniff(image).map_or("image/jpeg", |k| k.mime_type());
        let input = ImageInput {
            mime_type: mime_type.to_string(),
            data: Bytes::copy_from_slice(image),
        };
        let text = self
            .completion
            .complete(&prompts::vision_transcription(), Some(&input))
            .await?;
        if text.trim().is_empty() {
            return Err(BotError::provider(self.completion.name(), "empty transcription"));
        }
        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// Alternative slot
// ---------------------------------------------------------------------------

/// Stage for a provider that is not wired up. Always fails with `ConfigMissing`.
pub struct UnconfiguredProvider {
    label: String,
}

impl UnconfiguredProvider {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

#[async_trait]
impl OcrProvider for UnconfiguredProvider {
    fn name(&self) -> &str {
        &self.label
    }

    async fn recognize(&self, _image: &[u8]) -> Result<String, BotError> {
        Err(BotError::ConfigMissing(self.label.clone()))
    }
}
