use async_trait::async_trait;
use bytes::Bytes;

use crate::error::BotError;
use crate::message::{InboundAttachment, Reply};
use crate::types::StoredDocument;

/// The chat conversation a command arrived in.
#[async_trait]
pub trait ChatChannel: Send + Sync {
    /// Send a reply into the conversation.
    async fn send(&self, reply: Reply) -> anyhow::Result<()>;

    /// Attachments from the most recent `limit` messages, newest first.
    async fn recent_attachments(&self, limit: u8) -> anyhow::Result<Vec<InboundAttachment>>;
}

/// Image content passed to a vision-capable completion.
#[derive(Debug, Clone)]
pub struct ImageInput {
    pub mime_type: String,
    pub data: Bytes,
}

/// Trait for the generative-AI text/vision API.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send a prompt, optionally with one image, and return the response text.
    async fn complete(&self, prompt: &str, image: Option<&ImageInput>) -> Result<String, BotError>;
}

/// Flat remote namespace holding book pages and material sheets.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every stored file, in the backend's natural iteration order.
    async fn list_files(&self) -> Result<Vec<StoredDocument>, BotError>;

    async fn download(&self, document: &StoredDocument) -> Result<Bytes, BotError>;
}

/// One OCR backend. Any failure, including an HTTP success that carries an
/// error code, is reported as `Err` so the resolver can move on.
#[async_trait]
pub trait OcrProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn recognize(&self, image: &[u8]) -> Result<String, BotError>;
}
