use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// An attachment on an inbound chat message, downloadable by URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundAttachment {
    pub filename: String,
    pub url: String,
}

/// A text message delivered by the chat platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub id: String,
    pub author_id: String,
    pub channel_id: String,
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<InboundAttachment>,
}

/// A binary file sent along with a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundFile {
    pub name: String,
    pub data: Bytes,
}

/// What the bot sends back: text plus optional files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub attachments: Vec<OutboundFile>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachments: Vec::new(),
        }
    }

    pub fn with_file(mut self, name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.attachments.push(OutboundFile {
            name: name.into(),
            data: data.into(),
        });
        self
    }
}
