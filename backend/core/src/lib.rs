pub mod channel;
pub mod error;
pub mod message;
pub mod traits;
pub mod types;

pub use channel::ConnectionStatus;
pub use error::{BotError, ValidationError};
pub use message::{InboundAttachment, InboundMessage, OutboundFile, Reply};
pub use traits::{ChatChannel, CompletionProvider, DocumentStore, ImageInput, OcrProvider};
pub use types::{LookupQuery, OcrResult, OcrSource, StoredDocument, Subject};
