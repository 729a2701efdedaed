pub mod gemini;
pub mod ocr;
pub mod placeholder;
pub mod prompts;
pub mod resolver;
pub mod tutor;

pub use gemini::GeminiClient;
pub use ocr::{OcrResponse, OcrSpaceOptions, OcrSpaceProvider, UnconfiguredProvider, VisionOcrProvider};
pub use placeholder::{is_placeholder, placeholder_text, PLACEHOLDER_TAG};
pub use resolver::{OcrChain, OcrResolver, OcrSettings, OcrStage, RetryPolicy};
pub use tutor::Tutor;
