//! Tutoring requests on top of a completion provider.

use std::sync::Arc;

use tracing::info;

use studybot_core::{BotError, CompletionProvider, Subject};

use crate::prompts;

#[derive(Clone)]
pub struct Tutor {
    completion: Arc<dyn CompletionProvider>,
}

impl Tutor {
    pub fn new(completion: Arc<dyn CompletionProvider>) -> Self {
        Self { completion }
    }

    pub fn completion(&self) -> Arc<dyn CompletionProvider> {
        Arc::clone(&self.completion)
    }

    /// Free-form question.
    pub async fn chat(&self, question: &str) -> Result<String, BotError> {
        info!(provider = self.completion.name(), "Answering chat question");
        self.completion.complete(&prompts::chat(question), None).await
    }

    /// Structure recognized homework text by subject.
    pub async fn analyze_homework(&self, ocr_text: &str) -> Result<String, BotError> {
        info!(chars = ocr_text.len(), "Analyzing homework text");
        self.completion.complete(&prompts::homework_analysis(ocr_text), None).await
    }

    /// Solve the exercises on a recognized book page.
    pub async fn solve_page(&self, subject: Subject, page: &str, page_text: &str) -> Result<String, BotError> {
        info!(%subject, page, "Generating page solution");
        self.completion
            .complete(&prompts::solution(subject, page, page_text), None)
            .await
    }

    /// Answer a question about a page; works without the page text too.
    pub async fn homework_help(
        &self,
        subject: Subject,
        page: &str,
        question: &str,
        page_text: Option<&str>,
    ) -> Result<String, BotError> {
        info!(%subject, page, with_page_text = page_text.is_some(), "Generating homework help");
        self.completion
            .complete(&prompts::homework_help(subject, page, question, page_text), None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use studybot_core::ImageInput;

    #[derive(Default)]
    struct Recording {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CompletionProvider for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        async fn complete(&self, prompt: &str, _image: Option<&ImageInput>) -> Result<String, BotError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("Antwort".to_string())
        }
    }

    #[tokio::test]
    async fn each_request_uses_its_own_template() {
        let recording = Arc::new(Recording::default());
        let tutor = Tutor::new(recording.clone());

        assert_eq!(tutor.chat("Was ist Photosynthese?").await.unwrap(), "Antwort");
        tutor.analyze_homework("Deutsch: Gedicht lernen").await.unwrap();
        tutor.solve_page(Subject::Chemie, "3", "Reaktion").await.unwrap();
        tutor
            .homework_help(Subject::Mathe, "82", "Wie kürze ich?", None)
            .await
            .unwrap();

        let prompts = recording.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 4);
        assert!(prompts[0].contains("Was ist Photosynthese?"));
        assert!(prompts[1].contains("Hausaufgaben-Assistent"));
        assert!(prompts[2].contains("Fach \"Chemie\""));
        assert!(prompts[3].contains("Wie kürze ich?"));
    }

    #[tokio::test]
    async fn provider_errors_propagate() {
        struct Failing;
        #[async_trait]
        impl CompletionProvider for Failing {
            fn name(&self) -> &str {
                "failing"
            }
            async fn complete(&self, _: &str, _: Option<&ImageInput>) -> Result<String, BotError> {
                Err(BotError::provider("Gemini API", "Limit erreicht"))
            }
        }

        let tutor = Tutor::new(Arc::new(Failing));
        let err = tutor.chat("Hallo").await.unwrap_err();
        assert!(matches!(err, BotError::ProviderFailure { .. }));
    }
}
