/// Built-in command handlers.
///
/// Each handler is a concrete struct implementing `CommandHandler`. They share
/// one [`BotServices`] bundle; an unconfigured service surfaces as
/// `BotError::ConfigMissing` when a command needs it.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{info, warn};

use studybot_core::{BotError, LookupQuery, Reply};
use studybot_locator::{is_homework_image, DocumentLocator};
use studybot_media::{fetch_image, validate_image};
use studybot_understanding::{OcrResolver, Tutor};

use crate::dispatch::{CommandContext, CommandHandler};
use crate::format::{decorate_homework, file_token, help_text, long_reply, page_label};
use crate::gate::GatePolicy;
use crate::types::BotCommand;

/// How many recent channel messages `.ha` scans for a homework photo.
const RECENT_MESSAGE_SCAN: u8 = 100;

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

/// Collaborators shared by all handlers.
pub struct BotServices {
    pub locator: Option<DocumentLocator>,
    pub ocr: Arc<OcrResolver>,
    pub tutor: Option<Tutor>,
    pub http: reqwest::Client,
    pub ocr_attempts: u32,
    /// Pause between two material uploads.
    pub material_pause: Duration,
}

impl BotServices {
    pub fn new(ocr: Arc<OcrResolver>, http: reqwest::Client) -> Self {
        Self {
            locator: None,
            ocr,
            tutor: None,
            http,
            ocr_attempts: 2,
            material_pause: Duration::from_secs(1),
        }
    }

    pub fn with_locator(mut self, locator: Option<DocumentLocator>) -> Self {
        self.locator = locator;
        self
    }

    pub fn with_tutor(mut self, tutor: Option<Tutor>) -> Self {
        self.tutor = tutor;
        self
    }

    pub fn with_material_pause(mut self, pause: Duration) -> Self {
        self.material_pause = pause;
        self
    }

    fn locator(&self) -> Result<&DocumentLocator, BotError> {
        self.locator
            .as_ref()
            .ok_or_else(|| BotError::ConfigMissing("MEGA_EMAIL/MEGA_PASSWORD".into()))
    }

    fn tutor(&self) -> Result<&Tutor, BotError> {
        self.tutor
            .as_ref()
            .ok_or_else(|| BotError::ConfigMissing("GEMINI_API_KEY".into()))
    }

    /// Locate and download a book page.
    async fn load_page(&self, query: &LookupQuery) -> Result<(String, Bytes), BotError> {
        let locator = self.locator()?;
        let doc = locator.locate_query(query).await?;
        let data = locator.fetch(&doc).await?;
        Ok((doc.name, data))
    }

    /// OCR text of a page, or `None` when recognition fell back to the placeholder.
    async fn recognize(&self, image: &[u8]) -> Option<String> {
        let result = self.ocr.resolve_with_retry(image, self.ocr_attempts).await;
        if result.is_placeholder() {
            None
        } else {
            info!(source = %result.source, chars = result.text.len(), "Text recognized");
            Some(result.text)
        }
    }
}

fn unexpected(expected: &str, command: &BotCommand) -> BotError {
    BotError::Other(anyhow::anyhow!("{expected} handler received {}", command.kind()))
}

// ---------------------------------------------------------------------------
// .ha
// ---------------------------------------------------------------------------

pub struct HomeworkHandler {
    services: Arc<BotServices>,
}

impl HomeworkHandler {
    pub fn new(services: Arc<BotServices>) -> Self {
        Self { services }
    }

    /// Newest homework photo posted in the channel, else the store's one.
    async fn homework_image(&self, ctx: &CommandContext<'_>) -> Result<Bytes, BotError> {
        match ctx.channel.recent_attachments(RECENT_MESSAGE_SCAN).await {
            Ok(attachments) => {
                if let Some(att) = attachments.iter().find(|a| is_homework_image(&a.filename)) {
                    info!(file = %att.filename, "Using homework image from channel");
                    let (data, _) = fetch_image(&self.services.http, &att.url).await?;
                    return Ok(data);
                }
            }
            Err(e) => warn!(error = %e, "Could not read recent channel messages"),
        }

        if let Some(locator) = &self.services.locator {
            if let Some(doc) = locator.find_homework_image().await? {
                let data = locator.fetch(&doc).await?;
                validate_image(&data)?;
                return Ok(data);
            }
        }
        Err(BotError::Usage(
            "❌ Kein Hausaufgaben-Bild gefunden. Lade ein Bild mit \"ha\" im Namen in Discord hoch oder speichere `ha.jpg` in MEGA.".into(),
        ))
    }
}

#[async_trait]
impl CommandHandler for HomeworkHandler {
    async fn handle(&self, _command: &BotCommand, ctx: &CommandContext<'_>) -> Result<(), BotError> {
        let tutor = self.services.tutor()?;
        ctx.say("⏳ Analysiere Hausaufgaben...").await?;

        let image = self.homework_image(ctx).await?;
        let result = self.services.ocr.resolve_with_retry(&image, self.services.ocr_attempts).await;
        if result.is_placeholder() {
            return ctx.say(result.text).await;
        }

        let analysis = tutor.analyze_homework(&result.text).await?;
        let header = "📝 **Hausaufgaben:**";
        ctx.reply(long_reply(
            format!("{header}\n\n{}", decorate_homework(&analysis)),
            header,
            "hausaufgaben.txt",
        ))
        .await
    }
}

// ---------------------------------------------------------------------------
// .lsg
// ---------------------------------------------------------------------------

pub struct SolutionHandler {
    services: Arc<BotServices>,
}

impl SolutionHandler {
    pub fn new(services: Arc<BotServices>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl CommandHandler for SolutionHandler {
    async fn handle(&self, command: &BotCommand, ctx: &CommandContext<'_>) -> Result<(), BotError> {
        let BotCommand::Solution(query) = command else {
            return Err(unexpected("solution", command));
        };
        let tutor = self.services.tutor()?;
        ctx.say("⏳ Lade Buchseite...").await?;

        let (name, data) = self.services.load_page(query).await?;
        let label = page_label(query.subject, &query.page);
        ctx.reply(Reply::text(format!("📖 **Originalbild:** {label}")).with_file(name, data.clone()))
            .await?;

        validate_image(&data)?;
        let page_text = self.services.recognize(&data).await.ok_or(BotError::ExhaustedFallback)?;
        let solution = tutor.solve_page(query.subject, &query.page, &page_text).await?;

        let header = format!("🤖 Lösungen für {label}:");
        let file_name = format!("loesung_{}_seite_{}.txt", file_token(query.subject), query.page);
        ctx.reply(long_reply(format!("{header}\n\n{solution}"), &header, &file_name)).await
    }
}

// ---------------------------------------------------------------------------
// .ai
// ---------------------------------------------------------------------------

pub struct ChatHandler {
    services: Arc<BotServices>,
}

impl ChatHandler {
    pub fn new(services: Arc<BotServices>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl CommandHandler for ChatHandler {
    async fn handle(&self, command: &BotCommand, ctx: &CommandContext<'_>) -> Result<(), BotError> {
        let BotCommand::Chat { prompt } = command else {
            return Err(unexpected("chat", command));
        };
        let tutor = self.services.tutor()?;
        ctx.say("⏳ Denke nach...").await?;

        let answer = tutor.chat(prompt).await?;
        let header = "🤖 **Gemini Chat:**";
        ctx.reply(long_reply(format!("{header}\n\n{answer}"), header, "ai_antwort.txt")).await
    }
}

// ---------------------------------------------------------------------------
// .a
// ---------------------------------------------------------------------------

pub struct HomeworkHelpHandler {
    services: Arc<BotServices>,
}

impl HomeworkHelpHandler {
    pub fn new(services: Arc<BotServices>) -> Self {
        Self { services }
    }

    /// Page text if it can be had; every failure is only logged.
    async fn page_text(&self, query: &LookupQuery) -> Option<String> {
        let (_, data) = match self.services.load_page(query).await {
            Ok(page) => page,
            Err(e) => {
                warn!(%query, error = %e, "Page unavailable, helping without it");
                return None;
            }
        };
        if let Err(e) = validate_image(&data) {
            warn!(%query, error = %e, "Page image unusable, helping without it");
            return None;
        }
        self.services.recognize(&data).await
    }
}

#[async_trait]
impl CommandHandler for HomeworkHelpHandler {
    async fn handle(&self, command: &BotCommand, ctx: &CommandContext<'_>) -> Result<(), BotError> {
        let BotCommand::HomeworkHelp { query, question } = command else {
            return Err(unexpected("homework help", command));
        };
        let tutor = self.services.tutor()?;
        ctx.say("⏳ Bereite Hilfe vor...").await?;

        let page_text = self.page_text(query).await;
        let help = tutor
            .homework_help(query.subject, &query.page, question, page_text.as_deref())
            .await?;

        let header = format!("🎓 Hausaufgaben-Hilfe für {}:", page_label(query.subject, &query.page));
        let file_name = format!("hilfe_{}_seite_{}.txt", file_token(query.subject), query.page);
        ctx.reply(long_reply(format!("{header}\n\n{help}"), &header, &file_name)).await
    }
}

// ---------------------------------------------------------------------------
// .material
// ---------------------------------------------------------------------------

pub struct MaterialHandler {
    services: Arc<BotServices>,
}

impl MaterialHandler {
    pub fn new(services: Arc<BotServices>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl CommandHandler for MaterialHandler {
    async fn handle(&self, command: &BotCommand, ctx: &CommandContext<'_>) -> Result<(), BotError> {
        let BotCommand::Material(query) = command else {
            return Err(unexpected("material", command));
        };
        let locator = self.services.locator()?;
        ctx.say("⏳ Suche Material-Dateien...").await?;

        let docs = locator.locate_all_query(query).await?;
        let total = docs.len();
        ctx.say(format!(
            "📄 **{total} Material-Datei(en) für {}:**",
            page_label(query.subject, &query.page)
        ))
        .await?;

        for (i, doc) in docs.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.services.material_pause).await;
            }
            let data = locator.fetch(doc).await?;
            ctx.reply(
                Reply::text(format!("📄 **Material {}/{total}:** {}", i + 1, doc.name))
                    .with_file(doc.name.clone(), data),
            )
            .await?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// .help
// ---------------------------------------------------------------------------

pub struct HelpHandler {
    pub policy: GatePolicy,
}

#[async_trait]
impl CommandHandler for HelpHandler {
    async fn handle(&self, _command: &BotCommand, ctx: &CommandContext<'_>) -> Result<(), BotError> {
        ctx.say(help_text(&self.policy)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::testing::{message, RecordingChannel};
    use crate::format::MAX_MESSAGE_CHARS;
    use std::sync::Mutex;
    use studybot_core::{CompletionProvider, ImageInput, InboundMessage, OcrProvider, OcrSource, Subject};
    use studybot_locator::MemoryStore;
    use studybot_understanding::{is_placeholder, OcrChain, RetryPolicy};

    struct FakeCompletion {
        answer: String,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeCompletion {
        fn answering(answer: impl Into<String>) -> Arc<Self> {
            Arc::new(Self { answer: answer.into(), prompts: Mutex::default() })
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionProvider for FakeCompletion {
        fn name(&self) -> &str {
            "fake"
        }

        async fn complete(&self, prompt: &str, _image: Option<&ImageInput>) -> Result<String, BotError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.answer.clone())
        }
    }

    struct FakeOcr(Option<&'static str>);

    #[async_trait]
    impl OcrProvider for FakeOcr {
        fn name(&self) -> &str {
            "fake-ocr"
        }

        async fn recognize(&self, _image: &[u8]) -> Result<String, BotError> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| BotError::provider("fake-ocr", "unreadable"))
        }
    }

    fn jpeg() -> Vec<u8> {
        let mut buf = vec![0xFF, 0xD8, 0xFF, 0xE0];
        buf.resize(2048, 0);
        buf
    }

    fn services(
        store: Option<MemoryStore>,
        ocr_text: Option<&'static str>,
        completion: Option<Arc<FakeCompletion>>,
    ) -> Arc<BotServices> {
        let chain = OcrChain::new().with_stage(OcrSource::PrimaryKeyed, Arc::new(FakeOcr(ocr_text)));
        let ocr = Arc::new(OcrResolver::new(chain, RetryPolicy::default()));
        Arc::new(
            BotServices::new(ocr, reqwest::Client::new())
                .with_locator(store.map(|s| DocumentLocator::new(Arc::new(s))))
                .with_tutor(completion.map(|c| Tutor::new(c as Arc<dyn CompletionProvider>)))
                .with_material_pause(Duration::ZERO),
        )
    }

    async fn run(handler: &dyn CommandHandler, command: BotCommand, channel: &RecordingChannel) -> Result<(), BotError> {
        let msg: InboundMessage = message("1", "u", "");
        let ctx = CommandContext { message: &msg, channel };
        handler.handle(&command, &ctx).await
    }

    #[tokio::test]
    async fn chat_answer_is_prefixed() {
        let completion = FakeCompletion::answering("Photosynthese ist ...");
        let handler = ChatHandler::new(services(None, None, Some(completion.clone())));
        let channel = RecordingChannel::default();

        run(&handler, BotCommand::Chat { prompt: "Was ist Photosynthese?".into() }, &channel)
            .await
            .unwrap();
        assert_eq!(
            channel.texts(),
            vec!["⏳ Denke nach...", "🤖 **Gemini Chat:**\n\nPhotosynthese ist ..."]
        );
        assert!(completion.prompts()[0].contains("Was ist Photosynthese?"));
    }

    #[tokio::test]
    async fn missing_ai_key_is_reported() {
        let handler = ChatHandler::new(services(None, None, None));
        let channel = RecordingChannel::default();
        let err = run(&handler, BotCommand::Chat { prompt: "hi".into() }, &channel).await.unwrap_err();
        assert!(matches!(err, BotError::ConfigMissing(ref k) if k == "GEMINI_API_KEY"));
        assert!(channel.texts().is_empty());
    }

    #[tokio::test]
    async fn solution_sends_original_then_solution() {
        let store = MemoryStore::new().with_file("Mathe_Seite_5.jpg", jpeg());
        let completion = FakeCompletion::answering("x = 4");
        let handler = SolutionHandler::new(services(Some(store), Some("Aufgabe 1: Löse 2x = 8"), Some(completion.clone())));
        let channel = RecordingChannel::default();

        run(&handler, BotCommand::Solution(LookupQuery::new(Subject::Mathe, "5")), &channel)
            .await
            .unwrap();

        let replies = channel.replies();
        assert_eq!(replies.len(), 3);
        assert_eq!(replies[1].attachments[0].name, "Mathe_Seite_5.jpg");
        assert_eq!(replies[1].attachments[0].data.len(), 2048);
        assert_eq!(replies[2].text, "🤖 Lösungen für 🔵 **Mathe Seite 5**:\n\nx = 4");
        assert!(completion.prompts()[0].contains("Aufgabe 1: Löse 2x = 8"));
    }

    #[tokio::test]
    async fn long_solution_goes_into_a_file() {
        let store = MemoryStore::new().with_file("religion_ev_seite_3.png", {
            let mut png = vec![0x89, 0x50, 0x4E, 0x47];
            png.resize(4096, 0);
            png
        });
        let completion = FakeCompletion::answering("a".repeat(MAX_MESSAGE_CHARS));
        let handler = SolutionHandler::new(services(Some(store), Some("Psalm 23 lesen und deuten"), Some(completion)));
        let channel = RecordingChannel::default();

        run(&handler, BotCommand::Solution(LookupQuery::new(Subject::ReligionEv, "3")), &channel)
            .await
            .unwrap();

        let last = channel.replies().pop().unwrap();
        assert_eq!(last.attachments[0].name, "loesung_religion_ev_seite_3.txt");
        assert!(last.text.ends_with("*Text ist zu lang, siehe Datei:*"));
    }

    #[tokio::test]
    async fn solution_for_missing_page_is_not_found() {
        let store = MemoryStore::new().with_file("mathe_seite_15.jpg", jpeg());
        let handler = SolutionHandler::new(services(Some(store), Some("text"), Some(FakeCompletion::answering("x"))));
        let channel = RecordingChannel::default();
        let err = run(&handler, BotCommand::Solution(LookupQuery::new(Subject::Mathe, "1")), &channel)
            .await
            .unwrap_err();
        assert!(matches!(err, BotError::NotFound { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn unreadable_page_has_no_solution() {
        let store = MemoryStore::new().with_file("mathe_seite_5.jpg", jpeg());
        let completion = FakeCompletion::answering("x");
        let handler = SolutionHandler::new(services(Some(store), None, Some(completion.clone())));
        let channel = RecordingChannel::default();
        let err = run(&handler, BotCommand::Solution(LookupQuery::new(Subject::Mathe, "5")), &channel)
            .await
            .unwrap_err();
        assert!(matches!(err, BotError::ExhaustedFallback));
        assert!(completion.prompts().is_empty());
    }

    #[tokio::test]
    async fn homework_from_store_is_decorated() {
        let store = MemoryStore::new()
            .with_file("mathe_seite_5.jpg", jpeg())
            .with_file("ha.jpg", jpeg());
        let completion = FakeCompletion::answering("Mathe: S. 82 Nr. 3\nDeutsch: Gedicht lernen");
        let handler = HomeworkHandler::new(services(Some(store), Some("Mathe S. 82 Nr. 3, Deutsch Gedicht"), Some(completion)));
        let channel = RecordingChannel::default();

        run(&handler, BotCommand::Homework, &channel).await.unwrap();
        let last = channel.texts().pop().unwrap();
        assert_eq!(last, "📝 **Hausaufgaben:**\n\n🔵 **Mathe:** S. 82 Nr. 3\n🔴 **Deutsch:** Gedicht lernen");
    }

    #[tokio::test(start_paused = true)]
    async fn unreadable_homework_returns_placeholder_without_ai() {
        let store = MemoryStore::new().with_file("ha.jpg", jpeg());
        let completion = FakeCompletion::answering("x");
        let handler = HomeworkHandler::new(services(Some(store), None, Some(completion.clone())));
        let channel = RecordingChannel::default();

        run(&handler, BotCommand::Homework, &channel).await.unwrap();
        assert!(is_placeholder(&channel.texts().pop().unwrap()));
        assert!(completion.prompts().is_empty());
    }

    #[tokio::test]
    async fn homework_without_image_asks_for_upload() {
        let handler = HomeworkHandler::new(services(Some(MemoryStore::new()), Some("t"), Some(FakeCompletion::answering("x"))));
        let channel = RecordingChannel::default();
        let err = run(&handler, BotCommand::Homework, &channel).await.unwrap_err();
        assert!(err.user_message().contains("ha.jpg"));
    }

    #[tokio::test]
    async fn homework_help_works_without_page() {
        let completion = FakeCompletion::answering("Tipp: Schau dir Vers 1 an.");
        let handler = HomeworkHelpHandler::new(services(None, None, Some(completion.clone())));
        let channel = RecordingChannel::default();
        let command = BotCommand::HomeworkHelp {
            query: LookupQuery::new(Subject::ReligionKt, "12"),
            question: "Was bedeutet Gnade?".into(),
        };

        run(&handler, command, &channel).await.unwrap();
        let prompt = &completion.prompts()[0];
        assert!(prompt.contains("Was bedeutet Gnade?"));
        assert!(prompt.contains("nicht verfügbar"));
        assert!(channel.texts()[1].ends_with("Tipp: Schau dir Vers 1 an."));
    }

    #[tokio::test]
    async fn homework_help_uses_page_text() {
        let store = MemoryStore::new().with_file("deutsch_seite_1.jpg", jpeg());
        let completion = FakeCompletion::answering("ok");
        let handler = HomeworkHelpHandler::new(services(Some(store), Some("Der Erlkönig von Goethe"), Some(completion.clone())));
        let command = BotCommand::HomeworkHelp {
            query: LookupQuery::new(Subject::Deutsch, "1"),
            question: "Worum geht es?".into(),
        };

        run(&handler, command, &RecordingChannel::default()).await.unwrap();
        assert!(completion.prompts()[0].contains("Der Erlkönig von Goethe"));
    }

    #[tokio::test]
    async fn material_sends_every_sheet() {
        let store = MemoryStore::new()
            .with_file("MATERIAL_MATHE_SEITE_5_(1).jpg", jpeg())
            .with_file("MATERIAL_MATHE_SEITE_50.jpg", jpeg())
            .with_file("material_mathe_seite_5_(2).pdf", b"%PDF".to_vec());
        let handler = MaterialHandler::new(services(Some(store), None, None));
        let channel = RecordingChannel::default();

        run(&handler, BotCommand::Material(LookupQuery::new(Subject::Mathe, "5")), &channel)
            .await
            .unwrap();

        let files: Vec<_> = channel
            .replies()
            .into_iter()
            .filter(|r| !r.attachments.is_empty())
            .map(|r| r.text)
            .collect();
        assert_eq!(
            files,
            vec![
                "📄 **Material 1/2:** MATERIAL_MATHE_SEITE_5_(1).jpg",
                "📄 **Material 2/2:** material_mathe_seite_5_(2).pdf",
            ]
        );
    }

    #[tokio::test]
    async fn material_needs_a_store() {
        let handler = MaterialHandler::new(services(None, None, None));
        let err = run(&handler, BotCommand::Material(LookupQuery::new(Subject::Mathe, "5")), &RecordingChannel::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BotError::ConfigMissing(ref k) if k == "MEGA_EMAIL/MEGA_PASSWORD"));
    }

    #[tokio::test]
    async fn help_lists_commands() {
        let handler = HelpHandler { policy: GatePolicy::default() };
        let channel = RecordingChannel::default();
        run(&handler, BotCommand::Help, &channel).await.unwrap();
        assert!(channel.texts()[0].contains("`.material [fach] seite [nummer]`"));
    }
}
