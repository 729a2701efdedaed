//! OCR resolution: an ordered provider chain wrapped in a linear-backoff retry
//! loop. Never fails outward; exhaustion yields the tagged placeholder.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use studybot_core::{BotError, CompletionProvider, OcrProvider, OcrResult, OcrSource};

use crate::ocr::{OcrSpaceOptions, OcrSpaceProvider, UnconfiguredProvider, VisionOcrProvider};
use crate::placeholder::placeholder_text;

/// Key values shipped in sample env files. Treated as "no key".
const PLACEHOLDER_KEYS: &[&str] = &["helloworld", "your_ocr_api_key_here"];

/// One entry of the chain.
pub struct OcrStage {
    pub source: OcrSource,
    pub provider: Arc<dyn OcrProvider>,
}

impl OcrStage {
    pub fn new(source: OcrSource, provider: Arc<dyn OcrProvider>) -> Self {
        Self { source, provider }
    }
}

/// Ordered providers; the first success wins.
#[derive(Default)]
pub struct OcrChain {
    stages: Vec<OcrStage>,
}

impl OcrChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stage(mut self, source: OcrSource, provider: Arc<dyn OcrProvider>) -> Self {
        self.stages.push(OcrStage::new(source, provider));
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage labels in order, for startup logs and `status`.
    pub fn describe(&self) -> Vec<String> {
        self.stages
            .iter()
            .map(|s| format!("{} ({})", s.provider.name(), s.source))
            .collect()
    }

    /// Try each stage once. Fails with `ExhaustedFallback` when all fail.
    pub async fn run(&self, image: &[u8]) -> Result<OcrResult, BotError> {
        for stage in &self.stages {
            info!(stage = %stage.source, provider = stage.provider.name(), "Trying OCR stage");
            match stage.provider.recognize(image).await {
                Ok(text) => {
                    return Ok(OcrResult { text, source: stage.source });
                }
                Err(e) => {
                    warn!(stage = %stage.source, provider = stage.provider.name(), error = %e, "OCR stage failed");
                }
            }
        }
        Err(BotError::ExhaustedFallback)
    }
}

/// Retry loop tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Wait before retry `n` is `n × base_delay`.
    pub base_delay: Duration,
    /// Results whose trimmed text is shorter than this count as failures.
    pub min_text_len: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, base_delay: Duration::from_secs(2), min_text_len: 10 }
    }
}

impl RetryPolicy {
    /// Delay after failed attempt `attempt` (1-indexed).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    fn is_usable(&self, text: &str) -> bool {
        text.trim().chars().count() >= self.min_text_len
    }
}

/// OCR credentials as seen by the resolver.
#[derive(Debug, Clone, Default)]
pub struct OcrSettings {
    pub primary_key: Option<String>,
    pub free_tier_keys: Vec<String>,
    /// OCR.space language code; `ger` when unset.
    pub language: Option<String>,
}

impl OcrSettings {
    fn options(&self, base: OcrSpaceOptions) -> OcrSpaceOptions {
        match &self.language {
            Some(language) => base.with_language(language.as_str()),
            None => base,
        }
    }

    /// The primary key, unless it is empty or a sample value.
    pub fn effective_primary_key(&self) -> Option<&str> {
        self.primary_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && !PLACEHOLDER_KEYS.contains(k))
    }
}

pub struct OcrResolver {
    chain: OcrChain,
    policy: RetryPolicy,
}

impl OcrResolver {
    pub fn new(chain: OcrChain, policy: RetryPolicy) -> Self {
        Self { chain, policy }
    }

    /// Assemble the production chain: keyed primary, free-tier keys, the
    /// alternative slot, then the vision model when one is available.
    pub fn from_settings(
        client: reqwest::Client,
        settings: &OcrSettings,
        vision: Option<Arc<dyn CompletionProvider>>,
    ) -> Self {
        let mut chain = OcrChain::new();

        if let Some(key) = settings.effective_primary_key() {
            chain = chain.with_stage(
                OcrSource::PrimaryKeyed,
                Arc::new(OcrSpaceProvider::new(client.clone(), "OCR.space", key, settings.options(OcrSpaceOptions::primary()))),
            );
        } else {
            info!("No OCR_API_KEY set, skipping keyed OCR.space");
        }

        for (i, key) in settings.free_tier_keys.iter().enumerate() {
            let n = i + 1;
            chain = chain.with_stage(
                OcrSource::FreeTierTrial(n),
                Arc::new(OcrSpaceProvider::new(
                    client.clone(),
                    format!("OCR.space free #{n}"),
                    key.clone(),
                    settings.options(OcrSpaceOptions::free_tier()),
                )),
            );
        }

        chain = chain.with_stage(
            OcrSource::Alternative,
            Arc::new(UnconfiguredProvider::new("alternative OCR provider")),
        );

        if let Some(completion) = vision {
            chain = chain.with_stage(OcrSource::VisionFallback, Arc::new(VisionOcrProvider::new(completion)));
        }

        Self::new(chain, RetryPolicy::default())
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn chain(&self) -> &OcrChain {
        &self.chain
    }

    /// One pass over the chain; the placeholder on exhaustion.
    pub async fn resolve_text(&self, image: &[u8]) -> OcrResult {
        match self.chain.run(image).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "Falling back to OCR placeholder");
                placeholder()
            }
        }
    }

    /// Run the chain up to `max_attempts` times with linear backoff. Short or
    /// failed results are retried; the final failure yields the placeholder.
    pub async fn resolve_with_retry(&self, image: &[u8], max_attempts: u32) -> OcrResult {
        let max_attempts = max_attempts.max(1);
        for attempt in 1..=max_attempts {
            info!(attempt, max_attempts, "OCR attempt");
            match self.chain.run(image).await {
                Ok(result) if self.policy.is_usable(&result.text) => return result,
                Ok(result) => {
                    warn!(attempt, chars = result.text.trim().chars().count(), source = %result.source, "OCR result too short");
                }
                Err(e) => {
                    warn!(attempt, error = %e, "OCR attempt failed");
                }
            }
            if attempt < max_attempts {
                tokio::time::sleep(self.policy.delay_for(attempt)).await;
            }
        }
        warn!(max_attempts, "All OCR attempts failed, using placeholder");
        placeholder()
    }
}

fn placeholder() -> OcrResult {
    OcrResult { text: placeholder_text(), source: OcrSource::Placeholder }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placeholder::is_placeholder;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Returns scripted results in order, repeating the last one.
    struct Scripted {
        name: &'static str,
        script: Mutex<VecDeque<Result<&'static str, ()>>>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(name: &'static str, script: Vec<Result<&'static str, ()>>) -> Arc<Self> {
            Arc::new(Self { name, script: Mutex::new(script.into()), calls: AtomicUsize::new(0) })
        }

        fn failing(name: &'static str) -> Arc<Self> {
            Self::new(name, vec![Err(())])
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl OcrProvider for Scripted {
        fn name(&self) -> &str {
            self.name
        }

        async fn recognize(&self, _image: &[u8]) -> Result<String, BotError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock().unwrap();
            let next = if script.len() > 1 { script.pop_front() } else { script.front().cloned() };
            match next.unwrap_or(Err(())) {
                Ok(text) => Ok(text.to_string()),
                Err(()) => Err(BotError::provider(self.name, "scripted failure")),
            }
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy { base_delay: Duration::from_millis(1), ..RetryPolicy::default() }
    }

    #[tokio::test]
    async fn chain_returns_first_success_and_skips_the_rest() {
        let primary = Scripted::failing("primary");
        let free = Scripted::new("free", vec![Ok("Deutsch: Seite 45")]);
        let vision = Scripted::new("vision", vec![Ok("unused")]);
        let chain = OcrChain::new()
            .with_stage(OcrSource::PrimaryKeyed, primary.clone())
            .with_stage(OcrSource::FreeTierTrial(1), free.clone())
            .with_stage(OcrSource::VisionFallback, vision.clone());

        let result = chain.run(b"img").await.unwrap();
        assert_eq!(result.source, OcrSource::FreeTierTrial(1));
        assert_eq!(result.text, "Deutsch: Seite 45");
        assert_eq!(primary.calls(), 1);
        assert_eq!(vision.calls(), 0);
    }

    #[tokio::test]
    async fn empty_chain_is_exhausted() {
        let err = OcrChain::new().run(b"img").await.unwrap_err();
        assert!(matches!(err, BotError::ExhaustedFallback));
    }

    #[tokio::test]
    async fn resolve_text_falls_back_to_placeholder() {
        let chain = OcrChain::new()
            .with_stage(OcrSource::PrimaryKeyed, Scripted::failing("primary"))
            .with_stage(OcrSource::Alternative, Arc::new(UnconfiguredProvider::new("alt")));
        let resolver = OcrResolver::new(chain, fast_policy());

        let result = resolver.resolve_text(b"img").await;
        assert!(result.is_placeholder());
        assert!(is_placeholder(&result.text));
    }

    #[tokio::test]
    async fn retry_never_raises_when_every_provider_fails() {
        let primary = Scripted::failing("primary");
        let free_a = Scripted::failing("free a");
        let free_b = Scripted::failing("free b");
        let chain = OcrChain::new()
            .with_stage(OcrSource::PrimaryKeyed, primary.clone())
            .with_stage(OcrSource::FreeTierTrial(1), free_a.clone())
            .with_stage(OcrSource::FreeTierTrial(2), free_b.clone());
        let resolver = OcrResolver::new(chain, fast_policy());

        let result = resolver.resolve_with_retry(b"img", 3).await;
        assert_eq!(result.source, OcrSource::Placeholder);
        assert!(is_placeholder(&result.text));
        assert_eq!(primary.calls(), 3);
        assert_eq!(free_b.calls(), 3);
    }

    #[tokio::test]
    async fn short_result_is_retried_before_success() {
        let primary = Scripted::new("primary", vec![Ok("abc"), Ok("Mathe: Buch Seite 82, Nr. 5")]);
        let chain = OcrChain::new().with_stage(OcrSource::PrimaryKeyed, primary.clone());
        let resolver = OcrResolver::new(chain, fast_policy());

        let result = resolver.resolve_with_retry(b"img", 3).await;
        assert_eq!(result.source, OcrSource::PrimaryKeyed);
        assert_eq!(result.text, "Mathe: Buch Seite 82, Nr. 5");
        assert_eq!(primary.calls(), 2);
    }

    #[tokio::test]
    async fn whitespace_padding_does_not_count_toward_length() {
        let primary = Scripted::new("primary", vec![Ok("    short    \n\n\n")]);
        let chain = OcrChain::new().with_stage(OcrSource::PrimaryKeyed, primary.clone());
        let resolver = OcrResolver::new(chain, fast_policy());

        let result = resolver.resolve_with_retry(b"img", 2).await;
        assert!(result.is_placeholder());
        assert_eq!(primary.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_is_linear_in_attempt_number() {
        let chain = OcrChain::new().with_stage(OcrSource::PrimaryKeyed, Scripted::failing("primary"));
        let resolver = OcrResolver::new(chain, RetryPolicy::default());

        let started = tokio::time::Instant::now();
        let result = resolver.resolve_with_retry(b"img", 3).await;
        assert!(result.is_placeholder());
        // 2 s after attempt 1, 4 s after attempt 2, none after the last.
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(6), "{elapsed:?}");
        assert!(elapsed < Duration::from_secs(7), "{elapsed:?}");
    }

    #[test]
    fn sample_keys_are_not_treated_as_configured() {
        for key in ["helloworld", "your_ocr_api_key_here", "  ", ""] {
            let settings = OcrSettings { primary_key: Some(key.into()), free_tier_keys: vec![], language: None };
            assert_eq!(settings.effective_primary_key(), None, "{key:?}");
        }
        let settings = OcrSettings { primary_key: Some(" K123 ".into()), free_tier_keys: vec![], language: None };
        assert_eq!(settings.effective_primary_key(), Some("K123"));
    }

    #[test]
    fn production_chain_order() {
        let settings = OcrSettings {
            primary_key: Some("K123".into()),
            free_tier_keys: vec!["helloworld".into(), "K87899142388957".into()],
            language: None,
        };
        let resolver = OcrResolver::from_settings(reqwest::Client::new(), &settings, None);
        assert_eq!(
            resolver.chain().describe(),
            vec![
                "OCR.space (primary)",
                "OCR.space free #1 (free-tier #1)",
                "OCR.space free #2 (free-tier #2)",
                "alternative OCR provider (alternative)",
            ]
        );
    }

    #[test]
    fn delay_grows_with_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
    }
}
