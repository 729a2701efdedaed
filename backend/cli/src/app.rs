//! Wiring: turn a [`BotConfig`] into the services the commands run on.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use studybot_commands::{BotServices, GatePolicy};
use studybot_config::{BotConfig, GateConfig};
use studybot_core::{CompletionProvider, DocumentStore};
use studybot_locator::{DirectoryStore, DocumentLocator, MegaStore};
use studybot_understanding::{GeminiClient, OcrResolver, OcrSettings, Tutor};

pub fn gate_policy(gate: &GateConfig) -> GatePolicy {
    GatePolicy {
        cooldown: Duration::from_millis(gate.cooldown_ms),
        max_active: gate.max_active_commands,
        ..GatePolicy::default()
    }
}

pub fn ocr_settings(config: &BotConfig) -> OcrSettings {
    OcrSettings {
        primary_key: config.ocr.api_key.clone(),
        free_tier_keys: config.ocr.free_keys.clone(),
        language: Some(config.ocr.language.clone()),
    }
}

/// The Gemini client, when a key is configured.
pub fn completion(config: &BotConfig, http: &reqwest::Client) -> Option<Arc<dyn CompletionProvider>> {
    let key = config.gemini.api_key.as_ref()?;
    let client = GeminiClient::new(http.clone(), key).with_model(config.gemini.model.as_str());
    Some(Arc::new(client))
}

/// Where book pages come from. A MEGA login wins over a local directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Mega { email: String, password: String },
    Directory(PathBuf),
}

impl StorageBackend {
    pub fn from_config(config: &BotConfig) -> Option<Self> {
        if let Some((email, password)) = config.storage.mega_credentials() {
            return Some(Self::Mega { email: email.to_string(), password: password.to_string() });
        }
        config.storage.dir.clone().map(Self::Directory)
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Mega { email, .. } => format!("MEGA ({email})"),
            Self::Directory(dir) => format!("directory {}", dir.display()),
        }
    }

    pub fn locator(&self, http: &reqwest::Client) -> DocumentLocator {
        let store: Arc<dyn DocumentStore> = match self {
            Self::Mega { email, password } => Arc::new(MegaStore::new(http.clone(), email, password)),
            Self::Directory(dir) => Arc::new(DirectoryStore::new(dir)),
        };
        DocumentLocator::new(store)
    }
}

pub fn locator(config: &BotConfig, http: &reqwest::Client) -> Option<DocumentLocator> {
    StorageBackend::from_config(config).map(|backend| backend.locator(http))
}

/// OCR chain with the vision fallback when Gemini is available.
pub fn ocr_resolver(config: &BotConfig, http: &reqwest::Client) -> OcrResolver {
    OcrResolver::from_settings(http.clone(), &ocr_settings(config), completion(config, http))
}

pub fn build_services(config: &BotConfig, http: reqwest::Client) -> BotServices {
    let ocr = Arc::new(ocr_resolver(config, &http));
    let tutor = completion(config, &http).map(Tutor::new);
    BotServices::new(ocr, http.clone())
        .with_locator(locator(config, &http))
        .with_tutor(tutor)
}
