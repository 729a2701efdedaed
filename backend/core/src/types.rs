use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::BotError;

// ---------------------------------------------------------------------------
// Subject
// ---------------------------------------------------------------------------

/// A school subject used as a document lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Deutsch,
    Mathe,
    English,
    Franzoesisch,
    Latein,
    Geschichte,
    Physik,
    Chemie,
    ReligionEv,
    ReligionKt,
    Ethik,
}

/// Accepted spellings and the subject each one maps to.
const SYNONYMS: &[(&str, Subject)] = &[
    ("deutsch", Subject::Deutsch),
    ("mathe", Subject::Mathe),
    ("english", Subject::English),
    ("französisch", Subject::Franzoesisch),
    ("franzoesisch", Subject::Franzoesisch),
    ("fr", Subject::Franzoesisch),
    ("latein", Subject::Latein),
    ("geschichte", Subject::Geschichte),
    ("physik", Subject::Physik),
    ("chemie", Subject::Chemie),
    ("religion ev", Subject::ReligionEv),
    ("religion kt", Subject::ReligionKt),
    ("ethik", Subject::Ethik),
];

impl Subject {
    pub const ALL: [Subject; 11] = [
        Subject::Deutsch,
        Subject::Mathe,
        Subject::English,
        Subject::Franzoesisch,
        Subject::Latein,
        Subject::Geschichte,
        Subject::Physik,
        Subject::Chemie,
        Subject::ReligionEv,
        Subject::ReligionKt,
        Subject::Ethik,
    ];

    /// Normalize user input to a subject. Case-insensitive, inner whitespace
    /// collapsed, so `Religion  EV` works too.
    pub fn parse(input: &str) -> Result<Self, BotError> {
        let normalized = input
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        SYNONYMS
            .iter()
            .find(|(spelling, _)| *spelling == normalized)
            .map(|(_, subject)| *subject)
            .ok_or_else(|| BotError::UnsupportedSubject(input.trim().to_string()))
    }

    /// Every spelling `parse` accepts.
    pub fn supported_inputs() -> Vec<&'static str> {
        SYNONYMS.iter().map(|(spelling, _)| *spelling).collect()
    }

    /// Every input spelling that maps to this subject, `fr` included.
    pub fn spellings(&self) -> impl Iterator<Item = &'static str> + '_ {
        SYNONYMS
            .iter()
            .filter(move |(_, subject)| subject == self)
            .map(|(spelling, _)| *spelling)
    }

    /// Canonical lowercase token.
    pub fn token(&self) -> &'static str {
        match self {
            Subject::Deutsch => "deutsch",
            Subject::Mathe => "mathe",
            Subject::English => "english",
            Subject::Franzoesisch => "französisch",
            Subject::Latein => "latein",
            Subject::Geschichte => "geschichte",
            Subject::Physik => "physik",
            Subject::Chemie => "chemie",
            Subject::ReligionEv => "religion ev",
            Subject::ReligionKt => "religion kt",
            Subject::Ethik => "ethik",
        }
    }

    /// Lowercase stems a stored filename may use for this subject.
    pub fn file_stems(&self) -> &'static [&'static str] {
        match self {
            Subject::Deutsch => &["deutsch"],
            Subject::Mathe => &["mathe"],
            Subject::English => &["english"],
            Subject::Franzoesisch => &["französisch", "franzoesisch"],
            Subject::Latein => &["latein"],
            Subject::Geschichte => &["geschichte"],
            Subject::Physik => &["physik"],
            Subject::Chemie => &["chemie"],
            Subject::ReligionEv => &["religion_ev", "religion ev"],
            Subject::ReligionKt => &["religion_kt", "religion kt"],
            Subject::Ethik => &["ethik"],
        }
    }

    /// Uppercase stem used in `MATERIAL_<SUBJECT>_SEITE_<n>` names.
    pub fn material_stem(&self) -> String {
        self.file_stems()[0].to_uppercase()
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Subject::Mathe => "🔵",
            Subject::Deutsch => "🔴",
            Subject::English => "🟡",
            Subject::Franzoesisch | Subject::Latein => "🟠",
            Subject::Geschichte => "⚪",
            Subject::Physik => "🟣",
            Subject::Chemie => "🟢",
            Subject::ReligionEv | Subject::ReligionKt | Subject::Ethik => "⚫",
        }
    }

    /// Capitalized name as used in replies and prompts.
    pub fn display_name(&self) -> &'static str {
        match self {
            Subject::Deutsch => "Deutsch",
            Subject::Mathe => "Mathe",
            Subject::English => "English",
            Subject::Franzoesisch => "Französisch",
            Subject::Latein => "Latein",
            Subject::Geschichte => "Geschichte",
            Subject::Physik => "Physik",
            Subject::Chemie => "Chemie",
            Subject::ReligionEv => "Religion ev",
            Subject::ReligionKt => "Religion kt",
            Subject::Ethik => "Ethik",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

// ---------------------------------------------------------------------------
// Lookup query
// ---------------------------------------------------------------------------

/// A `(subject, page)` pair as typed by the user. `page` is kept verbatim
/// because file matching is string based: `05` and `5` are different pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupQuery {
    pub subject: Subject,
    pub page: String,
}

impl LookupQuery {
    pub fn new(subject: Subject, page: impl Into<String>) -> Self {
        Self {
            subject,
            page: page.into(),
        }
    }

    /// Parse raw user input; the page must be a non-empty ASCII digit string.
    pub fn parse(subject: &str, page: &str) -> Result<Self, BotError> {
        let subject = Subject::parse(subject)?;
        let page = page.trim();
        if page.is_empty() || !page.bytes().all(|b| b.is_ascii_digit()) {
            return Err(BotError::Usage(format!("❌ \"{page}\" ist keine gültige Seitennummer.")));
        }
        Ok(Self::new(subject, page))
    }
}

impl fmt::Display for LookupQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} seite {}", self.subject, self.page)
    }
}

// ---------------------------------------------------------------------------
// Stored document
// ---------------------------------------------------------------------------

/// A file in the remote document store. `handle` is opaque to everything but
/// the store that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub name: String,
    pub size_bytes: u64,
    pub handle: String,
}

// ---------------------------------------------------------------------------
// OCR result
// ---------------------------------------------------------------------------

/// Which stage of the OCR chain produced a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "trial", rename_all = "snake_case")]
pub enum OcrSource {
    PrimaryKeyed,
    /// Free-tier credential, 1-based position in the configured list.
    FreeTierTrial(usize),
    Alternative,
    VisionFallback,
    Placeholder,
}

impl fmt::Display for OcrSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OcrSource::PrimaryKeyed => f.write_str("primary"),
            OcrSource::FreeTierTrial(n) => write!(f, "free-tier #{n}"),
            OcrSource::Alternative => f.write_str("alternative"),
            OcrSource::VisionFallback => f.write_str("vision"),
            OcrSource::Placeholder => f.write_str("placeholder"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrResult {
    pub text: String,
    pub source: OcrSource,
}

impl OcrResult {
    pub fn is_placeholder(&self) -> bool {
        self.source == OcrSource::Placeholder
    }
}
