//! Filename matching for book pages, material sheets and homework photos.
//!
//! Stored names follow a loose convention (`mathe_seite_5.jpg`,
//! `Mathe_S5.png`, `MATERIAL_MATHE_SEITE_5_(1).jpg`), so everything here is
//! a best-effort heuristic, not an index. All functions are pure.

use studybot_core::{LookupQuery, Subject};
use studybot_media::{is_image_name, strip_known_extension};

/// Separators skipped when looking for the word before a page number.
const SEPARATORS: &[char] = &['_', '-', '.', ' '];

/// Lowercased name without its extension, `None` for unsupported extensions.
pub fn document_stem(name: &str) -> Option<String> {
    strip_known_extension(name).map(str::to_lowercase)
}

/// Page lookup against one `(subject, page)` query.
#[derive(Debug, Clone)]
pub struct PagePattern {
    stems: Vec<String>,
    page: String,
}

impl PagePattern {
    /// Stems are the subject's file stems plus every spelling users may type,
    /// so `fr_seite_4.jpg` is found for any French input.
    pub fn new(query: &LookupQuery) -> Self {
        let mut stems: Vec<String> = query.subject.file_stems().iter().map(|s| s.to_string()).collect();
        for spelling in query.subject.spellings() {
            if !stems.iter().any(|s| s == spelling) {
                stems.push(spelling.to_string());
            }
        }
        Self { stems, page: query.page.clone() }
    }

    pub fn stems(&self) -> &[String] {
        &self.stems
    }

    fn exact_forms(&self, stem: &str) -> [String; 5] {
        let p = &self.page;
        [
            format!("{stem}_seite_{p}"),
            format!("{stem}_{p}"),
            format!("{stem}seite{p}"),
            format!("{stem}_s{p}"),
            format!("{stem}_page_{p}"),
        ]
    }

    /// Name (minus extension) equals one of the canonical forms.
    pub fn is_exact(&self, name: &str) -> bool {
        let Some(doc) = document_stem(name) else {
            return false;
        };
        self.stems
            .iter()
            .any(|s| self.exact_forms(s).iter().any(|form| *form == doc))
    }

    /// Name mentions the subject and carries the page as an isolated number
    /// introduced by `seite`, `page`, a standalone `s`, or the subject itself.
    pub fn is_fuzzy(&self, name: &str) -> bool {
        let Some(doc) = document_stem(name) else {
            return false;
        };
        if !self.stems.iter().any(|s| doc.contains(s.as_str())) {
            return false;
        }
        doc.match_indices(self.page.as_str()).any(|(idx, _)| {
            let before = &doc[..idx];
            let after = &doc[idx + self.page.len()..];
            let isolated = !before.ends_with(|c: char| c.is_ascii_digit())
                && !after.starts_with(|c: char| c.is_ascii_digit());
            isolated && self.introduces_page(before)
        })
    }

    fn introduces_page(&self, before: &str) -> bool {
        if self.stems.iter().any(|s| before.ends_with(&format!("{s}_"))) {
            return true;
        }
        let word = before.trim_end_matches(SEPARATORS);
        if word.ends_with("seite") || word.ends_with("page") {
            return true;
        }
        match word.strip_suffix('s') {
            Some(rest) => !rest.ends_with(|c: char| c.is_alphanumeric()),
            None => false,
        }
    }

    /// Any stored name that mentions the subject, for "did you mean" logs.
    pub fn is_near_miss(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.stems.iter().any(|s| lower.contains(s.as_str()))
    }

    /// Filenames a user should upload, for the not-found reply.
    pub fn expected(&self) -> Vec<String> {
        let s = &self.stems[0];
        let p = &self.page;
        vec![format!("{s}_seite_{p}.jpg/.png"), format!("{s}_{p}.jpg/.png")]
    }
}

/// `MATERIAL_<SUBJECT>_SEITE_<page>` prefix followed by a non-digit, with a
/// supported extension. Case-insensitive.
pub fn is_material(name: &str, query: &LookupQuery) -> bool {
    if strip_known_extension(name).is_none() {
        return false;
    }
    let upper = name.to_uppercase();
    query.subject.file_stems().iter().any(|stem| {
        let prefix = format!("MATERIAL_{}_SEITE_{}", stem.to_uppercase(), query.page);
        upper
            .strip_prefix(&prefix)
            .is_some_and(|rest| !rest.starts_with(|c: char| c.is_ascii_digit()))
    })
}

pub fn material_expected(subject: Subject, page: &str) -> Vec<String> {
    let stem = subject.material_stem();
    vec![
        format!("MATERIAL_{stem}_SEITE_{page}_(1).jpg"),
        format!("MATERIAL_{stem}_SEITE_{page}_(2).jpg"),
    ]
}

/// Photo whose name contains `ha` as a standalone word (`ha.jpg`,
/// `HA_montag.png`), but not inside another word (`mathe.jpg`).
pub fn is_homework_image(name: &str) -> bool {
    if !is_image_name(name) {
        return false;
    }
    document_stem(name).is_some_and(|stem| stem.split(|c: char| !c.is_alphanumeric()).any(|w| w == "ha"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(subject: Subject, page: &str) -> PagePattern {
        PagePattern::new(&LookupQuery::new(subject, page))
    }

    #[test]
    fn exact_matches() {
        let cases: &[(&str, Subject, &str, bool)] = &[
            ("mathe_seite_5.jpg", Subject::Mathe, "5", true),
            ("Mathe_Seite_5.PNG", Subject::Mathe, "5", true),
            ("mathe_5.jpeg", Subject::Mathe, "5", true),
            ("matheseite5.webp", Subject::Mathe, "5", true),
            ("mathe_s5.pdf", Subject::Mathe, "5", true),
            ("mathe_page_5.jpg", Subject::Mathe, "5", true),
            ("mathe_seite_15.jpg", Subject::Mathe, "1", false),
            ("mathe_seite_5.docx", Subject::Mathe, "5", false),
            ("mathe_seite_5", Subject::Mathe, "5", false),
            ("deutsch_seite_5.jpg", Subject::Mathe, "5", false),
            ("mathe_seite_05.jpg", Subject::Mathe, "5", false),
            ("franzoesisch_seite_12.jpg", Subject::Franzoesisch, "12", true),
            ("französisch_12.png", Subject::Franzoesisch, "12", true),
            ("religion_ev_seite_3.jpg", Subject::ReligionEv, "3", true),
            ("Religion Ev_Seite_3.jpg", Subject::ReligionEv, "3", true),
        ];
        for (name, subject, page, expected) in cases {
            assert_eq!(pattern(*subject, page).is_exact(name), *expected, "{name} for {subject} {page}");
        }
    }

    #[test]
    fn fuzzy_matches() {
        let cases: &[(&str, Subject, &str, bool)] = &[
            ("mathe_aufgaben_seite_7_final.jpg", Subject::Mathe, "7", true),
            ("mathe17.jpg", Subject::Mathe, "1", false),
            ("mathe17.jpg", Subject::Mathe, "7", false),
            ("Buch_Mathe_Seite-7.png", Subject::Mathe, "7", true),
            ("mathe_s.7_kopie.jpg", Subject::Mathe, "7", true),
            ("mathe_7_neu.jpg", Subject::Mathe, "7", true),
            ("mathe_page 7 scan.jpg", Subject::Mathe, "7", true),
            ("mathe_aufgabe_7.jpg", Subject::Mathe, "7", false),
            ("mathe_seite_17.jpg", Subject::Mathe, "7", false),
            ("mathe_seite_70.jpg", Subject::Mathe, "7", false),
            ("mathe_aufgabes_7.jpg", Subject::Mathe, "7", false),
            ("physik_seite_7.jpg", Subject::Mathe, "7", false),
            ("mathe_seite_7.txt", Subject::Mathe, "7", false),
            ("chemie_klasse8_seite_40.jpg", Subject::Chemie, "40", true),
            ("chemie_klasse8_seite_40.jpg", Subject::Chemie, "8", false),
        ];
        for (name, subject, page, expected) in cases {
            assert_eq!(pattern(*subject, page).is_fuzzy(name), *expected, "{name} for {subject} {page}");
        }
    }

    #[test]
    fn typed_spellings_extend_stems() {
        let p = pattern(Subject::Franzoesisch, "4");
        assert!(p.is_exact("fr_seite_4.jpg"));
        assert_eq!(p.stems(), ["französisch", "franzoesisch", "fr"]);
    }

    #[test]
    fn spelling_equal_to_a_stem_is_not_duplicated() {
        assert_eq!(pattern(Subject::Mathe, "4").stems(), ["mathe"]);
        assert_eq!(pattern(Subject::ReligionEv, "4").stems(), ["religion_ev", "religion ev"]);
    }

    #[test]
    fn near_misses_mention_the_subject() {
        let p = pattern(Subject::Mathe, "5");
        assert!(p.is_near_miss("Mathe_Seite_50.jpg"));
        assert!(p.is_near_miss("mathe_notizen.txt"));
        assert!(!p.is_near_miss("deutsch_seite_5.jpg"));
    }

    #[test]
    fn expected_patterns_for_reply() {
        assert_eq!(
            pattern(Subject::Mathe, "5").expected(),
            vec!["mathe_seite_5.jpg/.png", "mathe_5.jpg/.png"]
        );
    }

    #[test]
    fn material_matches() {
        let q = LookupQuery::new(Subject::Mathe, "5");
        let cases: &[(&str, bool)] = &[
            ("MATERIAL_MATHE_SEITE_5_(1).jpg", true),
            ("material_mathe_seite_5_(2).PNG", true),
            ("MATERIAL_MATHE_SEITE_5.pdf", true),
            ("MATERIAL_MATHE_SEITE_50_(1).jpg", false),
            ("MATERIAL_MATHE_SEITE_5_(1).txt", false),
            ("MATHE_SEITE_5.jpg", false),
            ("MATERIAL_DEUTSCH_SEITE_5_(1).jpg", false),
        ];
        for (name, expected) in cases {
            assert_eq!(is_material(name, &q), *expected, "{name}");
        }
    }

    #[test]
    fn material_for_multi_word_subject() {
        let q = LookupQuery::new(Subject::ReligionKt, "2");
        assert!(is_material("MATERIAL_RELIGION_KT_SEITE_2_(1).jpg", &q));
        assert_eq!(
            material_expected(Subject::ReligionKt, "2")[0],
            "MATERIAL_RELIGION_KT_SEITE_2_(1).jpg"
        );
    }

    #[test]
    fn homework_images() {
        let cases: &[(&str, bool)] = &[
            ("ha.jpg", true),
            ("HA_montag.png", true),
            ("woche 3 ha.jpeg", true),
            ("ha.pdf", false),
            ("mathe_seite_5.jpg", false),
            ("hausaufgaben.jpg", false),
            ("chat.png", false),
        ];
        for (name, expected) in cases {
            assert_eq!(is_homework_image(name), *expected, "{name}");
        }
    }
}
