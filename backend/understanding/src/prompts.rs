//! German prompt templates.

use studybot_core::Subject;

pub fn chat(question: &str) -> String {
    format!(
        "Du bist ein hilfsbereiter und geduldiger Nachhilfelehrer. Beantworte die folgende Frage kurz, direkt und verständlich:

{question}

Regeln:
- Sei freundlich und ermutigend
- Erkläre einfach und verständlich
- Verwende gerne Emojis
- Halte dich kurz aber vollständig
- Gib konkrete Beispiele wenn nötig

Antworte direkt auf die Frage ohne komplizierte Formatierung. Sei wie ein echter Nachhilfelehrer: freundlich, geduldig und klar."
    )
}

pub fn homework_analysis(ocr_text: &str) -> String {
    let subjects = Subject::ALL
        .iter()
        .map(|s| format!("- {}", s.display_name()))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Du bist ein Hausaufgaben-Assistent. Analysiere den folgenden Text aus einem Hausaufgabenbild und extrahiere die Hausaufgaben nach Fächern strukturiert.

Erkannter Text:
{ocr_text}

Aufgabe:
1. Identifiziere alle Hausaufgaben in dem Text
2. Strukturiere sie nach Fächern
3. Gib eine klare, übersichtliche Übersicht zurück

WICHTIG: Verwende EXAKT diese Fach-Namen (nicht übersetzen!):
{subjects}

Format (EXAKT so verwenden):
**Deutsch:**
- [Hausaufgabe 1]
- [Hausaufgabe 2]

**Mathe:**
- [Hausaufgabe]

Regeln:
- Falls keine klaren Hausaufgaben erkennbar sind, gib den wichtigsten Inhalt strukturiert zurück
- Jede Hausaufgabe in einer eigenen Zeile mit \"- \" beginnen
- Verwende die Fach-Namen EXAKT wie oben angegeben
- Wenn ein Fach nicht erkannt wird, verwende \"**Weitere Aufgaben:**\"

Falls der Text unleserlich ist, antworte mit:
\"❌ Text nicht klar erkennbar. Bitte verwende ein schärferes Bild oder gib die Hausaufgaben manuell mit .ai ein.\""
    )
}

pub fn solution(subject: Subject, page: &str, page_text: &str) -> String {
    let name = subject.display_name();
    let guidance = solution_guidance(subject);
    format!(
        "Du bist ein sehr hilfsbereiter Nachhilfe-Assistent für das Fach \"{name}\". Analysiere den folgenden Text aus einem Schulbuch und löse alle Aufgaben, die du findest.

Text von Seite {page}:
{page_text}

{guidance}

Aufgabe:
1. Identifiziere alle Übungen, Aufgaben und Fragen auf dieser Seite
2. Löse sie Schritt für Schritt
3. Erkläre deine Lösungswege verständlich und ausführlich
4. Gib praktische Tipps zum Verständnis

Format deine Antwort strukturiert:

## 📚 Aufgabe 1: [Aufgabentitel]
**Lösung:**
[Schritt-für-Schritt Lösung]

**Erklärung:**
[Verständliche Erklärung]

Falls keine klaren Aufgaben erkennbar sind, fasse den Inhalt zusammen und gib Lernhilfen für das Thema.

Sei geduldig, motivierend und erkläre alles so, dass es ein Schüler gut verstehen kann."
    )
}

/// `page_text` is `None` when the book page could not be loaded.
pub fn homework_help(subject: Subject, page: &str, question: &str, page_text: Option<&str>) -> String {
    let name = subject.display_name();
    let emoji = subject.emoji();
    let context = match page_text {
        Some(text) => format!("📖 Hier ist der Text von Seite {page}:\n{text}\n"),
        None => format!(
            "📚 Ich arbeite mit Seite {page} des Fachs \"{name}\", aber der Seitentext ist nicht verfügbar.\n"
        ),
    };
    let focus = if page_text.is_some() {
        "Beziehe dich auf den Seiteninhalt wenn relevant"
    } else {
        "Arbeite mit allgemeinem Fachwissen"
    };
    let page_section = if page_text.is_some() {
        "\n## 📖 Bezug zur Buchseite:\n[Verbindung zum Seiteninhalt und weitere Aufgaben]\n"
    } else {
        ""
    };
    let hints = help_guidance(subject);

    format!(
        "Du bist ein erfahrener und geduldiger Nachhilfelehrer für das Fach \"{name}\".

{context}
🎓 **Schülerfrage:** \"{question}\"

Deine Aufgabe als Nachhilfelehrer:
1. Beantworte die Schülerfrage ausführlich und verständlich
2. Erkläre schwierige Konzepte Schritt für Schritt
3. Gib praktische Tipps und Lernhilfen
4. Verwende Beispiele zur Veranschaulichung
5. Sei motivierend und ermutigend
6. {focus}

Spezielle Hinweise für {name}:
{hints}

Formatiere deine Antwort übersichtlich:

## {emoji} Antwort auf deine Frage:
[Direkte, verständliche Antwort]

## 📚 Schritt-für-Schritt Erklärung:
[Detaillierte Erklärung mit Zwischenschritten]

## 💡 Tipps & Tricks:
[Praktische Lernhilfen und Merktipps]

## 🔍 Beispiele:
[Konkrete Beispiele zur Veranschaulichung]
{page_section}
## 🎯 Zusammenfassung:
[Wichtigste Punkte kurz zusammengefasst]

Stil: Sei geduldig, motivierend und erkläre alles so, dass es ein Schüler gut verstehen kann. Verwende keine zu komplizierte Fachsprache ohne Erklärung."
    )
}

pub fn vision_transcription() -> String {
    "Extrahiere ALLEN sichtbaren Text aus diesem Bild.

Aufgabe:
1. Erkenne und transkribiere JEDEN sichtbaren Text
2. Behalte die Struktur und Formatierung bei
3. Achte besonders auf Fächer-Namen, Aufgabennummern und Inhalte

Bitte gib NUR den erkannten Text zurück, keine zusätzlichen Kommentare."
        .to_string()
}

fn solution_guidance(subject: Subject) -> String {
    let lines: &[&str] = match subject {
        Subject::Mathe => &[
            "Zeige alle Rechenschritte deutlich",
            "Erkläre mathematische Konzepte und Formeln",
            "Gib Tipps für ähnliche Aufgaben",
            "Prüfe deine Ergebnisse",
        ],
        Subject::Deutsch => &[
            "Erkläre Grammatikregeln und Rechtschreibung",
            "Gib Interpretationshilfen für Texte",
            "Erläutere Stilmittel und Textarten",
            "Hilf bei der Textanalyse",
        ],
        Subject::English => &[
            "Gib Übersetzungen und Erklärungen",
            "Erkläre Grammatikregeln auf Deutsch",
            "Hilf bei Vokabeln und Phrasen",
            "Korrigiere Fehler und erkläre sie",
        ],
        Subject::Franzoesisch => &[
            "Gib Übersetzungen ins Deutsche",
            "Erkläre französische Grammatik verständlich",
            "Hilf bei Aussprache und Vokabeln",
            "Erkläre kulturelle Besonderheiten",
        ],
        Subject::Latein => &[
            "Übersetze lateinische Texte ins Deutsche",
            "Erkläre Grammatik und Syntax",
            "Gib Hilfen zur Wortschatzerweiterung",
            "Erkläre historische Zusammenhänge",
        ],
        Subject::Geschichte => &[
            "Erkläre historische Zusammenhänge",
            "Gib Zeitleisten und Daten",
            "Erkläre Ursachen und Auswirkungen",
            "Verbinde Vergangenheit mit Gegenwart",
        ],
        Subject::Physik => &[
            "Erkläre physikalische Gesetze und Formeln",
            "Zeige Berechnungen mit Einheiten",
            "Gib Alltagsbezug zu Phänomenen",
            "Erkläre Experimente und Versuche",
        ],
        Subject::Chemie => &[
            "Erkläre chemische Reaktionen und Formeln",
            "Zeige Berechnungen mit Molekülen",
            "Erkläre Periodensystem und Bindungen",
            "Gib Sicherheitshinweise bei Experimenten",
        ],
        Subject::ReligionEv | Subject::ReligionKt | Subject::Ethik => &[
            "Erkläre ethische und religiöse Konzepte",
            "Gib verschiedene Sichtweisen wieder",
            "Erkläre Textinterpretationen",
            "Fördere kritisches Denken",
        ],
    };
    format!("Spezielle Anweisungen für {}:\n{}", subject.display_name(), bullets(lines))
}

fn help_guidance(subject: Subject) -> String {
    let lines: &[&str] = match subject {
        Subject::Mathe => &[
            "Zeige alle Rechenschritte deutlich",
            "Erkläre verwendete Formeln und Regeln",
            "Gib Kontrolltipps zur Überprüfung",
            "Verwende konkrete Zahlenbeispiele",
            "Erkläre die Logik hinter den Schritten",
        ],
        Subject::Deutsch => &[
            "Erkläre Grammatikregeln mit Beispielen",
            "Gib Strukturhilfen für Texte",
            "Erkläre Stilmittel anschaulich",
            "Hilf bei Rechtschreibung und Zeichensetzung",
            "Gib Interpretationsansätze",
        ],
        Subject::English => &[
            "Gib deutsche Übersetzungen und Erklärungen",
            "Erkläre Grammatikregeln verständlich",
            "Hilf bei Aussprache (phonetisch)",
            "Gib Vokabelhilfen und Merkwörter",
            "Zeige typische Sprachmuster auf",
        ],
        Subject::Franzoesisch => &[
            "Übersetze ins Deutsche",
            "Erkläre französische Grammatik einfach",
            "Hilf bei Aussprache (Lautschrift)",
            "Gib Eselsbrücken für Vokabeln",
            "Erkläre kulturelle Besonderheiten",
        ],
        Subject::Latein => &[
            "Übersetze lateinische Texte",
            "Erkläre Grammatik und Satzstruktur",
            "Gib Wortschatzhilfen",
            "Zeige Wortableitungen ins Deutsche",
            "Erkläre historische Zusammenhänge",
        ],
        Subject::Geschichte => &[
            "Erkläre historische Zusammenhänge",
            "Gib chronologische Einordnungen",
            "Zeige Ursache-Wirkung-Ketten auf",
            "Verbinde mit der heutigen Zeit",
            "Gib Merkstrategien für Daten",
        ],
        Subject::Physik => &[
            "Erkläre Naturgesetze anschaulich",
            "Zeige Formeln mit Einheiten",
            "Gib Alltagsbeispiele",
            "Erkläre Experimente verständlich",
            "Zeige Anwendungen in der Technik",
        ],
        Subject::Chemie => &[
            "Erkläre chemische Reaktionen",
            "Zeige Formeln und Gleichungen",
            "Gib Alltagsbezüge",
            "Erkläre Sicherheit im Labor",
            "Zeige Anwendungen im Leben",
        ],
        Subject::ReligionEv | Subject::ReligionKt | Subject::Ethik => &[
            "Erkläre ethische Konzepte verständlich",
            "Zeige verschiedene Sichtweisen auf",
            "Fördere eigenes Nachdenken",
            "Gib Lebensbezug",
            "Respektiere unterschiedliche Meinungen",
        ],
    };
    bullets(lines)
}

fn bullets(lines: &[&str]) -> String {
    lines.iter().map(|l| format!("- {l}")).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_embeds_question() {
        assert!(chat("Was ist ein Bruch?").contains("Was ist ein Bruch?"));
    }

    #[test]
    fn analysis_lists_every_subject_name() {
        let prompt = homework_analysis("Mathe S. 82");
        for subject in Subject::ALL {
            assert!(prompt.contains(&format!("- {}", subject.display_name())));
        }
        assert!(prompt.contains("Mathe S. 82"));
    }

    #[test]
    fn solution_carries_subject_guidance() {
        let prompt = solution(Subject::Mathe, "82", "Aufgabe 5: 3/4 + 1/8");
        assert!(prompt.contains("Text von Seite 82"));
        assert!(prompt.contains("Zeige alle Rechenschritte deutlich"));
        assert!(!prompt.contains("Übersetze lateinische Texte"));
    }

    #[test]
    fn help_without_page_text_uses_general_knowledge() {
        let prompt = homework_help(Subject::Latein, "12", "Was heißt amare?", None);
        assert!(prompt.contains("Seitentext ist nicht verfügbar"));
        assert!(prompt.contains("Arbeite mit allgemeinem Fachwissen"));
        assert!(!prompt.contains("Bezug zur Buchseite"));
        assert!(prompt.contains("## 🟠 Antwort auf deine Frage:"));
    }

    #[test]
    fn help_with_page_text_references_the_page() {
        let prompt = homework_help(Subject::Physik, "7", "Warum?", Some("Das Ohmsche Gesetz"));
        assert!(prompt.contains("Das Ohmsche Gesetz"));
        assert!(prompt.contains("Bezug zur Buchseite"));
        assert!(prompt.contains("Erkläre Naturgesetze anschaulich"));
    }
}
