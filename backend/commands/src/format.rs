//! Reply formatting: usage and help texts, subject decoration, and the
//! message-length limit.

use studybot_core::{Reply, Subject};

use crate::gate::GatePolicy;
use crate::types::CommandKind;

/// Longest text the chat platform accepts in one message.
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// `🔴 deutsch, 🔵 mathe, ...`
pub fn subject_list() -> String {
    Subject::ALL
        .iter()
        .map(|s| format!("{} {}", s.emoji(), s.token()))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn usage(kind: CommandKind) -> String {
    let (format, examples): (&str, &[&str]) = match kind {
        CommandKind::Solution => (
            ".lsg [fach] seite [nummer]",
            &[".lsg deutsch seite 1", ".lsg mathe seite 42", ".lsg latein seite 15"],
        ),
        CommandKind::HomeworkHelp => (
            ".a [fach] seite [nummer] [frage]",
            &[".a deutsch seite 1 erkläre mir die aufgabe", ".a mathe seite 42 wie löse ich gleichungen"],
        ),
        CommandKind::Material => (
            ".material [fach] seite [nummer]",
            &[".material english seite 11", ".material mathe seite 42"],
        ),
        CommandKind::Chat => {
            return "❌ Format: `.ai [deine frage]`\nBeispiel: `.ai Erkläre mir Photosynthese`".to_string();
        }
        CommandKind::Homework | CommandKind::Help => return help_text(&GatePolicy::default()),
    };
    let examples = examples
        .iter()
        .map(|e| format!("• `{e}`"))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "❌ Format: `{format}`\n\n**Verfügbare Fächer:**\n{}\n\n**Beispiele:**\n{examples}",
        subject_list()
    )
}

pub fn help_text(policy: &GatePolicy) -> String {
    format!(
        "🤖 **Hausaufgaben Bot - Befehle:**

📝 `.ha` - Analysiert ha.jpg und zeigt Hausaufgaben an

📚 `.lsg [fach] seite [nummer]` - Zeigt Originalbild + Lösungen

🤖 `.ai [frage]` - Chat mit der KI

🎓 `.a [fach] seite [nummer] [frage]` - Hausaufgaben-Hilfe mit Tipps

📄 `.material [fach] seite [nummer]` - Zeigt alle Material-Dateien

❓ `.help` - Zeigt diese Hilfe an

**Verfügbare Fächer:**
{}

**Hinweise:**
• ⏱️ {} Sekunden Cooldown zwischen Commands
• 🚫 Max. {} gleichzeitige Commands
• 🔄 Automatische Duplikat-Prevention",
        subject_list(),
        policy.cooldown.as_secs(),
        policy.max_active,
    )
}

/// `🔵 **Mathe Seite 42**`
pub fn page_label(subject: Subject, page: &str) -> String {
    format!("{} **{} Seite {page}**", subject.emoji(), subject.display_name())
}

/// File-name friendly subject token (`religion_ev`).
pub fn file_token(subject: Subject) -> String {
    subject.token().replace(' ', "_")
}

/// Labels recognized at the start of a line in homework analyses, longest first.
const SUBJECT_LABELS: &[(&str, &str)] = &[
    ("Französisch", "🟠"),
    ("Religion ev", "⚫"),
    ("Religion kt", "⚫"),
    ("Geschichte", "⚪"),
    ("Religion", "⚫"),
    ("Deutsch", "🔴"),
    ("English", "🟡"),
    ("Latein", "🟠"),
    ("Physik", "🟣"),
    ("Chemie", "🟢"),
    ("Mathe", "🔵"),
    ("Ethik", "⚫"),
];

/// Prefix subject headings (`Mathe:` or `**Mathe:**`) with the subject emoji
/// and normalize them to `🔵 **Mathe:**`.
pub fn decorate_homework(text: &str) -> String {
    text.lines()
        .map(decorate_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn decorate_line(line: &str) -> String {
    let trimmed = line.trim_start();
    let (bold, body) = match trimmed.strip_prefix("**") {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    for (label, emoji) in SUBJECT_LABELS {
        let Some(rest) = body.strip_prefix(label).and_then(|r| r.strip_prefix(':')) else {
            continue;
        };
        let rest = if bold { rest.strip_prefix("**").unwrap_or(rest) } else { rest };
        return format!("{emoji} **{label}:**{rest}");
    }
    line.to_string()
}

/// Send `text` inline, or as a UTF-8 `.txt` attachment under `overflow_header`
/// when it exceeds [`MAX_MESSAGE_CHARS`].
pub fn long_reply(text: String, overflow_header: &str, file_name: &str) -> Reply {
    if text.chars().count() > MAX_MESSAGE_CHARS {
        Reply::text(format!("{overflow_header}\n*Text ist zu lang, siehe Datei:*"))
            .with_file(file_name, text.into_bytes())
    } else {
        Reply::text(text)
    }
}
