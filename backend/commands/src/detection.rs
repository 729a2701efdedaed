/// Command detection: recognize dot commands in inbound messages and parse
/// their arguments.
use studybot_core::{BotError, LookupQuery};

use crate::format::usage;
use crate::types::{BotCommand, CommandKind, UsageError};

const PAGE_KEYWORD: &str = "seite";

/// `None` for ordinary chatter, `Some(Err(_))` for a known keyword with bad
/// arguments. The keyword is case-insensitive; free text keeps its case.
pub fn detect_command(text: &str) -> Option<Result<BotCommand, UsageError>> {
    let trimmed = text.trim();
    let (keyword, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((k, r)) => (k, r.trim()),
        None => (trimmed, ""),
    };

    let parsed = match keyword.to_lowercase().as_str() {
        ".ha" if rest.is_empty() => Ok(BotCommand::Homework),
        ".help" | ".hilfe" if rest.is_empty() => Ok(BotCommand::Help),
        ".ai" => {
            if rest.is_empty() {
                Err(usage_error(CommandKind::Chat, None))
            } else {
                Ok(BotCommand::Chat { prompt: rest.to_string() })
            }
        }
        ".lsg" => parse_page_ref(CommandKind::Solution, rest).and_then(|(query, extra)| {
            no_trailing(CommandKind::Solution, extra).map(|()| BotCommand::Solution(query))
        }),
        ".material" => parse_page_ref(CommandKind::Material, rest).and_then(|(query, extra)| {
            no_trailing(CommandKind::Material, extra).map(|()| BotCommand::Material(query))
        }),
        ".a" => parse_page_ref(CommandKind::HomeworkHelp, rest).and_then(|(query, question)| {
            if question.is_empty() {
                Err(usage_error(CommandKind::HomeworkHelp, None))
            } else {
                Ok(BotCommand::HomeworkHelp { query, question: question.to_string() })
            }
        }),
        _ => return None,
    };
    Some(parsed)
}

/// Split `<subject words> seite <page> [rest]`. The subject is every word
/// before the page keyword, so `religion ev seite 3` works.
fn parse_page_ref(kind: CommandKind, args: &str) -> Result<(LookupQuery, &str), UsageError> {
    let words = words_with_offsets(args);
    let Some(keyword_at) = words.iter().position(|(_, w)| w.eq_ignore_ascii_case(PAGE_KEYWORD)) else {
        return Err(usage_error(kind, None));
    };
    if keyword_at == 0 {
        return Err(usage_error(kind, None));
    }
    let Some(&(page_start, page)) = words.get(keyword_at + 1) else {
        return Err(usage_error(kind, None));
    };

    let subject = words[..keyword_at]
        .iter()
        .map(|(_, w)| *w)
        .collect::<Vec<_>>()
        .join(" ");
    let query = LookupQuery::parse(&subject, page).map_err(|e| usage_error(kind, Some(&e)))?;
    let rest = args[page_start + page.len()..].trim();
    Ok((query, rest))
}

fn no_trailing(kind: CommandKind, extra: &str) -> Result<(), UsageError> {
    if extra.is_empty() { Ok(()) } else { Err(usage_error(kind, None)) }
}

fn usage_error(kind: CommandKind, cause: Option<&BotError>) -> UsageError {
    let message = match cause {
        Some(cause) => format!("{}\n\n{}", cause.user_message(), usage(kind)),
        None => usage(kind),
    };
    UsageError { kind, message }
}

/// Whitespace-separated words with their byte offsets into `text`.
fn words_with_offsets(text: &str) -> Vec<(usize, &str)> {
    let mut words = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                words.push((s, &text[s..i]));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        words.push((s, &text[s..]));
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use studybot_core::Subject;

    fn ok(text: &str) -> BotCommand {
        detect_command(text).expect("command").expect("valid")
    }

    fn usage_kind(text: &str) -> CommandKind {
        detect_command(text).expect("command").expect_err("usage").kind
    }

    #[test]
    fn ordinary_messages_are_ignored() {
        for text in ["hallo", "", "   ", ".hausaufgaben", "ha", ".analyse text", ".ha bitte", ".help me"] {
            assert!(detect_command(text).is_none(), "{text:?}");
        }
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(ok("  .HA "), BotCommand::Homework);
        assert_eq!(ok(".Hilfe"), BotCommand::Help);
        assert_eq!(ok(".help"), BotCommand::Help);
    }

    #[test]
    fn solution_and_material_parse_page_refs() {
        assert_eq!(ok(".lsg Mathe Seite 42"), BotCommand::Solution(LookupQuery::new(Subject::Mathe, "42")));
        assert_eq!(
            ok(".material religion  ev seite 3"),
            BotCommand::Material(LookupQuery::new(Subject::ReligionEv, "3"))
        );
        assert_eq!(ok(".lsg fr seite 8"), BotCommand::Solution(LookupQuery::new(Subject::Franzoesisch, "8")));
    }

    #[test]
    fn chat_keeps_original_case() {
        assert_eq!(
            ok(".AI Erkläre mir  Photosynthese"),
            BotCommand::Chat { prompt: "Erkläre mir  Photosynthese".into() }
        );
    }

    #[test]
    fn homework_help_splits_question() {
        assert_eq!(
            ok(".a Religion kt seite 12 Was bedeutet Gnade?"),
            BotCommand::HomeworkHelp {
                query: LookupQuery::new(Subject::ReligionKt, "12"),
                question: "Was bedeutet Gnade?".into(),
            }
        );
    }

    #[test]
    fn malformed_arguments_yield_usage() {
        assert_eq!(usage_kind(".lsg"), CommandKind::Solution);
        assert_eq!(usage_kind(".lsg mathe 42"), CommandKind::Solution);
        assert_eq!(usage_kind(".lsg seite 42"), CommandKind::Solution);
        assert_eq!(usage_kind(".lsg mathe seite"), CommandKind::Solution);
        assert_eq!(usage_kind(".lsg mathe seite 42 extra"), CommandKind::Solution);
        assert_eq!(usage_kind(".a mathe seite 42"), CommandKind::HomeworkHelp);
        assert_eq!(usage_kind(".material"), CommandKind::Material);
        assert_eq!(usage_kind(".ai"), CommandKind::Chat);
    }

    #[test]
    fn unknown_subject_usage_names_the_problem() {
        let err = detect_command(".lsg kunst seite 4").unwrap().unwrap_err();
        assert!(err.message.contains("kunst"));
        assert!(err.message.contains(".lsg [fach] seite [nummer]"));
    }

    #[test]
    fn non_numeric_page_is_usage() {
        let err = detect_command(".material mathe seite vier").unwrap().unwrap_err();
        assert!(err.message.contains("vier"));
    }

    #[test]
    fn word_offsets_track_multibyte_text() {
        let words = words_with_offsets(" französisch  seite 5 ");
        assert_eq!(words, vec![(1, "französisch"), (15, "seite"), (21, "5")]);
    }
}
