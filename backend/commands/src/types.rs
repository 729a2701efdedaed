/// Chat command types.
use std::fmt;

use studybot_core::LookupQuery;
use thiserror::Error;

/// Which command a message invoked, independent of its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Homework,
    Solution,
    Chat,
    HomeworkHelp,
    Material,
    Help,
}

impl CommandKind {
    pub const ALL: [CommandKind; 6] = [
        CommandKind::Homework,
        CommandKind::Solution,
        CommandKind::Chat,
        CommandKind::HomeworkHelp,
        CommandKind::Material,
        CommandKind::Help,
    ];

    /// The dot-prefixed keyword typed in chat.
    pub fn keyword(&self) -> &'static str {
        match self {
            CommandKind::Homework => ".ha",
            CommandKind::Solution => ".lsg",
            CommandKind::Chat => ".ai",
            CommandKind::HomeworkHelp => ".a",
            CommandKind::Material => ".material",
            CommandKind::Help => ".help",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A detected and fully parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// `.ha`: analyze the latest homework photo.
    Homework,
    /// `.lsg <subject> seite <n>`: send the page and its solution.
    Solution(LookupQuery),
    /// `.ai <question>`
    Chat { prompt: String },
    /// `.a <subject> seite <n> <question>`
    HomeworkHelp { query: LookupQuery, question: String },
    /// `.material <subject> seite <n>`
    Material(LookupQuery),
    /// `.help` / `.hilfe`
    Help,
}

impl BotCommand {
    pub fn kind(&self) -> CommandKind {
        match self {
            BotCommand::Homework => CommandKind::Homework,
            BotCommand::Solution(_) => CommandKind::Solution,
            BotCommand::Chat { .. } => CommandKind::Chat,
            BotCommand::HomeworkHelp { .. } => CommandKind::HomeworkHelp,
            BotCommand::Material(_) => CommandKind::Material,
            BotCommand::Help => CommandKind::Help,
        }
    }
}

/// A recognized command keyword with unusable arguments. The message is the
/// reply shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct UsageError {
    pub kind: CommandKind,
    pub message: String,
}
