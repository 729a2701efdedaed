/// Command dispatch: detect, gate and route inbound messages to handlers.
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use studybot_core::{BotError, ChatChannel, InboundMessage, Reply};

use crate::detection::detect_command;
use crate::gate::{CommandGate, DropReason};
use crate::types::{BotCommand, CommandKind};

// ---------------------------------------------------------------------------
// Handler trait
// ---------------------------------------------------------------------------

/// Context passed to every command handler.
pub struct CommandContext<'a> {
    pub message: &'a InboundMessage,
    pub channel: &'a dyn ChatChannel,
}

impl CommandContext<'_> {
    pub async fn reply(&self, reply: Reply) -> Result<(), BotError> {
        self.channel.send(reply).await.map_err(BotError::Other)
    }

    pub async fn say(&self, text: impl Into<String> + Send) -> Result<(), BotError> {
        self.reply(Reply::text(text)).await
    }
}

#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, command: &BotCommand, ctx: &CommandContext<'_>) -> Result<(), BotError>;
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// What happened to one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Not a command, or not in the allowed channel.
    Ignored,
    /// A command keyword with bad arguments; usage help was sent.
    UsageReplied,
    Dropped(DropReason),
    Handled,
    /// The handler failed; the user got an error reply.
    Failed,
}

pub struct CommandDispatcher {
    handlers: HashMap<CommandKind, Arc<dyn CommandHandler>>,
    gate: Arc<CommandGate>,
    allowed_channel: Option<String>,
}

impl CommandDispatcher {
    pub fn new(gate: Arc<CommandGate>) -> Self {
        Self { handlers: HashMap::new(), gate, allowed_channel: None }
    }

    /// Only react to messages from this channel.
    pub fn with_allowed_channel(mut self, channel_id: Option<String>) -> Self {
        self.allowed_channel = channel_id;
        self
    }

    pub fn register(&mut self, kind: CommandKind, handler: Arc<dyn CommandHandler>) {
        self.handlers.insert(kind, handler);
    }

    pub fn gate(&self) -> &Arc<CommandGate> {
        &self.gate
    }

    pub async fn dispatch(&self, message: &InboundMessage, channel: &dyn ChatChannel) -> DispatchOutcome {
        if let Some(allowed) = &self.allowed_channel {
            if *allowed != message.channel_id {
                return DispatchOutcome::Ignored;
            }
        }

        let Some(parsed) = detect_command(&message.content) else {
            return DispatchOutcome::Ignored;
        };
        let kind = match &parsed {
            Ok(command) => command.kind(),
            Err(usage) => usage.kind,
        };

        let _active = match self.gate.admit(&message.id, &message.author_id, kind) {
            Ok(active) => active,
            Err(reason) => return DispatchOutcome::Dropped(reason),
        };

        let command = match parsed {
            Ok(command) => command,
            Err(usage) => {
                debug!(command = %kind, user_id = %message.author_id, "Malformed command");
                if let Err(e) = channel.send(Reply::text(usage.message)).await {
                    warn!(error = %e, "Failed to send usage reply");
                }
                return DispatchOutcome::UsageReplied;
            }
        };

        let Some(handler) = self.handlers.get(&kind) else {
            warn!(command = %kind, "No handler registered");
            return DispatchOutcome::Ignored;
        };

        info!(command = %kind, user_id = %message.author_id, channel_id = %message.channel_id, "Dispatching command");
        let ctx = CommandContext { message, channel };
        match handler.handle(&command, &ctx).await {
            Ok(()) => DispatchOutcome::Handled,
            Err(e) => {
                if e.is_user_actionable() {
                    warn!(command = %kind, error = %e, "Command rejected");
                } else {
                    error!(command = %kind, error = %e, "Command failed");
                }
                if let Err(send_err) = ctx.say(e.user_message()).await {
                    warn!(error = %send_err, "Failed to send error reply");
                }
                DispatchOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;
    use studybot_core::InboundAttachment;

    /// Channel fake that records every reply.
    #[derive(Default)]
    pub struct RecordingChannel {
        pub sent: Mutex<Vec<Reply>>,
        pub recent: Vec<InboundAttachment>,
    }

    impl RecordingChannel {
        pub fn with_recent(recent: Vec<InboundAttachment>) -> Self {
            Self { sent: Mutex::default(), recent }
        }

        pub fn texts(&self) -> Vec<String> {
            self.sent.lock().unwrap().iter().map(|r| r.text.clone()).collect()
        }

        pub fn replies(&self) -> Vec<Reply> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatChannel for RecordingChannel {
        async fn send(&self, reply: Reply) -> anyhow::Result<()> {
            self.sent.lock().unwrap().push(reply);
            Ok(())
        }

        async fn recent_attachments(&self, limit: u8) -> anyhow::Result<Vec<InboundAttachment>> {
            Ok(self.recent.iter().take(limit as usize).cloned().collect())
        }
    }

    pub fn message(id: &str, author: &str, content: &str) -> InboundMessage {
        InboundMessage {
            id: id.into(),
            author_id: author.into(),
            channel_id: "c1".into(),
            content: content.into(),
            attachments: Vec::new(),
        }
    }
}
