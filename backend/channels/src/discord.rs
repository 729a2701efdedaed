use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;
use serenity::all::{
    ChannelId, CreateAttachment, CreateMessage, GetMessages, Http, Message as DiscordMessage, Ready,
    ResumedEvent,
};
use serenity::prelude::*;
use tracing::{debug, error, info};

use studybot_commands::CommandDispatcher;
use studybot_core::{ChatChannel, ConnectionStatus, InboundAttachment, InboundMessage, Reply};

use crate::ChannelAdapter;

/// Discord's limit for message content.
const MAX_CONTENT_CHARS: usize = 2000;

/// Cut `text` to Discord's content limit on a char boundary.
fn fit_message(text: &str) -> Cow<'_, str> {
    match text.char_indices().nth(MAX_CONTENT_CHARS) {
        None => Cow::Borrowed(text),
        Some(_) => {
            let cut: String = text.chars().take(MAX_CONTENT_CHARS - 1).collect();
            Cow::Owned(format!("{cut}…"))
        }
    }
}

fn to_attachments<'a>(attachments: impl IntoIterator<Item = &'a serenity::all::Attachment>) -> Vec<InboundAttachment> {
    attachments
        .into_iter()
        .map(|a| InboundAttachment { filename: a.filename.clone(), url: a.url.clone() })
        .collect()
}

fn to_inbound(msg: &DiscordMessage) -> InboundMessage {
    InboundMessage {
        id: msg.id.to_string(),
        author_id: msg.author.id.to_string(),
        channel_id: msg.channel_id.to_string(),
        content: msg.content.clone(),
        attachments: to_attachments(&msg.attachments),
    }
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// One Discord text channel as a [`ChatChannel`].
pub struct DiscordChannel {
    http: Arc<Http>,
    channel_id: ChannelId,
}

impl DiscordChannel {
    pub fn new(http: Arc<Http>, channel_id: ChannelId) -> Self {
        Self { http, channel_id }
    }
}

#[async_trait]
impl ChatChannel for DiscordChannel {
    async fn send(&self, reply: Reply) -> anyhow::Result<()> {
        let mut builder = CreateMessage::new().content(fit_message(&reply.text));
        for file in reply.attachments {
            builder = builder.add_file(CreateAttachment::bytes(file.data.to_vec(), file.name));
        }
        self.channel_id.send_message(&self.http, builder).await?;
        Ok(())
    }

    async fn recent_attachments(&self, limit: u8) -> anyhow::Result<Vec<InboundAttachment>> {
        let messages = self
            .channel_id
            .messages(&self.http, GetMessages::new().limit(limit))
            .await?;
        Ok(to_attachments(messages.iter().flat_map(|m| m.attachments.iter())))
    }
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

struct Handler {
    dispatcher: Arc<CommandDispatcher>,
    status: Arc<ConnectionStatus>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: DiscordMessage) {
        if msg.author.bot {
            return;
        }

        let inbound = to_inbound(&msg);
        let channel = DiscordChannel::new(Arc::clone(&ctx.http), msg.channel_id);
        let outcome = self.dispatcher.dispatch(&inbound, &channel).await;
        debug!(message_id = %inbound.id, ?outcome, "Message processed");
    }

    async fn ready(&self, _: Context, ready: Ready) {
        info!(user = %ready.user.name, guilds = ready.guilds.len(), "Discord bot connected");
        self.status.set_connected(true);
    }

    async fn resume(&self, _: Context, _: ResumedEvent) {
        info!("Discord session resumed");
        self.status.set_connected(true);
    }
}

pub struct DiscordAdapter {
    token: String,
    dispatcher: Arc<CommandDispatcher>,
    status: Arc<ConnectionStatus>,
}

impl DiscordAdapter {
    pub fn new(token: String, dispatcher: Arc<CommandDispatcher>, status: Arc<ConnectionStatus>) -> Self {
        Self { token, dispatcher, status }
    }
}

#[async_trait]
impl ChannelAdapter for DiscordAdapter {
    fn name(&self) -> &str {
        "discord"
    }

    async fn start(&self) -> anyhow::Result<()> {
        info!("Starting Discord adapter");

        let intents = GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT;

        let handler = Handler { dispatcher: Arc::clone(&self.dispatcher), status: Arc::clone(&self.status) };
        let mut client = Client::builder(&self.token, intents).event_handler(handler).await?;

        let result = client.start().await;
        self.status.set_connected(false);
        if let Err(why) = result {
            error!(error = %why, "Discord client error");
            anyhow::bail!("Discord client error: {why}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_content_is_untouched() {
        assert!(matches!(fit_message("hallo"), Cow::Borrowed("hallo")));
        let exact = "ü".repeat(MAX_CONTENT_CHARS);
        assert_eq!(fit_message(&exact), exact);
    }

    #[test]
    fn long_content_is_cut_on_char_boundary() {
        let text = "ß".repeat(MAX_CONTENT_CHARS + 50);
        let fitted = fit_message(&text);
        assert_eq!(fitted.chars().count(), MAX_CONTENT_CHARS);
        assert!(fitted.ends_with('…'));
    }
}
