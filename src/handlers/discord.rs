use serenity::all::{Command, CommandOptionType, Interaction as DiscordInteraction};
use serenity::async_trait;
use serenity::builder::{
    CreateCommand,
    CreateCommandOption,
    CreateInteractionResponse,
    CreateInteractionResponseMessage,
};
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;

use crate::events::queue::{Event, EventBus};

const ACK_MESSAGE: &str = "Got it, checking your calendar.";

/// Chat-side invocation surface. Both the `/schedule` slash command and a
/// plain direct message normalize into the same ScheduleRequested event;
/// everything after that is the worker's pipeline run. Sender
/// authorization lives outside this crate, in the bot's Discord-side
/// installation settings.
pub struct BotHandler {
    event_bus: EventBus,
}

impl BotHandler {
    pub fn new(event_bus: EventBus) -> Self {
        BotHandler { event_bus }
    }

    async fn handle_schedule(&self, ctx: &Context, command: serenity::all::CommandInteraction) {
        let text = command
            .data
            .options
            .iter()
            .find(|opt| opt.name == "text")
            .and_then(|opt| match &opt.value {
                serenity::all::CommandDataOptionValue::String(s) => Some(s.as_str()),
                _ => None,
            })
            .unwrap_or("")
            .to_string();

        if text.trim().is_empty() {
            let _ = command
                .create_response(
                    &ctx.http,
                    CreateInteractionResponse::Message(
                        CreateInteractionResponseMessage::new()
                            .content("Missing `text` argument for /schedule")
                            .ephemeral(true),
                    ),
                )
                .await;
            return;
        }

        self.event_bus
            .emit(Event::ScheduleRequested {
                text,
                user_id: format!("@{}", command.user.id),
                channel_id: command.channel_id.to_string(),
            })
            .await;

        let _ = command
            .create_response(
                &ctx.http,
                CreateInteractionResponse::Message(
                    CreateInteractionResponseMessage::new()
                        .content(ACK_MESSAGE)
                        .ephemeral(true),
                ),
            )
            .await;
    }
}

#[async_trait]
impl EventHandler for BotHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        println!("{} is connected!", ready.user.name);

        let builder = CreateCommand::new("schedule")
            .description("Find an open slot and put a task on your calendar")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "text",
                    "What should I schedule?",
                )
                .required(true),
            );

        let _ = Command::create_global_command(&ctx.http, builder).await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: DiscordInteraction) {
        if let DiscordInteraction::Command(command) = interaction {
            match command.data.name.as_str() {
                "schedule" => self.handle_schedule(&ctx, command).await,
                _ => {
                    // Unknown or unhandled command; ignore for now.
                }
            }
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        // Direct messages only; guild channels go through /schedule.
        if msg.author.bot || msg.guild_id.is_some() {
            return;
        }
        let text = msg.content.trim().to_string();
        if text.is_empty() {
            return;
        }

        self.event_bus
            .emit(Event::ScheduleRequested {
                text,
                user_id: format!("@{}", msg.author.id),
                channel_id: msg.channel_id.to_string(),
            })
            .await;

        let _ = msg.channel_id.say(&ctx.http, ACK_MESSAGE).await;
    }
}
