use std::sync::Arc;

use chrono::Utc;
use serenity::http::Http;
use serenity::model::id::ChannelId;
use tokio::sync::mpsc;

use crate::events::queue::Event;
use crate::service::scheduling_service::{SchedulingService, render_outcome};

/// Drains the event bus, running one isolated pipeline invocation per
/// inbound request and posting the outcome back to the channel.
pub async fn run_event_worker(
    mut rx: mpsc::Receiver<Event>,
    service: Arc<SchedulingService>,
    discord_token: Arc<String>,
) {
    while let Some(event) = rx.recv().await {
        match event {
            Event::ScheduleRequested {
                text,
                user_id,
                channel_id,
            } => {
                let result = service.schedule(&text, Utc::now()).await;
                if let Err(err) = &result {
                    eprintln!("Scheduling failed for {}: {}", user_id, err);
                }
                let tz = service.timezone();
                let body = render_outcome(&result, &tz);
                send_channel_message(
                    &discord_token,
                    &channel_id,
                    &format!("<{}> {}", user_id, body),
                )
                .await;
            }
        }
    }
}

async fn send_channel_message(token: &str, channel_id: &str, message: &str) {
    let http: Http = Http::new(token);
    let channel = match channel_id.parse::<u64>() {
        Ok(id) => ChannelId::new(id),
        Err(_) => {
            eprintln!("Invalid channel id {}, dropping response.", channel_id);
            return;
        }
    };
    let _ = channel.say(&http, message).await;
}
