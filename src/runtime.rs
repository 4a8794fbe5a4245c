use std::sync::Arc;

use serenity::model::gateway::GatewayIntents;

use crate::events::queue::EventBus;
use crate::events::worker::run_event_worker;
use crate::handlers::discord::BotHandler;
use crate::service::scheduling_service::SchedulingService;

pub async fn run_api(service: Arc<SchedulingService>, discord_client_secret: String) {
    let discord_token_arc = Arc::new(discord_client_secret.clone());

    let (bus, rx) = EventBus::new(16);
    tokio::spawn(run_event_worker(rx, service, discord_token_arc));

    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;
    let mut client = serenity::Client::builder(discord_client_secret, intents)
        .event_handler(BotHandler::new(bus))
        .await
        .expect("Error creating Serenity client");

    if let Err(why) = client.start().await {
        eprintln!("Client error: {:?}", why);
    }
}
