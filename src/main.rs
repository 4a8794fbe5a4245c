#![allow(non_snake_case)]

use std::env;
use std::sync::Arc;

use schedulerBot::cli;
use schedulerBot::clients::calendar_client::GoogleCalendarClient;
use schedulerBot::config::{AppConfig, SchedulerSettings};
use schedulerBot::runtime;
use schedulerBot::service::openai_service::{OpenAIClient, OpenAIService};
use schedulerBot::service::scheduling_service::SchedulingService;

const DEFAULT_RUN_MODE: &str = "cli";

#[tokio::main]
async fn main() {
    let config = match env::var("CONFIG_FILE") {
        Ok(path) => AppConfig::from_file(&path).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    };

    let get_prop = |key: &str| -> Option<String> {
        config.get(key).or_else(|| env::var(key).ok())
    };

    let settings = SchedulerSettings::from_lookup(&get_prop)
        .expect("Invalid scheduler configuration");
    let openai_api_key = get_prop("OPENAI_API_KEY")
        .expect("OPENAI_API_KEY environment variable not set");
    let calendar_token = get_prop("GOOGLE_CALENDAR_TOKEN")
        .expect("GOOGLE_CALENDAR_TOKEN environment variable not set");

    let openai: Arc<dyn OpenAIClient> = Arc::new(OpenAIService::new(openai_api_key));
    let calendar = Arc::new(GoogleCalendarClient::new(
        calendar_token,
        settings.timezone.to_string(),
    ));
    let service = Arc::new(SchedulingService::new(
        openai.clone(),
        calendar,
        settings.working_window(),
    ));

    let run_mode = get_prop("RUN_MODE").unwrap_or(DEFAULT_RUN_MODE.to_string());
    if run_mode == "api" {
        let discord_client_secret = get_prop("DISCORD_CLIENT_SECRET")
            .expect("DISCORD_CLIENT_SECRET must be set for bot mode");
        runtime::run_api(service, discord_client_secret).await;
    } else if run_mode == "cli" {
        cli::cli(service, openai).await;
    } else {
        println!("Invalid run mode {}", run_mode);
    }
}
