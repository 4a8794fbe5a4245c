use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use inquire::Text;

use crate::service::openai_service::OpenAIClient;
use crate::service::scheduling_service::{SchedulingService, render_outcome};

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Schedule a task described in free text.
    Schedule { text: String },
    /// Schedule a task, asking for the description interactively.
    SchedulePrompt {},
    /// Check that the completion service is reachable.
    PulseCheck {},
}

pub async fn cli(service: Arc<SchedulingService>, openai: Arc<dyn OpenAIClient>) {
    // Fine to panic here
    let cli = Cli::parse();
    match &cli.command {
        Commands::Schedule { text } => {
            schedule_and_report(&service, text).await;
        }
        Commands::SchedulePrompt {} => match specify_prompt() {
            Ok(text) => schedule_and_report(&service, &text).await,
            Err(_) => println!("No task description supplied"),
        },
        Commands::PulseCheck {} => pulse_check(openai.as_ref()).await,
    }
}

async fn schedule_and_report(service: &SchedulingService, text: &str) {
    let result = service.schedule(text, Utc::now()).await;
    let tz = service.timezone();
    println!("{}", render_outcome(&result, &tz));
}

fn specify_prompt() -> Result<String, Box<dyn std::error::Error>> {
    Ok(Text::new("What do you want to schedule?").prompt()?)
}

async fn pulse_check(openai: &dyn OpenAIClient) {
    match openai
        .generate_prompt(
            "System check: is the scheduling assistant awake?",
            "pulse_check",
        )
        .await
    {
        Ok(body) => {
            println!("{}", body);
            println!("Connection successful.");
        }
        Err(err) => {
            eprintln!("Could not reach the completion service: {}", err);
        }
    }
}
