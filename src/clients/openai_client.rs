use reqwest;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: String,
}

pub async fn generate_openai_prompt(
    prompt: &str,
    prompt_type: &str,
    api_key: &str,
) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    let full_prompt = match prompt_type {
        "schedule_extraction" => format!(
            "You are a scheduling extraction engine.\n\
             Task: From the request below, extract:\n\
             - \"title\": a short event name with scheduling words removed. For example:\n\
               - \"2 hour deep work session\" -> \"deep work session\"\n\
               - \"30 minute standup at 10am Friday\" -> \"standup\"\n\
             - \"duration_minutes\": the event length as a positive integer number of minutes, or null when the request gives no usable duration.\n\
             - \"start\": an RFC3339 datetime in the user's timezone, ONLY when the user names an exact time of day. Otherwise null.\n\
             - \"day\": a YYYY-MM-DD date in the user's timezone, ONLY when the user names a day without an exact time of day. Otherwise null.\n\
             Rules:\n\
             - Never output both \"start\" and \"day\"; an exact time always carries its day inside \"start\".\n\
             - If the user gives an explicit date like \"December 6th\", use that exact month and day; do NOT change them.\n\
             - If the year is omitted, assume the next occurrence of that date on or after the current date.\n\
             - Resolve relative phrases (e.g. \"tomorrow at 3pm\", \"in two hours\") against the current date/time given in the request.\n\
             - For day-of-week phrases:\n\
               - \"Friday\" or \"this Friday\" means the next occurrence of that weekday on or after today.\n\
               - \"next Friday\" means the occurrence in the following week (at least 7 days after today), not the immediate upcoming one.\n\
             - Never invent a duration. \"for an hour\" is 60; \"let's sync soon\" has none.\n\
             - Output ONLY raw JSON, no prose, markdown, or code fences.\n\
             - The JSON shape must be exactly:\n\
             {{\"title\":\"<string>\",\"duration_minutes\":<integer or null>,\"start\":\"<RFC3339 datetime or null>\",\"day\":\"<YYYY-MM-DD or null>\"}}\n\
             {user_prompt}",
            user_prompt = prompt
        ),
        // Connectivity probe; passes the caller's message straight through.
        "pulse_check" => prompt.to_string(),
        _ => return Err("Not a valid base prompt".to_string().into()),
    };

    query_openai(full_prompt, prompt_type, api_key).await
}

async fn query_openai(
    prompt: String,
    prompt_type: &str,
    api_key: &str,
) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    let system_message = match prompt_type {
        "schedule_extraction" => {
            "You are a strict JSON scheduling extraction engine. You read instructions and a scheduling request and reply ONLY with a single JSON object, with no markdown, no backticks, and no extra text. If the user gives an explicit date (e.g. \"December 6th\"), you preserve that exact month and day and only fill in missing year/time according to the instructions."
        }
        "pulse_check" => {
            "You are a scheduling assistant that helps plan the user's calendar. Reply with a short plain-text status message."
        }
        _ => "You are a helpful assistant.",
    };

    let request: OpenAIRequest = OpenAIRequest {
        model: "gpt-4o-mini".to_string(),
        messages: vec![
            OpenAIMessage {
                role: "system".to_string(),
                content: system_message.to_string(),
            },
            OpenAIMessage {
                role: "user".to_string(),
                content: prompt,
            },
        ],
        max_tokens: 1500,
        temperature: 0.2,
    };

    let client = reqwest::Client::new();
    let response = client
        .post("https://api.openai.com/v1/chat/completions")
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .json(&request)
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?; // read the body once

    if !status.is_success() {
        eprintln!("Error {}: {}", status, text);
        return Err(format!("Request failed with status {}", status).into());
    }

    let parsed: OpenAIResponse = serde_json::from_str(&text)
        .map_err(|e| format!("Failed to parse JSON: {}\nRaw body: {}", e, text))?;

    if let Some(choice) = parsed.choices.first() {
        Ok(choice.message.content.clone())
    } else {
        eprintln!("No choices found in response.\nRaw body:\n{}", text);
        Err("No response from OpenAI".to_string().into())
    }
}
