use std::sync::Arc;

use chrono::{TimeZone, Utc};
use chrono_tz::America::Los_Angeles;

use schedulerBot::models::schedule::SchedulingError;
use schedulerBot::service::intent_service::IntentExtractor;
use schedulerBot::service::openai_service::OpenAIClient;

struct FakeOpenAI {
    response: Result<String, String>,
}

#[serenity::async_trait]
impl OpenAIClient for FakeOpenAI {
    async fn generate_prompt(
        &self,
        _prompt: &str,
        _prompt_type: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        match &self.response {
            Ok(body) => Ok(body.clone()),
            Err(err) => Err(err.clone().into()),
        }
    }
}

fn extractor(response: Result<String, String>) -> IntentExtractor {
    IntentExtractor::new(Arc::new(FakeOpenAI { response }), Los_Angeles)
}

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 3, 15, 0, 0).unwrap()
}

#[tokio::test]
async fn extracts_a_complete_request() {
    let extractor = extractor(Ok(
        "{\"title\":\"standup\",\"duration_minutes\":30,\"start\":\"2026-08-07T10:00:00-07:00\",\"day\":null}"
            .to_string(),
    ));
    let request = extractor
        .extract("30 minute standup at 10am on Friday", now())
        .await
        .unwrap();

    assert_eq!(request.title, "standup");
    assert_eq!(request.duration_minutes, 30);
    assert_eq!(
        request.explicit_start,
        Some(Utc.with_ymd_and_hms(2026, 8, 7, 17, 0, 0).unwrap())
    );
    assert!(request.day_constraint.is_none());
    assert_eq!(request.earliest_allowed, now());
}

#[tokio::test]
async fn service_failure_surfaces_as_extraction_error() {
    let extractor = extractor(Err("connection refused".to_string()));
    let result = extractor.extract("schedule something", now()).await;
    assert!(matches!(result, Err(SchedulingError::Extraction(_))));
}

#[tokio::test]
async fn non_json_payload_surfaces_as_extraction_error() {
    let extractor = extractor(Ok("Sure! I'd be happy to help schedule that.".to_string()));
    let result = extractor.extract("an hour of reading", now()).await;
    assert!(matches!(result, Err(SchedulingError::Extraction(_))));
}

#[tokio::test]
async fn missing_duration_surfaces_as_extraction_error() {
    let extractor = extractor(Ok(
        "{\"title\":\"sync\",\"duration_minutes\":null,\"start\":null,\"day\":null}".to_string(),
    ));
    let result = extractor.extract("let's sync soon", now()).await;
    assert!(matches!(result, Err(SchedulingError::Extraction(_))));
}

#[tokio::test]
async fn explicit_start_wins_over_day_constraint() {
    let extractor = extractor(Ok(
        "{\"title\":\"standup\",\"duration_minutes\":30,\"start\":\"2026-08-07T10:00:00-07:00\",\"day\":\"2026-08-06\"}"
            .to_string(),
    ));
    let request = extractor.extract("standup Friday 10am", now()).await.unwrap();
    assert!(request.explicit_start.is_some());
    assert!(request.day_constraint.is_none());
}

#[tokio::test]
async fn missing_title_falls_back_to_the_request_text() {
    let extractor = extractor(Ok(
        "{\"title\":null,\"duration_minutes\":60,\"start\":null,\"day\":null}".to_string(),
    ));
    let request = extractor.extract("an hour of reading", now()).await.unwrap();
    assert_eq!(request.title, "an hour of reading");
}
