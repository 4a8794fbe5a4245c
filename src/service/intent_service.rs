use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::models::schedule::{AIScheduleRequest, DEFAULT_TITLE, SchedulingError, SchedulingRequest};
use crate::service::openai_service::OpenAIClient;

/// Turns free text into a validated SchedulingRequest.
///
/// The language understanding itself is delegated to the completion
/// service; this type owns the prompt payload and treats the answer as
/// untrusted data, schema-validating every field before use.
pub struct IntentExtractor {
    openai: Arc<dyn OpenAIClient>,
    timezone: Tz,
}

impl IntentExtractor {
    pub fn new(openai: Arc<dyn OpenAIClient>, timezone: Tz) -> Self {
        Self { openai, timezone }
    }

    pub async fn extract(
        &self,
        text: &str,
        reference_now: DateTime<Utc>,
    ) -> Result<SchedulingRequest, SchedulingError> {
        let local_now = reference_now.with_timezone(&self.timezone);
        let prompt = format!(
            "Current date and time ({tz}): {now}\nUser message: \"{text}\"",
            tz = self.timezone,
            now = local_now.to_rfc3339(),
            text = text,
        );

        let payload = self
            .openai
            .generate_prompt(&prompt, "schedule_extraction")
            .await
            .map_err(|e| SchedulingError::Extraction(format!("extraction call failed: {}", e)))?;

        let parsed: AIScheduleRequest = serde_json::from_str(payload.trim())
            .map_err(|e| SchedulingError::Extraction(format!("malformed extraction payload: {}", e)))?;

        build_request(parsed, text, reference_now)
    }
}

/// Validation of the raw extraction payload, separated from the service
/// call so it can be exercised without a network.
pub fn build_request(
    parsed: AIScheduleRequest,
    source_text: &str,
    reference_now: DateTime<Utc>,
) -> Result<SchedulingRequest, SchedulingError> {
    let duration_minutes = match parsed.duration_minutes {
        Some(minutes) if minutes > 0 => minutes,
        Some(minutes) => {
            return Err(SchedulingError::Extraction(format!(
                "non-positive duration: {}",
                minutes
            )));
        }
        None => {
            return Err(SchedulingError::Extraction(
                "no usable duration in the request".to_string(),
            ));
        }
    };

    let explicit_start = match parsed.start.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() && raw != "null" => Some(
            DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| {
                    SchedulingError::Extraction(format!("invalid start datetime '{}': {}", raw, e))
                })?,
        ),
        _ => None,
    };

    // An exact time carries its own day; a day constraint alongside it is
    // redundant at best and contradictory at worst, so the explicit start wins.
    let day_constraint = if explicit_start.is_some() {
        None
    } else {
        match parsed.day.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() && raw != "null" => Some(
                NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| {
                    SchedulingError::Extraction(format!("invalid day '{}': {}", raw, e))
                })?,
            ),
            _ => None,
        }
    };

    let title = parsed
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| {
            let fallback = source_text.trim();
            if fallback.is_empty() {
                DEFAULT_TITLE.to_string()
            } else {
                fallback.to_string()
            }
        });

    Ok(SchedulingRequest {
        title,
        duration_minutes,
        explicit_start,
        day_constraint,
        earliest_allowed: reference_now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 3, 15, 0, 0).unwrap()
    }

    fn payload(
        title: Option<&str>,
        duration: Option<i64>,
        start: Option<&str>,
        day: Option<&str>,
    ) -> AIScheduleRequest {
        AIScheduleRequest {
            title: title.map(str::to_string),
            duration_minutes: duration,
            start: start.map(str::to_string),
            day: day.map(str::to_string),
        }
    }

    #[test]
    fn missing_duration_fails_extraction() {
        let result = build_request(payload(Some("sync"), None, None, None), "let's sync soon", now());
        assert!(matches!(result, Err(SchedulingError::Extraction(_))));
    }

    #[test]
    fn zero_duration_fails_extraction() {
        let result = build_request(payload(Some("sync"), Some(0), None, None), "sync", now());
        assert!(matches!(result, Err(SchedulingError::Extraction(_))));
    }

    #[test]
    fn explicit_start_clears_day_constraint() {
        let request = build_request(
            payload(
                Some("standup"),
                Some(30),
                Some("2026-08-07T10:00:00-07:00"),
                Some("2026-08-07"),
            ),
            "30 minute standup at 10am Friday",
            now(),
        )
        .unwrap();
        assert!(request.explicit_start.is_some());
        assert!(request.day_constraint.is_none());
    }

    #[test]
    fn missing_title_falls_back_to_source_text() {
        let request = build_request(
            payload(None, Some(45), None, None),
            "45 minutes of reading",
            now(),
        )
        .unwrap();
        assert_eq!(request.title, "45 minutes of reading");
    }

    #[test]
    fn unparsable_start_fails_extraction() {
        let result = build_request(
            payload(Some("standup"), Some(30), Some("next friday-ish"), None),
            "standup",
            now(),
        );
        assert!(matches!(result, Err(SchedulingError::Extraction(_))));
    }

    #[test]
    fn day_constraint_parses_and_earliest_allowed_is_reference_now() {
        let request = build_request(
            payload(Some("review"), Some(60), None, Some("2026-08-07")),
            "review on Friday",
            now(),
        )
        .unwrap();
        assert_eq!(
            request.day_constraint,
            Some(NaiveDate::from_ymd_opt(2026, 8, 7).unwrap())
        );
        assert_eq!(request.earliest_allowed, now());
    }
}
