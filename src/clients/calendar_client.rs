use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serenity::async_trait;

use crate::models::schedule::{BusyInterval, EventConfirmation, ResolvedSlot};
use crate::service::calendar_service::CalendarClient;

const FREEBUSY_URL: &str = "https://www.googleapis.com/calendar/v3/freeBusy";
const EVENTS_URL: &str = "https://www.googleapis.com/calendar/v3/calendars/primary/events";
const EVENT_DESCRIPTION: &str = "Scheduled by schedulerBot";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FreeBusyRequest {
    time_min: String,
    time_max: String,
    items: Vec<FreeBusyItem>,
}

#[derive(Debug, Serialize)]
struct FreeBusyItem {
    id: String,
}

#[derive(Debug, Deserialize)]
struct FreeBusyResponse {
    #[serde(default)]
    calendars: HashMap<String, FreeBusyCalendar>,
}

#[derive(Debug, Deserialize)]
struct FreeBusyCalendar {
    #[serde(default)]
    busy: Vec<FreeBusyPeriod>,
}

#[derive(Debug, Deserialize)]
struct FreeBusyPeriod {
    start: String,
    end: String,
}

#[derive(Debug, Serialize)]
struct EventBody {
    summary: String,
    description: String,
    start: EventTime,
    end: EventTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    date_time: String,
    time_zone: String,
}

#[derive(Debug, Deserialize)]
struct CreatedEvent {
    id: String,
    #[serde(rename = "htmlLink")]
    html_link: Option<String>,
}

/// Primary-calendar client over the Google Calendar v3 REST API.
///
/// Token acquisition and refresh live outside this crate; the client is
/// handed an already-valid bearer token.
pub struct GoogleCalendarClient {
    http: reqwest::Client,
    access_token: String,
    timezone_name: String,
}

impl GoogleCalendarClient {
    pub fn new(access_token: String, timezone_name: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            access_token,
            timezone_name,
        }
    }
}

#[async_trait]
impl CalendarClient for GoogleCalendarClient {
    async fn fetch_busy(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, Box<dyn std::error::Error + Send + Sync>> {
        let request = FreeBusyRequest {
            time_min: window_start.to_rfc3339(),
            time_max: window_end.to_rfc3339(),
            items: vec![FreeBusyItem {
                id: "primary".to_string(),
            }],
        };

        let response = self
            .http
            .post(FREEBUSY_URL)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?; // read the body once

        if !status.is_success() {
            eprintln!("Calendar freeBusy error {}: {}", status, text);
            return Err(format!("freeBusy request failed with status {}", status).into());
        }

        let parsed: FreeBusyResponse = serde_json::from_str(&text)
            .map_err(|e| format!("Failed to parse freeBusy JSON: {}\nRaw body: {}", e, text))?;

        let periods = parsed
            .calendars
            .get("primary")
            .map(|calendar| calendar.busy.as_slice())
            .unwrap_or(&[]);

        let mut busy = Vec::with_capacity(periods.len());
        for period in periods {
            busy.push(BusyInterval::new(
                parse_backend_datetime(&period.start)?,
                parse_backend_datetime(&period.end)?,
            ));
        }
        // Contract: ascending by start, unmerged.
        busy.sort_by_key(|interval| interval.start);
        Ok(busy)
    }

    async fn create_event(
        &self,
        slot: &ResolvedSlot,
    ) -> Result<EventConfirmation, Box<dyn std::error::Error + Send + Sync>> {
        let body = EventBody {
            summary: slot.title.clone(),
            description: EVENT_DESCRIPTION.to_string(),
            start: EventTime {
                date_time: slot.start.to_rfc3339(),
                time_zone: self.timezone_name.clone(),
            },
            end: EventTime {
                date_time: slot.end.to_rfc3339(),
                time_zone: self.timezone_name.clone(),
            },
        };

        let response = self
            .http
            .post(EVENTS_URL)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            eprintln!("Calendar insert error {}: {}", status, text);
            return Err(format!("event insert failed with status {}", status).into());
        }

        let created: CreatedEvent = serde_json::from_str(&text)
            .map_err(|e| format!("Failed to parse event JSON: {}\nRaw body: {}", e, text))?;

        Ok(EventConfirmation {
            id: created.id,
            html_link: created.html_link,
        })
    }
}

fn parse_backend_datetime(
    raw: &str,
) -> Result<DateTime<Utc>, Box<dyn std::error::Error + Send + Sync>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("Invalid datetime '{}' in freeBusy response: {}", raw, e).into())
}
