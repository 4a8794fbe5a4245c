use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use crate::models::schedule::{ScheduledEvent, SchedulingError, SchedulingRequest, WorkingWindow};
use crate::service::calendar_service::CalendarClient;
use crate::service::intent_service::IntentExtractor;
use crate::service::openai_service::OpenAIClient;
use crate::service::slot_resolver::{self, SEARCH_HORIZON_DAYS};

/// The slot-resolution pipeline: extract, fetch busy data, resolve,
/// materialize. One linear chain per invocation; both the CLI and the
/// chat surface call this identically.
pub struct SchedulingService {
    extractor: IntentExtractor,
    calendar: Arc<dyn CalendarClient>,
    window: WorkingWindow,
}

impl SchedulingService {
    pub fn new(
        openai: Arc<dyn OpenAIClient>,
        calendar: Arc<dyn CalendarClient>,
        window: WorkingWindow,
    ) -> Self {
        Self {
            extractor: IntentExtractor::new(openai, window.tz),
            calendar,
            window,
        }
    }

    pub fn timezone(&self) -> Tz {
        self.window.tz
    }

    pub async fn schedule(
        &self,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<ScheduledEvent, SchedulingError> {
        let request = self.extractor.extract(text, now).await?;

        let (fetch_start, fetch_end) = self.fetch_window(&request);
        let busy = self
            .calendar
            .fetch_busy(fetch_start, fetch_end)
            .await
            .map_err(|e| SchedulingError::Availability(e.to_string()))?;

        let slot = slot_resolver::resolve(&request, &busy, &self.window)?;

        let confirmation = self
            .calendar
            .create_event(&slot)
            .await
            .map_err(|e| SchedulingError::Materialization(e.to_string()))?;

        Ok(ScheduledEvent { slot, confirmation })
    }

    // Busy-data window for one request: exactly the candidate interval for
    // an explicit start, the full local day for a day constraint, otherwise
    // the whole search horizon.
    fn fetch_window(&self, request: &SchedulingRequest) -> (DateTime<Utc>, DateTime<Utc>) {
        if let Some(start) = request.explicit_start {
            return (start, start + request.duration());
        }
        if let Some(day) = request.day_constraint {
            if let Some(bounds) = local_day_bounds(day, self.window.tz) {
                return bounds;
            }
        }
        (
            request.earliest_allowed,
            request.earliest_allowed + Duration::days(SEARCH_HORIZON_DAYS),
        )
    }
}

fn local_day_bounds(date: NaiveDate, tz: Tz) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = local_midnight(date, tz)?;
    let end = local_midnight(date.succ_opt()?, tz)?;
    Some((start, end))
}

fn local_midnight(date: NaiveDate, tz: Tz) -> Option<DateTime<Utc>> {
    let naive = date.and_hms_opt(0, 0, 0)?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// The one human-readable outcome format, shared by every invocation
/// surface. Times are rendered in the calendar's timezone.
pub fn render_outcome(result: &Result<ScheduledEvent, SchedulingError>, tz: &Tz) -> String {
    match result {
        Ok(event) => {
            let start = event.slot.start.with_timezone(tz);
            let end = event.slot.end.with_timezone(tz);
            let end_text = if start.date_naive() == end.date_naive() {
                end.format("%H:%M").to_string()
            } else {
                end.format("%Y-%m-%d %H:%M").to_string()
            };
            let mut message = format!(
                "created: {} at {}\u{2013}{}",
                event.slot.title,
                start.format("%Y-%m-%d %H:%M"),
                end_text
            );
            if let Some(link) = &event.confirmation.html_link {
                message.push('\n');
                message.push_str(link);
            }
            message
        }
        Err(err) => err.to_string(),
    }
}
