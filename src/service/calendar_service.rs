use chrono::{DateTime, Utc};
use serenity::async_trait;

use crate::models::schedule::{BusyInterval, EventConfirmation, ResolvedSlot};

/// Calendar backend seam: busy-data reads and the single event write.
///
/// `fetch_busy` returns every busy interval intersecting
/// `[window_start, window_end)`, sorted ascending by start. Overlapping or
/// back-to-back intervals are NOT merged here; merging belongs to the slot
/// resolver. `create_event` issues exactly one create call and never
/// retries on its own.
#[async_trait]
pub trait CalendarClient: Send + Sync {
    async fn fetch_busy(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, Box<dyn std::error::Error + Send + Sync>>;

    async fn create_event(
        &self,
        slot: &ResolvedSlot,
    ) -> Result<EventConfirmation, Box<dyn std::error::Error + Send + Sync>>;
}
