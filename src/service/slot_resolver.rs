use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use crate::models::schedule::{BusyInterval, ResolvedSlot, SchedulingError, SchedulingRequest, WorkingWindow};

/// Bounded forward search horizon for open requests. Guarantees the gap
/// walk terminates even on a calendar with no free time.
pub const SEARCH_HORIZON_DAYS: i64 = 14;

/// Find the best open interval for a request against the given busy data.
///
/// Pure computation: no I/O, no clock reads, identical inputs always
/// yield the identical slot. Selection is earliest-fit: the soonest gap
/// that holds the duration wins, with no preference for round hours or
/// tighter packing. All interval arithmetic is half-open, so a busy
/// interval that merely touches a candidate boundary does not block it.
pub fn resolve(
    request: &SchedulingRequest,
    busy: &[BusyInterval],
    window: &WorkingWindow,
) -> Result<ResolvedSlot, SchedulingError> {
    if let Some(bad) = busy.iter().find(|interval| interval.start >= interval.end) {
        return Err(SchedulingError::Availability(format!(
            "invalid busy interval: {} to {}",
            bad.start, bad.end
        )));
    }

    let duration = request.duration();

    // An explicit start is authoritative: exactly that interval or nothing.
    // The working window does not apply and the request is never shifted.
    if let Some(start) = request.explicit_start {
        let end = start + duration;
        if busy.iter().any(|interval| interval.overlaps(start, end)) {
            return Err(SchedulingError::NoSlot);
        }
        return Ok(ResolvedSlot {
            start,
            end,
            title: request.title.clone(),
        });
    }

    let candidate_days: Vec<NaiveDate> = match request.day_constraint {
        Some(day) => vec![day],
        None => {
            let first = request
                .earliest_allowed
                .with_timezone(&window.tz)
                .date_naive();
            (0..SEARCH_HORIZON_DAYS)
                .map(|offset| first + Duration::days(offset))
                .collect()
        }
    };

    for day in candidate_days {
        let Some((day_start, day_end)) = day_bounds(day, window) else {
            continue;
        };
        let window_start = day_start.max(request.earliest_allowed);
        if window_start + duration > day_end {
            continue;
        }
        if let Some(start) = first_fit(window_start, day_end, duration, busy) {
            return Ok(ResolvedSlot {
                start,
                end: start + duration,
                title: request.title.clone(),
            });
        }
    }

    Err(SchedulingError::NoSlot)
}

/// Earliest gap of at least `duration` between merged busy runs inside
/// `[window_start, window_end)`, or None when nothing fits.
fn first_fit(
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    duration: Duration,
    busy: &[BusyInterval],
) -> Option<DateTime<Utc>> {
    let merged = merge_within(busy, window_start, window_end);
    let mut cursor = window_start;
    for (start, end) in merged {
        if start - cursor >= duration {
            return Some(cursor);
        }
        if end > cursor {
            cursor = end;
        }
    }
    if window_end - cursor >= duration {
        Some(cursor)
    } else {
        None
    }
}

/// Busy intervals clamped to the window, sorted, with overlapping and
/// abutting runs merged.
fn merge_within(
    busy: &[BusyInterval],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let mut clamped: Vec<(DateTime<Utc>, DateTime<Utc>)> = busy
        .iter()
        .filter(|interval| interval.start < window_end && window_start < interval.end)
        .map(|interval| (interval.start.max(window_start), interval.end.min(window_end)))
        .collect();
    clamped.sort();

    let mut merged: Vec<(DateTime<Utc>, DateTime<Utc>)> = Vec::with_capacity(clamped.len());
    for (start, end) in clamped {
        match merged.last_mut() {
            Some(last) if start <= last.1 => {
                if end > last.1 {
                    last.1 = end;
                }
            }
            _ => merged.push((start, end)),
        }
    }
    merged
}

fn day_bounds(date: NaiveDate, window: &WorkingWindow) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = local_instant(date, window.start_hour, window.tz)?;
    let end = local_instant(date, window.end_hour, window.tz)?;
    (start < end).then_some((start, end))
}

fn local_instant(date: NaiveDate, hour: u32, tz: Tz) -> Option<DateTime<Utc>> {
    let naive = date.and_hms_opt(hour, 0, 0)?;
    // A DST gap can make the local time nonexistent; the day is skipped.
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}
