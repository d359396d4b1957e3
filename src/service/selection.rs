use chrono::{DateTime, Duration, FixedOffset, Utc};
use std::cmp::Ordering;
use tracing::{debug, info};

use crate::models::event::{CalendarEvent, StartTime};

#[derive(Debug, Clone, PartialEq)]
pub struct Selection<'a> {
    pub next: Option<&'a CalendarEvent>,
    pub next_start: Option<DateTime<FixedOffset>>,
    pub count: u64,
}

impl Selection<'_> {
    pub fn time_until(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.next_start.map(|start| start.with_timezone(&Utc) - now)
    }
}

/// Total order over optional start times. A missing start sorts after
/// every real one, and two missing starts are equal so a stable sort keeps
/// their input order.
pub fn compare_start(
    a: Option<DateTime<FixedOffset>>,
    b: Option<DateTime<FixedOffset>>,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Picks the soonest event starting no later than `now + lookahead` and
/// counts every timed event in that window.
pub fn select_next<'a>(
    events: &'a [CalendarEvent],
    now: DateTime<Utc>,
    lookahead: Duration,
) -> Selection<'a> {
    let mut timed: Vec<(Option<DateTime<FixedOffset>>, &CalendarEvent)> = events
        .iter()
        .map(|event| match event.start_time() {
            StartTime::At(start) => (Some(start), event),
            StartTime::Missing => {
                debug!(summary = %event.display_summary(), "skipping event without a start time");
                (None, event)
            }
            StartTime::Invalid(raw) => {
                info!(
                    summary = %event.display_summary(),
                    start = raw.as_str(),
                    "could not parse event start"
                );
                (None, event)
            }
        })
        .collect();
    timed.sort_by(|a, b| compare_start(a.0, b.0));

    let limit = now
        .checked_add_signed(lookahead)
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    let mut selection = Selection {
        next: None,
        next_start: None,
        count: 0,
    };
    for (start, event) in timed {
        let Some(start) = start else {
            continue;
        };
        if start.with_timezone(&Utc) > limit {
            break;
        }
        if selection.next.is_none() {
            selection.next = Some(event);
            selection.next_start = Some(start);
        }
        selection.count += 1;
    }
    selection
}
