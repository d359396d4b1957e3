use chrono::{DateTime, Duration, Utc};
use std::path::PathBuf;
use tracing::debug;

use crate::config::Settings;
use crate::error::Result;
use crate::models::color::Palette;
use crate::service::calendar_service::{CalendarSource, gather_events};
use crate::service::render::{Markup, StatusLine};
use crate::service::selection::select_next;
use crate::service::urgency::UrgencyMapper;

#[derive(Debug, Clone, Copy)]
pub struct StatusOptions {
    pub lookahead: Duration,
    pub urgency_horizon: Duration,
    pub markup: Markup,
}

impl From<&Settings> for StatusOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            lookahead: settings.lookahead,
            urgency_horizon: settings.urgency_horizon,
            markup: settings.markup,
        }
    }
}

/// One status-bar refresh: fetch every account, pick the next event and
/// render the line.
pub async fn status_tick<S: CalendarSource + ?Sized>(
    source: &S,
    credentials: &[PathBuf],
    palette: &Palette,
    options: &StatusOptions,
    now: DateTime<Utc>,
) -> Result<String> {
    let events = gather_events(source, credentials, now).await?;
    let selection = select_next(&events, now, options.lookahead);
    debug!(total = events.len(), within_horizon = selection.count, "selected next event");

    let urgency = UrgencyMapper::new(palette, options.urgency_horizon);
    let line = StatusLine::build(events.len(), &selection, now, &urgency);
    Ok(line.render(options.markup))
}
