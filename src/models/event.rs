use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

pub const NO_TITLE: &str = "(no title)";

/// One event as returned by the Google Calendar v3 `events.list` call.
/// Only the fields the status line needs are kept.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub start: EventStart,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventStart {
    // RFC3339, absent for all-day events
    #[serde(default)]
    pub date_time: Option<String>,
    // yyyy-mm-dd, only set for all-day events
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StartTime {
    At(DateTime<FixedOffset>),
    Missing,
    Invalid(String),
}

impl StartTime {
    pub fn instant(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            StartTime::At(t) => Some(*t),
            _ => None,
        }
    }
}

impl CalendarEvent {
    pub fn timed(summary: &str, start: DateTime<FixedOffset>) -> Self {
        Self {
            id: String::new(),
            summary: Some(summary.to_string()),
            status: Some("confirmed".to_string()),
            start: EventStart {
                date_time: Some(start.to_rfc3339()),
                date: None,
                time_zone: None,
            },
        }
    }

    pub fn start_time(&self) -> StartTime {
        match self.start.date_time.as_deref().map(str::trim) {
            None | Some("") => StartTime::Missing,
            Some(raw) => match DateTime::parse_from_rfc3339(raw) {
                Ok(t) => StartTime::At(t),
                Err(_) => StartTime::Invalid(raw.to_string()),
            },
        }
    }

    /// Single-line title: control characters become spaces so a stray
    /// newline cannot split the block output.
    pub fn display_summary(&self) -> Cow<'_, str> {
        let raw = self.summary.as_deref().unwrap_or_default();
        let summary = if raw.contains(char::is_control) {
            let flat: String = raw
                .chars()
                .map(|c| if c.is_control() { ' ' } else { c })
                .collect();
            Cow::Owned(flat.trim().to_string())
        } else {
            Cow::Borrowed(raw.trim())
        };
        if summary.is_empty() {
            Cow::Borrowed(NO_TITLE)
        } else {
            summary
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.status.as_deref() == Some("cancelled")
    }
}
