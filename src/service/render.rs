use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::models::color::Color;
use crate::service::selection::Selection;
use crate::service::urgency::UrgencyMapper;

pub const NO_EVENTS: &str = "No upcoming events found.";
pub const NO_FUTURE_EVENT: &str = "No future event";
const SUMMARY_COLOR: &str = "white";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Markup {
    /// Pango spans, for i3blocks/swaybar with `markup=pango`
    #[default]
    Pango,
    /// Bare text
    Plain,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatusLine {
    NoEvents,
    NoFutureEvent,
    Next {
        summary: String,
        hours_until: f64,
        color: Color,
        count: u64,
    },
}

impl StatusLine {
    pub fn build(
        total_events: usize,
        selection: &Selection<'_>,
        now: DateTime<Utc>,
        urgency: &UrgencyMapper<'_>,
    ) -> Self {
        if total_events == 0 {
            return StatusLine::NoEvents;
        }
        let Some(event) = selection.next else {
            return StatusLine::NoFutureEvent;
        };
        let until = selection.time_until(now);
        StatusLine::Next {
            summary: event.display_summary().into_owned(),
            hours_until: until.map_or(0.0, |d| d.num_milliseconds() as f64 / 3_600_000.0),
            color: urgency.color_for(until),
            count: selection.count,
        }
    }

    pub fn render(&self, markup: Markup) -> String {
        match self {
            StatusLine::NoEvents => NO_EVENTS.to_string(),
            StatusLine::NoFutureEvent => NO_FUTURE_EVENT.to_string(),
            StatusLine::Next {
                summary,
                hours_until,
                color,
                count,
            } => match markup {
                Markup::Pango => format!(
                    "<span foreground=\"{}\">{}</span> | <span foreground=\"{}\">{:.2}h</span> | {}",
                    SUMMARY_COLOR,
                    escape_markup(summary),
                    color.hex(),
                    hours_until,
                    count
                ),
                Markup::Plain => format!("{} | {:.2}h | {}", summary, hours_until, count),
            },
        }
    }
}

fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
