use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use calendarBlock::error::{AppError, Result};
use calendarBlock::models::color::Palette;
use calendarBlock::models::event::{CalendarEvent, EventStart};
use calendarBlock::service::calendar_service::CalendarSource;
use calendarBlock::service::render::{Markup, NO_EVENTS, NO_FUTURE_EVENT};
use calendarBlock::tasks::status_line::{StatusOptions, status_tick};
use chrono::{DateTime, Duration, TimeZone, Utc};

enum Scripted {
    Events(Vec<CalendarEvent>),
    Fail(fn(&Path) -> AppError),
}

struct ScriptedSource {
    responses: HashMap<PathBuf, Scripted>,
    calls: Mutex<Vec<PathBuf>>,
}

impl ScriptedSource {
    fn new(responses: Vec<(&str, Scripted)>) -> Self {
        Self {
            responses: responses
                .into_iter()
                .map(|(path, scripted)| (PathBuf::from(path), scripted))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CalendarSource for ScriptedSource {
    async fn upcoming_events(
        &self,
        credential: &Path,
        _now: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>> {
        self.calls.lock().unwrap().push(credential.to_path_buf());
        match self.responses.get(credential) {
            Some(Scripted::Events(events)) => Ok(events.clone()),
            Some(Scripted::Fail(make)) => Err(make(credential)),
            None => Err(AppError::credential(credential, "not scripted")),
        }
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 2, 12, 0, 0).unwrap()
}

fn at(summary: &str, offset: Duration) -> CalendarEvent {
    CalendarEvent::timed(summary, (now() + offset).fixed_offset())
}

fn options(markup: Markup) -> StatusOptions {
    StatusOptions {
        lookahead: Duration::hours(24),
        urgency_horizon: Duration::hours(4),
        markup,
    }
}

fn credentials(paths: &[&str]) -> Vec<PathBuf> {
    paths.iter().map(PathBuf::from).collect()
}

#[tokio::test]
async fn merges_accounts_before_selecting() {
    let source = ScriptedSource::new(vec![
        (
            "/tokens/work",
            Scripted::Events(vec![at("review", Duration::hours(2)), at("offsite", Duration::hours(30))]),
        ),
        ("/tokens/home", Scripted::Events(vec![at("standup", Duration::minutes(10))])),
    ]);

    let line = status_tick(
        &source,
        &credentials(&["/tokens/work", "/tokens/home"]),
        &Palette::gradient(),
        &options(Markup::Plain),
        now(),
    )
    .await
    .unwrap();

    assert_eq!(line, "standup | 0.17h | 2");
}

#[tokio::test]
async fn imminent_event_is_drawn_red() {
    let source = ScriptedSource::new(vec![(
        "/tokens/work",
        Scripted::Events(vec![at("standup", Duration::minutes(10))]),
    )]);

    let line = status_tick(
        &source,
        &credentials(&["/tokens/work"]),
        &Palette::gradient(),
        &options(Markup::Pango),
        now(),
    )
    .await
    .unwrap();

    // 10m of 4h -> index 21
    assert_eq!(
        line,
        "<span foreground=\"white\">standup</span> | <span foreground=\"#FF1500\">0.17h</span> | 1"
    );
}

#[tokio::test]
async fn failing_credential_does_not_hide_the_others() {
    let source = ScriptedSource::new(vec![
        ("/tokens/revoked", Scripted::Fail(|p| AppError::credential(p, "invalid_grant"))),
        ("/tokens/slow", Scripted::Fail(|_| AppError::Timeout)),
        ("/tokens/home", Scripted::Events(vec![at("dentist", Duration::hours(3))])),
    ]);

    let line = status_tick(
        &source,
        &credentials(&["/tokens/revoked", "/tokens/slow", "/tokens/home"]),
        &Palette::gradient(),
        &options(Markup::Plain),
        now(),
    )
    .await
    .unwrap();

    assert_eq!(line, "dentist | 3.00h | 1");
    assert_eq!(
        source.calls(),
        credentials(&["/tokens/revoked", "/tokens/slow", "/tokens/home"])
    );
}

#[tokio::test]
async fn every_credential_failing_is_fatal() {
    let source = ScriptedSource::new(vec![
        ("/tokens/a", Scripted::Fail(|_| AppError::Provider("503".to_string()))),
        ("/tokens/b", Scripted::Fail(|_| AppError::Timeout)),
    ]);

    let err = status_tick(
        &source,
        &credentials(&["/tokens/a", "/tokens/b"]),
        &Palette::gradient(),
        &options(Markup::Plain),
        now(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::AllCredentialsFailed(2)));
}

#[tokio::test]
async fn single_failing_credential_reports_its_own_error() {
    let source = ScriptedSource::new(vec![(
        "/tokens/a",
        Scripted::Fail(|p| AppError::credential(p, "token revoked")),
    )]);

    let err = status_tick(
        &source,
        &credentials(&["/tokens/a"]),
        &Palette::gradient(),
        &options(Markup::Plain),
        now(),
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("token revoked"));
}

#[tokio::test]
async fn no_credentials_means_no_events() {
    let source = ScriptedSource::new(vec![]);
    let line = status_tick(&source, &[], &Palette::gradient(), &options(Markup::Pango), now())
        .await
        .unwrap();
    assert_eq!(line, NO_EVENTS);
}

#[tokio::test]
async fn only_far_events_means_no_future_event() {
    let source = ScriptedSource::new(vec![(
        "/tokens/a",
        Scripted::Events(vec![at("conference", Duration::hours(48))]),
    )]);

    let line = status_tick(
        &source,
        &credentials(&["/tokens/a"]),
        &Palette::gradient(),
        &options(Markup::Pango),
        now(),
    )
    .await
    .unwrap();

    assert_eq!(line, NO_FUTURE_EVENT);
}

#[tokio::test]
async fn unparseable_event_is_skipped_without_aborting() {
    let broken = CalendarEvent {
        summary: Some("broken".to_string()),
        start: EventStart {
            date_time: Some("2026-13-45T99:00:00Z".to_string()),
            ..EventStart::default()
        },
        ..CalendarEvent::default()
    };
    let source = ScriptedSource::new(vec![(
        "/tokens/a",
        Scripted::Events(vec![broken, at("lunch", Duration::minutes(45))]),
    )]);

    let line = status_tick(
        &source,
        &credentials(&["/tokens/a"]),
        &Palette::gradient(),
        &options(Markup::Plain),
        now(),
    )
    .await
    .unwrap();

    assert_eq!(line, "lunch | 0.75h | 1");
}
