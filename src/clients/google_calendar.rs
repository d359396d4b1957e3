use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::models::event::CalendarEvent;
use crate::models::token::{OAuthToken, load_token, write_token};
use crate::service::calendar_service::CalendarSource;
use crate::service::oauth_service::OAuthClient;

const GOOGLE_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
const CALENDAR_ID: &str = "primary";

#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    items: Vec<CalendarEvent>,
}

/// Google Calendar v3 `events.list` against each account's primary calendar.
pub struct GoogleCalendarClient {
    http: reqwest::Client,
    oauth: OAuthClient,
    api_base: String,
    max_results: u32,
}

impl GoogleCalendarClient {
    pub fn new(oauth: OAuthClient, timeout: std::time::Duration, max_results: u32) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Provider(format!("unable to build HTTP client: {}", e)))?;
        Ok(Self::with_http(http, oauth, max_results))
    }

    pub fn with_http(http: reqwest::Client, oauth: OAuthClient, max_results: u32) -> Self {
        Self {
            http,
            oauth,
            api_base: GOOGLE_CALENDAR_API_BASE.to_string(),
            max_results,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Loads the stored token, refreshing and rewriting it when expired.
    pub async fn authorized_token(&self, credential: &Path, now: DateTime<Utc>) -> Result<OAuthToken> {
        let token = load_token(credential)?;
        if !token.is_expired(now) {
            return Ok(token);
        }

        info!(credential = %credential.display(), "access token expired, refreshing");
        let refreshed = self
            .oauth
            .refresh(&token, now)
            .await
            .map_err(|e| match e {
                AppError::Timeout => AppError::Timeout,
                other => AppError::credential(credential, other),
            })?;
        if let Err(err) = write_token(credential, &refreshed) {
            warn!(credential = %credential.display(), error = %err, "unable to persist refreshed token");
        }
        Ok(refreshed)
    }

    pub async fn list_events(
        &self,
        credential: &Path,
        token: &OAuthToken,
        now: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>> {
        let url = format!("{}/calendars/{}/events", self.api_base, CALENDAR_ID);
        let time_min = now.to_rfc3339_opts(SecondsFormat::Secs, true);
        let max_results = self.max_results.to_string();

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, token.authorization_header())
            .query(&[
                ("showDeleted", "false"),
                ("singleEvents", "true"),
                ("timeMin", time_min.as_str()),
                ("maxResults", max_results.as_str()),
                ("orderBy", "startTime"),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::credential(
                credential,
                format!("calendar API rejected the token ({}): {}", status, body.trim()),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!(
                "unable to retrieve upcoming events ({}): {}",
                status,
                body.trim()
            )));
        }

        let parsed: EventsResponse = response
            .json()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::from(e)
                } else {
                    AppError::Provider(format!("unable to parse events response: {}", e))
                }
            })?;
        let events: Vec<CalendarEvent> = parsed
            .items
            .into_iter()
            .filter(|event| !event.is_cancelled())
            .collect();
        debug!(credential = %credential.display(), count = events.len(), "listed events");
        Ok(events)
    }
}

#[async_trait]
impl CalendarSource for GoogleCalendarClient {
    async fn upcoming_events(
        &self,
        credential: &Path,
        now: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>> {
        let token = self.authorized_token(credential, now).await?;
        self.list_events(credential, &token, now).await
    }
}
