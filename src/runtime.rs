use chrono::Utc;
use std::path::PathBuf;

use crate::clients::google_calendar::GoogleCalendarClient;
use crate::config::Settings;
use crate::error::{AppError, Result};
use crate::models::color::Palette;
use crate::models::secret::ApplicationSecret;
use crate::service::oauth_service::OAuthClient;
use crate::tasks::register::{prompt_authorization_code, register_with_code};
use crate::tasks::status_line::{StatusOptions, status_tick};

fn oauth_client(settings: &Settings) -> Result<OAuthClient> {
    let secret = ApplicationSecret::from_file(&settings.creds_path)?;
    OAuthClient::new(secret, settings.request_timeout)
}

pub async fn run_status(settings: &Settings) -> Result<String> {
    let credentials = settings.credentials()?.to_vec();
    let oauth = oauth_client(settings)?;
    let client = GoogleCalendarClient::new(oauth, settings.request_timeout, settings.max_results)?;

    status_tick(
        &client,
        &credentials,
        Palette::shared(),
        &StatusOptions::from(settings),
        Utc::now(),
    )
    .await
}

pub async fn run_register(settings: &mut Settings) -> Result<PathBuf> {
    let oauth = oauth_client(settings)?;
    let authorization_url = oauth.authorization_url()?;

    // inquire blocks on the terminal
    let code = tokio::task::spawn_blocking(move || prompt_authorization_code(&authorization_url))
        .await
        .map_err(|e| AppError::Prompt(e.to_string()))??;

    register_with_code(&oauth, settings, &code, Utc::now()).await
}
