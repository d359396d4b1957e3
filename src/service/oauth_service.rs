use chrono::{DateTime, Duration, Utc};
use reqwest::Url;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::secret::ApplicationSecret;
use crate::models::token::OAuthToken;

pub const CALENDAR_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";
const STATE_TOKEN: &str = "state-token";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Authorization-code and refresh-token grants against the client's token endpoint.
#[derive(Clone)]
pub struct OAuthClient {
    http: reqwest::Client,
    secret: ApplicationSecret,
}

impl OAuthClient {
    pub fn new(secret: ApplicationSecret, timeout: std::time::Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Auth(format!("unable to build HTTP client: {}", e)))?;
        Ok(Self::with_http(secret, http))
    }

    pub fn with_http(secret: ApplicationSecret, http: reqwest::Client) -> Self {
        Self { http, secret }
    }

    /// URL the user opens in a browser to grant offline read-only access.
    pub fn authorization_url(&self) -> Result<String> {
        let url = Url::parse_with_params(
            &self.secret.auth_uri,
            &[
                ("access_type", "offline"),
                ("client_id", self.secret.client_id.as_str()),
                ("redirect_uri", self.secret.redirect_uri()),
                ("response_type", "code"),
                ("scope", CALENDAR_READONLY_SCOPE),
                ("state", STATE_TOKEN),
            ],
        )
        .map_err(|e| AppError::Auth(format!("invalid auth_uri {}: {}", self.secret.auth_uri, e)))?;
        Ok(url.to_string())
    }

    pub async fn exchange_code(&self, code: &str, now: DateTime<Utc>) -> Result<OAuthToken> {
        let code = code.trim();
        if code.is_empty() {
            return Err(AppError::Auth("authorization code is empty".to_string()));
        }
        let response = self
            .request_token(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.secret.redirect_uri()),
                ("client_id", self.secret.client_id.as_str()),
                ("client_secret", self.secret.client_secret.as_str()),
            ])
            .await?;
        Ok(into_token(response, None, now))
    }

    /// Trades the refresh token for a new access token. The old refresh
    /// token is kept when the provider does not rotate it.
    pub async fn refresh(&self, token: &OAuthToken, now: DateTime<Utc>) -> Result<OAuthToken> {
        let Some(refresh_token) = token.refresh_token.as_deref() else {
            return Err(AppError::Auth(
                "access token expired and no refresh token is stored".to_string(),
            ));
        };
        let response = self
            .request_token(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", self.secret.client_id.as_str()),
                ("client_secret", self.secret.client_secret.as_str()),
            ])
            .await?;
        Ok(into_token(response, Some(refresh_token), now))
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let response = self
            .http
            .post(&self.secret.token_uri)
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(AppError::Auth(format!(
                "token endpoint returned {}: {}",
                status,
                text.trim()
            )));
        }
        serde_json::from_str(&text)
            .map_err(|e| AppError::Auth(format!("unable to parse token response: {}", e)))
    }
}

fn into_token(response: TokenResponse, previous_refresh: Option<&str>, now: DateTime<Utc>) -> OAuthToken {
    OAuthToken {
        access_token: response.access_token,
        token_type: response.token_type.unwrap_or_else(|| "Bearer".to_string()),
        refresh_token: response
            .refresh_token
            .or_else(|| previous_refresh.map(str::to_string)),
        expiry: response
            .expires_in
            .filter(|secs| *secs > 0)
            .map(|secs| now + Duration::seconds(secs)),
    }
}
