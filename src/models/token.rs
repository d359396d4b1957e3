use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::create_private_dir;
use crate::error::{AppError, Result};

// Tokens this close to expiry are refreshed before use.
const EXPIRY_DELTA_SECS: i64 = 10;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OAuthToken {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl OAuthToken {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        // A zero timestamp (0001-01-01) written by other OAuth libraries means "never".
        self.expiry.filter(|expiry| expiry.timestamp() > 0)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at() {
            Some(expiry) => expiry - Duration::seconds(EXPIRY_DELTA_SECS) <= now,
            None => false,
        }
    }

    pub fn authorization_header(&self) -> String {
        let kind = if self.token_type.trim().is_empty() {
            "Bearer"
        } else {
            self.token_type.as_str()
        };
        format!("{} {}", kind, self.access_token)
    }
}

/// Directory holding one JSON file per registered account.
#[derive(Debug, Clone)]
pub struct TokenStore {
    dir: PathBuf,
}

impl TokenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persists `token` under a fresh UUID file name and returns its path.
    pub fn save_new(&self, token: &OAuthToken) -> Result<PathBuf> {
        create_private_dir(&self.dir)?;
        let path = self.dir.join(Uuid::new_v4().to_string());
        write_token(&path, token)?;
        Ok(path)
    }
}

pub fn load_token(path: &Path) -> Result<OAuthToken> {
    let content = fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
    let token: OAuthToken =
        serde_json::from_str(&content).map_err(|e| AppError::credential(path, e))?;
    if token.access_token.trim().is_empty() && token.refresh_token.is_none() {
        return Err(AppError::credential(path, "token file holds no usable token"));
    }
    Ok(token)
}

pub fn write_token(path: &Path, token: &OAuthToken) -> Result<()> {
    let mut body = serde_json::to_string(token).map_err(|e| AppError::credential(path, e))?;
    body.push('\n');

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path).map_err(|e| AppError::io(path, e))?;
    file.write_all(body.as_bytes())
        .map_err(|e| AppError::io(path, e))
}
