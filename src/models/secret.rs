use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{AppError, Result};

pub const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";
const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// OAuth client definition downloaded from the Google Cloud console.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ApplicationSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SecretFile {
    installed: Option<ApplicationSecret>,
    web: Option<ApplicationSecret>,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ApplicationSecret {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!(
                "unable to read application secret file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content).map_err(|reason| {
            AppError::Config(format!(
                "unable to parse client secret file {}: {}",
                path.display(),
                reason
            ))
        })
    }

    pub fn from_json(content: &str) -> std::result::Result<Self, String> {
        let file: SecretFile = serde_json::from_str(content).map_err(|e| e.to_string())?;
        let secret = file
            .installed
            .or(file.web)
            .ok_or_else(|| "expected an \"installed\" or \"web\" section".to_string())?;
        if secret.client_id.trim().is_empty() {
            return Err("client_id is empty".to_string());
        }
        Ok(secret)
    }

    pub fn redirect_uri(&self) -> &str {
        self.redirect_uris
            .first()
            .map(String::as_str)
            .unwrap_or(OOB_REDIRECT_URI)
    }
}
