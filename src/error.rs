use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("unable to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("credential {} is unusable: {reason}", path.display())]
    Credential { path: PathBuf, reason: String },

    #[error("calendar provider request failed: {0}")]
    Provider(String),

    #[error("calendar provider request timed out")]
    Timeout,

    #[error("authorization failed: {0}")]
    Auth(String),

    #[error("unable to read authorization code: {0}")]
    Prompt(String),

    #[error("all {0} registered credentials failed")]
    AllCredentialsFailed(usize),
}

impl AppError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn credential(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Credential {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Provider(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
