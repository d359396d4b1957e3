use chrono::{DateTime, Utc};
use inquire::Text;
use std::path::PathBuf;
use tracing::info;

use crate::config::Settings;
use crate::error::{AppError, Result};
use crate::models::token::TokenStore;
use crate::service::oauth_service::OAuthClient;

pub fn prompt_authorization_code(authorization_url: &str) -> Result<String> {
    println!(
        "Go to the following link in your browser then type the authorization code: \n{}",
        authorization_url
    );
    let code = Text::new("Authorization code:")
        .prompt()
        .map_err(|e| AppError::Prompt(e.to_string()))?;
    Ok(code.trim().to_string())
}

/// Exchanges `code`, stores the token in a new file and appends the file to
/// the config's `auth-tokens`.
pub async fn register_with_code(
    oauth: &OAuthClient,
    settings: &mut Settings,
    code: &str,
    now: DateTime<Utc>,
) -> Result<PathBuf> {
    let token = oauth.exchange_code(code, now).await?;
    let store = TokenStore::new(&settings.token_dir);
    let path = store.save_new(&token)?;
    info!(path = %path.display(), "stored new credential");

    settings.config.add_credential(path.clone());
    settings.config.save(&settings.config_path)?;
    Ok(path)
}
