use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::service::render::Markup;

pub const APP_DIR: &str = "calendar-block";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const CONFIG_ENV: &str = "CALENDAR_BLOCK_CONFIG";
pub const TOKEN_DIR_NAME: &str = "access-tokens";
pub const DEFAULT_CREDS_FILE: &str = "credentials.json";

const DEFAULT_LOOKAHEAD_HOURS: f64 = 24.0;
const DEFAULT_URGENCY_HOURS: f64 = 4.0;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_RESULTS: u32 = 30;

/// On-disk configuration, `config.toml`.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct AppConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_tokens: Option<Vec<PathBuf>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_tokens: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookahead_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markup: Option<Markup>,
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!(
                "unable to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("invalid config {}: {}", path.display(), e)))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let body = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("unable to serialize config: {}", e)))?;
        fs::write(path, body)
            .map_err(|e| AppError::Config(format!("unable to write config {}: {}", path.display(), e)))
    }

    pub fn add_credential(&mut self, path: PathBuf) {
        self.auth_tokens.get_or_insert_with(Vec::new).push(path);
    }
}

/// Values coming from the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub access_tokens: Option<PathBuf>,
    pub creds: Option<PathBuf>,
    pub markup: Option<Markup>,
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config_path: PathBuf,
    pub config: AppConfig,
    pub token_dir: PathBuf,
    pub creds_path: PathBuf,
    pub lookahead: Duration,
    pub urgency_horizon: Duration,
    pub request_timeout: std::time::Duration,
    pub max_results: u32,
    pub markup: Markup,
}

impl Settings {
    /// Locates and reads the config file. When `require_file` is false a
    /// missing file yields an empty config (used by `register`).
    pub fn load(overrides: &Overrides, require_file: bool) -> Result<Self> {
        let config_path = match &overrides.config {
            Some(path) => path.clone(),
            None => {
                let dir = default_config_dir()?;
                create_private_dir(&dir)?;
                dir.join(CONFIG_FILE_NAME)
            }
        };
        let config = if config_path.exists() || require_file {
            AppConfig::from_file(&config_path)?
        } else {
            AppConfig::default()
        };
        Self::resolve(config_path, config, overrides)
    }

    pub fn resolve(config_path: PathBuf, config: AppConfig, overrides: &Overrides) -> Result<Self> {
        let config_dir = config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let token_dir = overrides
            .access_tokens
            .clone()
            .or_else(|| config.access_tokens.clone())
            .unwrap_or_else(|| config_dir.join(TOKEN_DIR_NAME));

        let creds = overrides
            .creds
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDS_FILE));
        let creds_path = config_dir.join(creds);

        let lookahead = hours(
            "lookahead-hours",
            config.lookahead_hours.unwrap_or(DEFAULT_LOOKAHEAD_HOURS),
        )?;
        let urgency_horizon = hours(
            "urgency-hours",
            config.urgency_hours.unwrap_or(DEFAULT_URGENCY_HOURS),
        )?;

        let timeout_secs = config
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(AppError::Config(
                "request-timeout-secs must be greater than zero".to_string(),
            ));
        }
        let max_results = config.max_results.unwrap_or(DEFAULT_MAX_RESULTS);
        if max_results == 0 {
            return Err(AppError::Config(
                "max-results must be greater than zero".to_string(),
            ));
        }
        let markup = overrides.markup.or(config.markup).unwrap_or_default();

        Ok(Self {
            config_path,
            config,
            token_dir,
            creds_path,
            lookahead,
            urgency_horizon,
            request_timeout: std::time::Duration::from_secs(timeout_secs),
            max_results,
            markup,
        })
    }

    /// Credential references for the display flow. A config without the
    /// `auth-tokens` key is rejected; an empty list is fine.
    pub fn credentials(&self) -> Result<&[PathBuf]> {
        self.config.auth_tokens.as_deref().ok_or_else(|| {
            AppError::Config(format!(
                "auth-tokens is not set in {}, run `register` first",
                self.config_path.display()
            ))
        })
    }
}

pub fn default_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .ok_or_else(|| AppError::Config("unable to locate the user config directory".to_string()))
}

/// Creates `path` (and parents) with owner-only permissions if it is missing.
pub fn create_private_dir(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            return Err(AppError::Config(format!(
                "{} is not a directory",
                path.display()
            )));
        }
        return Ok(());
    }
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(path).map_err(|e| AppError::io(path, e))
}

/// Upper bound for either horizon: one hundred years.
const MAX_HOURS: f64 = 100.0 * 365.25 * 24.0;

fn hours(key: &str, value: f64) -> Result<Duration> {
    if !value.is_finite() || value <= 0.0 || value > MAX_HOURS {
        return Err(AppError::Config(format!(
            "{} must be a positive number of hours no larger than {}, got {}",
            key, MAX_HOURS, value
        )));
    }
    let millis = (value * 3_600_000.0).round() as i64;
    if millis <= 0 {
        return Err(AppError::Config(format!(
            "{} is too small to measure, got {}",
            key, value
        )));
    }
    Ok(Duration::milliseconds(millis))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILE_NAME);
        fs::write(&path, body).unwrap();
        path
    }

    fn overrides_for(path: &Path) -> Overrides {
        Overrides {
            config: Some(path.to_path_buf()),
            ..Overrides::default()
        }
    }

    #[test]
    fn defaults_resolve_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "auth-tokens = []\n");
        let settings = Settings::load(&overrides_for(&path), true).unwrap();

        assert_eq!(settings.token_dir, dir.path().join(TOKEN_DIR_NAME));
        assert_eq!(settings.creds_path, dir.path().join(DEFAULT_CREDS_FILE));
        assert_eq!(settings.lookahead, Duration::hours(24));
        assert_eq!(settings.urgency_horizon, Duration::hours(4));
        assert_eq!(settings.max_results, 30);
        assert_eq!(settings.markup, Markup::Pango);
        assert!(settings.credentials().unwrap().is_empty());
    }

    #[test]
    fn token_dir_prefers_flag_then_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "access-tokens = \"/from/config\"\n");

        let settings = Settings::load(&overrides_for(&path), true).unwrap();
        assert_eq!(settings.token_dir, PathBuf::from("/from/config"));

        let overrides = Overrides {
            access_tokens: Some(PathBuf::from("/from/flag")),
            ..overrides_for(&path)
        };
        let settings = Settings::load(&overrides, true).unwrap();
        assert_eq!(settings.token_dir, PathBuf::from("/from/flag"));
    }

    #[test]
    fn horizons_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            "auth-tokens = []\nlookahead-hours = 8\nurgency-hours = 1.5\nmarkup = \"plain\"\n",
        );
        let settings = Settings::load(&overrides_for(&path), true).unwrap();
        assert_eq!(settings.lookahead, Duration::hours(8));
        assert_eq!(settings.urgency_horizon, Duration::minutes(90));
        assert_eq!(settings.markup, Markup::Plain);
    }

    #[test]
    fn rejects_non_positive_thresholds() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "urgency-hours = 0\n");
        assert!(matches!(
            Settings::load(&overrides_for(&path), true),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn rejects_thresholds_outside_the_measurable_range() {
        let dir = tempfile::tempdir().unwrap();
        for body in [
            "lookahead-hours = 1e10\n",
            "urgency-hours = 1e-9\n",
            "lookahead-hours = 876601\n",
        ] {
            let path = write_config(dir.path(), body);
            assert!(
                matches!(Settings::load(&overrides_for(&path), true), Err(AppError::Config(_))),
                "{body} should be rejected"
            );
        }

        let path = write_config(dir.path(), "auth-tokens = []\nlookahead-hours = 876000\n");
        let settings = Settings::load(&overrides_for(&path), true).unwrap();
        assert_eq!(settings.lookahead, Duration::hours(876_000));
    }

    #[test]
    fn malformed_credential_list_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "auth-tokens = \"not-a-list\"\n");
        assert!(matches!(
            Settings::load(&overrides_for(&path), true),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn missing_file_is_fatal_only_when_required() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        assert!(Settings::load(&overrides_for(&path), true).is_err());

        let settings = Settings::load(&overrides_for(&path), false).unwrap();
        assert!(settings.credentials().is_err());
    }

    #[test]
    fn saved_config_keeps_appended_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let mut config = AppConfig::default();
        config.add_credential(PathBuf::from("/tokens/a"));
        config.add_credential(PathBuf::from("/tokens/b"));
        config.save(&path).unwrap();

        let loaded = AppConfig::from_file(&path).unwrap();
        assert_eq!(
            loaded.auth_tokens,
            Some(vec![PathBuf::from("/tokens/a"), PathBuf::from("/tokens/b")])
        );
    }

    #[cfg(unix)]
    #[test]
    fn private_dir_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join(APP_DIR);
        create_private_dir(&target).unwrap();
        let mode = fs::metadata(&target).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o700);
    }
}
