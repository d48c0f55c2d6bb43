use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use url::Url;

use crate::error::ClientError;

pub const DEFAULT_SETTINGS_FILE: &str = "phishguard.toml";
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    /// `0` disables the per-request timeout.
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    base_url: Option<String>,
    request_timeout_secs: Option<u64>,
}

/// Loads settings from defaults, the settings file, then the process environment.
///
/// When `path` is `None` the default file is read if present. An explicitly
/// named file must exist.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ClientError> {
    load_settings_with_env(path, |key| std::env::var(key).ok())
}

pub fn load_settings_with_env(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Settings, ClientError> {
    let mut settings = Settings::default();

    let file_cfg = match path {
        Some(path) => read_settings_file(path)?
            .ok_or_else(|| settings_error(path, "file not found"))?,
        None => read_settings_file(Path::new(DEFAULT_SETTINGS_FILE))?.unwrap_or_default(),
    };
    if let Some(v) = file_cfg.base_url {
        settings.base_url = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }

    if let Some(v) = env("PHISHGUARD_BASE_URL") {
        settings.base_url = v;
    }
    if let Some(v) = env("APP__BASE_URL") {
        settings.base_url = v;
    }

    for key in [
        "PHISHGUARD_REQUEST_TIMEOUT_SECS",
        "APP__REQUEST_TIMEOUT_SECS",
    ] {
        if let Some(v) = env(key) {
            match v.trim().parse::<u64>() {
                Ok(parsed) => settings.request_timeout_secs = parsed,
                Err(_) => tracing::warn!(key, value = %v, "ignoring non-numeric timeout override"),
            }
        }
    }

    settings.base_url = normalize_base_url(&settings.base_url)?;
    Ok(settings)
}

fn read_settings_file(path: &Path) -> Result<Option<FileSettings>, ClientError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(settings_error(path, err.to_string())),
    };
    toml::from_str(&raw)
        .map(Some)
        .map_err(|err| settings_error(path, err.to_string()))
}

fn settings_error(path: &Path, reason: impl Into<String>) -> ClientError {
    ClientError::Settings {
        path: PathBuf::from(path),
        reason: reason.into(),
    }
}

/// Validates a service base url and strips trailing slashes so paths can be appended.
pub fn normalize_base_url(raw: &str) -> Result<String, ClientError> {
    let trimmed = raw.trim();
    let invalid = |reason: &str| ClientError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    let parsed = Url::parse(trimmed).map_err(|err| invalid(&err.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if parsed.host_str().is_none() {
        return Err(invalid("missing host"));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(invalid("query strings and fragments are not supported"));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
