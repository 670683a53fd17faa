use std::{fs, io::ErrorKind, path::Path, time::Duration};

use anyhow::{bail, Context};
use serde::Deserialize;
use url::Url;

const DEFAULT_CONFIG_FILE: &str = "documind.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    pub log_filter: String,
    pub register_redirect_delay_ms: u64,
    pub transcript_window: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".into(),
            log_filter: "warn".into(),
            register_redirect_delay_ms: 2000,
            transcript_window: 20,
        }
    }
}

impl Settings {
    pub fn register_redirect_delay(&self) -> Duration {
        Duration::from_millis(self.register_redirect_delay_ms)
    }
}

/// Defaults, then `documind.toml` (or `config_path`), then environment.
/// A missing default file is fine; a missing explicit file is an error.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => toml::from_str::<Settings>(&raw)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?,
        Err(err) if err.kind() == ErrorKind::NotFound && config_path.is_none() => {
            Settings::default()
        }
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    };

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("DOCUMIND_BASE_URL") {
        settings.base_url = v;
    }
    if let Some(v) = lookup("APP__BASE_URL") {
        settings.base_url = v;
    }

    if let Some(v) = lookup("DOCUMIND_LOG") {
        settings.log_filter = v;
    }

    if let Some(v) = lookup("APP__REGISTER_REDIRECT_DELAY_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.register_redirect_delay_ms = parsed;
        }
    }
    if let Some(v) = lookup("APP__TRANSCRIPT_WINDOW") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.transcript_window = parsed;
        }
    }
}

pub fn normalize_base_url(raw_base_url: &str) -> anyhow::Result<String> {
    let raw_base_url = raw_base_url.trim();
    if raw_base_url.is_empty() {
        return Ok(Settings::default().base_url);
    }

    let candidate = if raw_base_url.contains("://") {
        raw_base_url.to_string()
    } else {
        format!("http://{raw_base_url}")
    };

    let parsed = Url::parse(&candidate)
        .with_context(|| format!("invalid backend url '{raw_base_url}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("unsupported backend url scheme '{}'", parsed.scheme());
    }
    if parsed.host_str().is_none() {
        bail!("backend url '{raw_base_url}' has no host");
    }

    Ok(candidate.trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
