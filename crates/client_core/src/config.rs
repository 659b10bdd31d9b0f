use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "viewer.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub server_url: String,
    /// Transport-level request timeout. `None` leaves reqwest's default (no timeout).
    pub request_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            request_timeout_secs: None,
        }
    }
}

impl Settings {
    /// Applies command-line flags, the last and strongest layer.
    pub fn apply_cli_overrides(
        &mut self,
        server_url: Option<String>,
        request_timeout_secs: Option<u64>,
    ) {
        if let Some(server_url) = server_url {
            self.server_url = server_url;
        }
        if let Some(secs) = request_timeout_secs {
            self.request_timeout_secs = Some(secs);
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

/// Defaults, then the config file at `path` when it exists, then environment.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        apply_file_overrides(&mut settings, &raw);
    }
    apply_env_overrides(&mut settings, env);

    settings
}

fn apply_file_overrides(settings: &mut Settings, raw: &str) {
    let table = match toml::from_str::<toml::Table>(raw) {
        Ok(table) => table,
        Err(err) => {
            warn!("ignoring unreadable viewer config: {err}");
            return;
        }
    };

    if let Some(v) = table.get("server_url").and_then(toml::Value::as_str) {
        settings.server_url = v.to_string();
    }

    match table.get("request_timeout_secs") {
        Some(toml::Value::Integer(secs)) => match u64::try_from(*secs) {
            Ok(secs) => settings.request_timeout_secs = Some(secs),
            Err(_) => warn!(value = secs, "ignoring negative request_timeout_secs"),
        },
        Some(toml::Value::String(raw)) => apply_timeout(settings, raw),
        Some(other) => warn!(value = %other, "ignoring non-numeric request_timeout_secs"),
        None => {}
    }
}

fn apply_env_overrides(settings: &mut Settings, env: impl Fn(&str) -> Option<String>) {
    if let Some(v) = env("API_BASE_URL") {
        settings.server_url = v;
    }
    if let Some(v) = env("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        apply_timeout(settings, &v);
    }
}

fn apply_timeout(settings: &mut Settings, raw: &str) {
    match raw.trim().parse::<u64>() {
        Ok(secs) => settings.request_timeout_secs = Some(secs),
        Err(err) => warn!(value = raw, "ignoring invalid request timeout: {err}"),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
