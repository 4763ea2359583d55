use std::env;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://supervisor/core";
pub const DEFAULT_TOKEN_FILE: &str = "/run/secrets/supervisor_token";

#[derive(Debug, Clone)]
pub struct Config {
    /// Substring identifying the sink in `pactl list sinks short`.
    pub device: String,
    pub scan_interval_secs: u64,
    pub event_name: String,
    pub api_url: String,
    pub token: Option<Token>,
    pub pactl_path: String,
}

/// Bearer credential for the event endpoint. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<String, ConfigError> {
    let value = lookup(key).ok_or(ConfigError::Missing(key))?;
    if value.trim().is_empty() {
        return Err(ConfigError::Empty(key));
    }
    Ok(value)
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.is_empty())
}

fn or_default<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key/value source.
    pub fn from_source(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token_file = optional(&lookup, "SUPERVISOR_TOKEN_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_FILE));

        let config = Self {
            device: required(&lookup, "AUDIO_DEVICE")?,
            scan_interval_secs: or_default(&lookup, "SCAN_INTERVAL", 3),
            event_name: or_default(&lookup, "EVENT_NAME", "audio_state_changed".to_string()),
            api_url: or_default(&lookup, "SUPERVISOR_API_URL", DEFAULT_API_URL.to_string()),
            token: resolve_token(lookup("SUPERVISOR_TOKEN"), &token_file),
            pactl_path: or_default(&lookup, "PACTL_PATH", "pactl".to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.scan_interval_secs == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.event_name.trim().is_empty() {
            return Err(ConfigError::Empty("EVENT_NAME"));
        }
        Ok(())
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }

    /// Full URL events are posted to: `{api_url}/api/events/{event_name}`.
    pub fn event_endpoint(&self) -> String {
        format!(
            "{}/api/events/{}",
            self.api_url.trim_end_matches('/'),
            self.event_name
        )
    }
}

/// Resolve the bearer token: environment value first, then the mounted secret file.
pub fn resolve_token(env_value: Option<String>, secret_file: &Path) -> Option<Token> {
    if let Some(value) = env_value {
        let value = value.trim();
        if !value.is_empty() {
            return Some(Token::new(value));
        }
    }

    match std::fs::read_to_string(secret_file) {
        Ok(content) => {
            let content = content.trim();
            (!content.is_empty()).then(|| Token::new(content))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => {
            warn!("Failed to read token file {}: {}", secret_file.display(), e);
            None
        }
    }
}
