use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("SCAN_INTERVAL must be > 0")]
    ZeroInterval,
}

/// Why a probe could not produce a playing/idle reading.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("{program} timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("audio device {0} not found")]
    DeviceNotFound(String),
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("no supervisor token configured, refusing to send")]
    MissingCredential,

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}
