use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, error, warn};

use crate::error::ProbeError;

use super::{DeviceState, parse_sink_listing};

pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Queries PulseAudio for the state of one sink by running
/// `pactl list sinks short`.
pub struct SinkProber {
    device: String,
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl SinkProber {
    pub fn new(device: impl Into<String>, pactl_path: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            program: pactl_path.into(),
            args: vec!["list".into(), "sinks".into(), "short".into()],
            timeout: PROBE_TIMEOUT,
        }
    }

    /// Replace the listing command entirely.
    #[cfg(test)]
    pub fn with_command<I, S>(mut self, program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.program = program.into();
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    #[cfg(test)]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Probe the sink. Every failure resolves to `DeviceState::Unknown`.
    pub async fn probe(&self) -> DeviceState {
        match self.try_probe().await {
            Ok(state) => {
                debug!("Sink {} is {}", self.device, state);
                state
            }
            Err(e @ ProbeError::DeviceNotFound(_)) => {
                warn!("{}", e);
                DeviceState::Unknown
            }
            Err(e) => {
                error!("Error getting audio state: {}", e);
                DeviceState::Unknown
            }
        }
    }

    async fn try_probe(&self) -> Result<DeviceState, ProbeError> {
        let stdout = self.list_sinks().await?;
        parse_sink_listing(&stdout, &self.device)
    }

    async fn list_sinks(&self) -> Result<String, ProbeError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| ProbeError::Timeout {
                program: self.program.clone(),
                timeout: self.timeout,
            })?
            .map_err(|source| ProbeError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // pactl can exit non-zero and still print a usable listing.
        if !output.status.success() {
            warn!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scripted(device: &str, script: &str) -> SinkProber {
        SinkProber::new(device, "pactl").with_command("sh", ["-c", script])
    }

    #[tokio::test]
    async fn running_line_probes_as_playing() {
        let prober = scripted(
            "sink1",
            "printf '0\\tsink1\\tmodule-null-sink.c\\ts16le 2ch 44100Hz\\tRUNNING\\n'",
        );
        assert_eq!(prober.probe().await, DeviceState::Playing);
    }

    #[tokio::test]
    async fn idle_line_probes_as_idle() {
        let prober = scripted(
            "sink1",
            "printf '0\\tsink1\\tmodule-null-sink.c\\ts16le 2ch 44100Hz\\tIDLE\\n'",
        );
        assert_eq!(prober.probe().await, DeviceState::Idle);
    }

    #[tokio::test]
    async fn unmatched_device_is_unknown() {
        let prober = scripted(
            "sink2",
            "printf '0\\tsink1\\tmodule-null-sink.c\\ts16le 2ch 44100Hz\\tRUNNING\\n'",
        );
        assert_eq!(prober.probe().await, DeviceState::Unknown);
    }

    #[tokio::test]
    async fn hung_command_times_out_as_unknown() {
        let prober = scripted("sink1", "sleep 10").with_timeout(Duration::from_millis(200));

        let started = std::time::Instant::now();
        assert_eq!(prober.probe().await, DeviceState::Unknown);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn missing_program_is_unknown() {
        let prober = SinkProber::new("sink1", "/nonexistent/pactl");
        assert_eq!(prober.probe().await, DeviceState::Unknown);

        let err = prober.try_probe().await.unwrap_err();
        assert!(matches!(err, ProbeError::Spawn { .. }));
    }

    #[tokio::test]
    async fn listing_is_parsed_despite_non_zero_exit() {
        let prober = scripted(
            "sink1",
            "printf '0\\tsink1\\tmodule-null-sink.c\\ts16le 2ch 44100Hz\\tRUNNING\\n'; \
             exit 1",
        );
        assert_eq!(prober.probe().await, DeviceState::Playing);
    }

    #[tokio::test]
    async fn failing_command_without_listing_is_unknown() {
        let prober = scripted("sink1", "echo 'Connection failure' >&2; exit 1");
        assert!(matches!(
            prober.try_probe().await,
            Err(ProbeError::DeviceNotFound(ref d)) if d == "sink1"
        ));
        assert_eq!(prober.probe().await, DeviceState::Unknown);
    }
}
