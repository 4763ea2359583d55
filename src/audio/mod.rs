pub mod probe;

use std::fmt;

use serde::Serialize;

use crate::error::ProbeError;

/// Normalized playback state of a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceState {
    Playing,
    Idle,
    /// The state could not be determined this cycle.
    Unknown,
}

impl DeviceState {
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceState::Playing => "playing",
            DeviceState::Idle => "idle",
            DeviceState::Unknown => "unknown",
        }
    }

    /// Playing and Idle are the only states that are ever reported.
    pub fn is_known(self) -> bool {
        !matches!(self, DeviceState::Unknown)
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert a pactl sink state keyword into a device state.
/// Anything other than RUNNING counts as idle (SUSPENDED, IDLE, ...).
fn from_sink_keyword(keyword: &str) -> DeviceState {
    match keyword {
        "RUNNING" => DeviceState::Playing,
        "IDLE" => DeviceState::Idle,
        _ => DeviceState::Idle,
    }
}

/// Find the sink matching `device` in `pactl list sinks short` output and
/// return its state.
///
/// Lines look like `0  alsa_output.pci  module-alsa-card.c  s16le 2ch 44100Hz  RUNNING`.
/// A line containing `device` is only used if it splits into at least six
/// whitespace-separated fields; the last one is the state keyword.
pub fn parse_sink_listing(output: &str, device: &str) -> Result<DeviceState, ProbeError> {
    output
        .lines()
        .filter(|line| line.contains(device))
        .map(|line| line.split_whitespace().collect::<Vec<_>>())
        .find(|fields| fields.len() >= 6)
        .and_then(|fields| fields.last().map(|state| from_sink_keyword(state)))
        .ok_or_else(|| ProbeError::DeviceNotFound(device.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
0\talsa_output.pci-0000_00_1f.3.analog-stereo\tmodule-alsa-card.c\ts16le 2ch 44100Hz\tSUSPENDED
1\talsa_output.usb-Schiit_Modi-00.analog-stereo\tmodule-alsa-card.c\ts24le 2ch 96000Hz\tRUNNING
2\tbluez_sink.00_1B_66_AA_BB_CC.a2dp_sink\tmodule-bluez5-device.c\ts16le 2ch 48000Hz\tIDLE
";

    #[test]
    fn running_sink_is_playing() {
        assert_eq!(
            parse_sink_listing(LISTING, "Schiit_Modi").unwrap(),
            DeviceState::Playing
        );
    }

    #[test]
    fn idle_and_other_keywords_are_idle() {
        assert_eq!(
            parse_sink_listing(LISTING, "bluez_sink").unwrap(),
            DeviceState::Idle
        );
        assert_eq!(
            parse_sink_listing(LISTING, "pci-0000_00_1f.3").unwrap(),
            DeviceState::Idle
        );
    }

    #[test]
    fn first_matching_line_wins() {
        assert_eq!(
            parse_sink_listing(LISTING, "alsa_output").unwrap(),
            DeviceState::Idle
        );
    }

    #[test]
    fn missing_device_is_not_found() {
        let err = parse_sink_listing(LISTING, "hdmi").unwrap_err();
        assert!(matches!(err, ProbeError::DeviceNotFound(ref d) if d == "hdmi"));

        assert!(matches!(
            parse_sink_listing("", "sink1"),
            Err(ProbeError::DeviceNotFound(_))
        ));
    }

    #[test]
    fn short_lines_are_skipped() {
        let output = "3 sink1 RUNNING\n4 sink1 module-null-sink.c float32le 2ch 48000Hz RUNNING\n";
        assert_eq!(parse_sink_listing(output, "sink1").unwrap(), DeviceState::Playing);

        assert!(matches!(
            parse_sink_listing("3 sink1 RUNNING\n", "sink1"),
            Err(ProbeError::DeviceNotFound(_))
        ));
    }

    #[test]
    fn state_serializes_lowercase() {
        assert_eq!(DeviceState::Playing.to_string(), "playing");
        assert_eq!(DeviceState::Idle.as_str(), "idle");
        assert!(!DeviceState::Unknown.is_known());
    }
}
