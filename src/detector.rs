use crate::audio::DeviceState;

/// Whether `current` is a transition worth reporting.
///
/// `previous` is `None` until the first known state has been observed.
/// Unknown readings never report.
pub fn should_report(previous: Option<DeviceState>, current: DeviceState) -> bool {
    current.is_known() && previous != Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use DeviceState::*;

    #[test]
    fn first_known_state_is_reported() {
        assert!(should_report(None, Playing));
        assert!(should_report(None, Idle));
    }

    #[test]
    fn changes_between_known_states_are_reported() {
        assert!(should_report(Some(Idle), Playing));
        assert!(should_report(Some(Playing), Idle));
    }

    #[test]
    fn repeated_state_is_suppressed() {
        assert!(!should_report(Some(Playing), Playing));
        assert!(!should_report(Some(Idle), Idle));
    }

    #[test]
    fn unknown_never_reports() {
        for previous in [None, Some(Playing), Some(Idle), Some(Unknown)] {
            assert!(!should_report(previous, Unknown));
        }
    }
}
