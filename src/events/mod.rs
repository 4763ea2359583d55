pub mod publisher;

use serde::Serialize;

use crate::audio::DeviceState;
use crate::error::PublishError;

/// Body of a state-change event.
#[derive(Debug, Serialize)]
pub struct EventPayload<'a> {
    pub event_type: &'a str,
    pub state: DeviceState,
    pub device: &'a str,
}

/// Result of a single delivery attempt.
#[derive(Debug)]
pub enum DeliveryOutcome {
    Delivered,
    /// The endpoint answered with a status other than 200/201.
    Rejected(u16),
    Failed(PublishError),
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered)
    }
}
