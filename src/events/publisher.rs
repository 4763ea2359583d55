use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, error};

use crate::audio::DeviceState;
use crate::config::{Config, Token};
use crate::error::PublishError;

use super::{DeliveryOutcome, EventPayload};

pub const PUBLISH_TIMEOUT: Duration = Duration::from_secs(5);

/// Fires state-change events at the supervisor events API.
///
/// One POST per call, no retries.
pub struct EventPublisher {
    client: Client,
    endpoint: String,
    event_type: String,
    device: String,
    token: Option<Token>,
}

impl EventPublisher {
    pub fn new(config: &Config) -> Result<Self, PublishError> {
        Self::with_timeout(config, PUBLISH_TIMEOUT)
    }

    pub fn with_timeout(config: &Config, timeout: Duration) -> Result<Self, PublishError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(PublishError::Client)?;

        Ok(Self {
            client,
            endpoint: config.event_endpoint(),
            event_type: config.event_name.clone(),
            device: config.device.clone(),
            token: config.token.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn publish(&self, state: DeviceState) -> DeliveryOutcome {
        match self.try_publish(state).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Error firing event: {}", e);
                DeliveryOutcome::Failed(e)
            }
        }
    }

    async fn try_publish(&self, state: DeviceState) -> Result<DeliveryOutcome, PublishError> {
        let token = self.token.as_ref().ok_or(PublishError::MissingCredential)?;

        let payload = EventPayload {
            event_type: &self.event_type,
            state,
            device: &self.device,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token.expose())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if matches!(status, StatusCode::OK | StatusCode::CREATED) {
            debug!("Event fired: {}", state);
            return Ok(DeliveryOutcome::Delivered);
        }

        let body = response.text().await.unwrap_or_default();
        error!("Failed to fire event: HTTP {} {}", status.as_u16(), body.trim());
        Ok(DeliveryOutcome::Rejected(status.as_u16()))
    }
}
