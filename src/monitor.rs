use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use tracing::{error, info, warn};

use crate::audio::DeviceState;
use crate::audio::probe::SinkProber;
use crate::detector::should_report;
use crate::events::DeliveryOutcome;
use crate::events::publisher::EventPublisher;

/// Source of device state readings.
pub trait StateProbe {
    async fn probe(&self) -> DeviceState;
}

/// Destination for state-change events.
pub trait EventSink {
    async fn publish(&self, state: DeviceState) -> DeliveryOutcome;
}

impl StateProbe for SinkProber {
    async fn probe(&self) -> DeviceState {
        SinkProber::probe(self).await
    }
}

impl EventSink for EventPublisher {
    async fn publish(&self, state: DeviceState) -> DeliveryOutcome {
        EventPublisher::publish(self, state).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Running,
    Stopped,
}

/// Drives probe -> detect -> publish at a fixed delay until shut down.
pub struct Monitor<P, S> {
    prober: P,
    sink: S,
    interval: Duration,
    last_state: Option<DeviceState>,
    state: MonitorState,
}

impl<P: StateProbe, S: EventSink> Monitor<P, S> {
    pub fn new(prober: P, sink: S, interval: Duration) -> Self {
        Self {
            prober,
            sink,
            interval,
            last_state: None,
            state: MonitorState::Running,
        }
    }

    /// Last state that was reported (or attempted). Unknown readings never land here.
    pub fn last_state(&self) -> Option<DeviceState> {
        self.last_state
    }

    /// Run a single cycle. Returns the delivery outcome when a transition was
    /// published, `None` when nothing changed.
    ///
    /// The last state advances after every publish attempt, delivered or not.
    pub async fn tick(&mut self) -> Option<DeliveryOutcome> {
        let current = self.prober.probe().await;
        if !should_report(self.last_state, current) {
            return None;
        }

        info!(
            "State changed: {} -> {}",
            self.last_state.map_or("none", DeviceState::as_str),
            current
        );
        let outcome = self.sink.publish(current).await;
        match &outcome {
            DeliveryOutcome::Delivered => {}
            DeliveryOutcome::Rejected(code) => {
                warn!("Event for {} rejected with HTTP {}, not retrying", current, code);
            }
            DeliveryOutcome::Failed(e) => {
                warn!("Event for {} not delivered ({}), not retrying", current, e);
            }
        }
        self.last_state = Some(current);
        Some(outcome)
    }

    /// Loop until `shutdown` resolves. A panicking cycle is logged and the
    /// loop carries on after the normal interval. Shutdown is observed
    /// between cycles, so an in-flight cycle always completes.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);

        while self.state == MonitorState::Running {
            if let Err(panic) = AssertUnwindSafe(self.tick()).catch_unwind().await {
                error!("Unexpected error: {}", panic_message(&*panic));
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = &mut shutdown => {
                    self.state = MonitorState::Stopped;
                }
            }
        }

        info!(
            "Shutting down... (last state: {})",
            self.last_state().map_or("none", DeviceState::as_str)
        );
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("cycle panicked")
}
