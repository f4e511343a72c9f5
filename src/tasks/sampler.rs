//! Countdown sampler
//!
//! Runs on its own task so its cadence does not depend on request handling.
//! Every sample recomputes the remaining time from the fixed target instant;
//! a late or skipped sample therefore never shifts the expiry.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tracing::debug;

use crate::services::Clock;

/// Messages from the sampler to its consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerEvent {
    Tick { remaining_seconds: u64 },
    /// Sent once, after the tick that reached zero. Nothing follows it.
    Expired,
}

/// Whole seconds left until `target_ms`, rounded up and clamped at zero
pub fn remaining_seconds(target_ms: i64, now_ms: i64) -> u64 {
    let diff = target_ms - now_ms;
    if diff <= 0 {
        0
    } else {
        ((diff + 999) / 1000) as u64
    }
}

/// Handle to a running sampler task. Dropping it stops the sampler.
#[derive(Debug)]
pub struct CountdownSampler {
    task: JoinHandle<()>,
}

impl CountdownSampler {
    /// Start sampling towards `target_ms` every `period`
    pub fn spawn(
        target_ms: i64,
        period: Duration,
        clock: Arc<dyn Clock>,
    ) -> (Self, mpsc::UnboundedReceiver<SamplerEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(sample(target_ms, period, clock, events_tx));
        (Self { task }, events_rx)
    }

    pub fn stop(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for CountdownSampler {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn sample(
    target_ms: i64,
    period: Duration,
    clock: Arc<dyn Clock>,
    events: mpsc::UnboundedSender<SamplerEvent>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        let remaining = remaining_seconds(target_ms, clock.now_ms());
        if events.send(SamplerEvent::Tick { remaining_seconds: remaining }).is_err() {
            debug!("Countdown consumer went away, stopping sampler");
            return;
        }

        if remaining == 0 {
            let _ = events.send(SamplerEvent::Expired);
            debug!("Countdown reached zero, sampler finished");
            return;
        }
    }
}
