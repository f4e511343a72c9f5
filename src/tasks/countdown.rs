//! Countdown consumer task

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error};

use super::sampler::SamplerEvent;
use crate::state::AppState;

/// Feed sampler events into the timer state machine.
///
/// This is the only consumer of a sampler's channel. It ends once the
/// sampler stops and the channel drains.
pub async fn countdown_task(
    state: Arc<AppState>,
    session_id: u64,
    mut events: mpsc::UnboundedReceiver<SamplerEvent>,
) {
    debug!("Starting countdown task for session {}", session_id);

    while let Some(event) = events.recv().await {
        let result = match event {
            SamplerEvent::Tick { remaining_seconds } => state.tick(session_id, remaining_seconds),
            SamplerEvent::Expired => state.expire(session_id),
        };

        if let Err(e) = result {
            error!("Failed to apply countdown event {:?}: {}", event, e);
        }
    }

    debug!("Countdown task for session {} finished", session_id);
}
