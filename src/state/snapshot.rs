//! Read-only view of the timer published to clients

use serde::{Deserialize, Serialize};

use super::{format_remaining, DurationSelection, TimerSession};
use crate::services::AudioRole;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    #[serde(flatten)]
    pub session: TimerSession,
    pub selection: DurationSelection,
    pub total_selected_minutes: u32,
    /// Remaining time as shown on the timer face
    pub display: String,
    pub audio: AudioRole,
}

impl TimerSnapshot {
    pub fn new(session: TimerSession, selection: DurationSelection, audio: AudioRole) -> Self {
        Self {
            display: format_remaining(session.remaining_seconds),
            total_selected_minutes: selection.total_minutes(),
            session,
            selection,
            audio,
        }
    }
}

impl Default for TimerSnapshot {
    fn default() -> Self {
        Self::new(TimerSession::new(), DurationSelection::default(), AudioRole::Silent)
    }
}
