//! Timer session state and its transitions
//!
//! ```text
//!          start(minutes > 0)          tick(0)
//!  Idle ─────────────────────► Running ───────► Completed
//!   ▲                            │                  │
//!   │      cancel confirmed      │                  │
//!   ├────────────────────────────┘                  │
//!   │            alert sequence complete            │
//!   └───────────────────────────────────────────────┘
//!   ▲
//!   └── reset() from any state
//! ```
//!
//! Everything here is pure bookkeeping. Side effects (the countdown task,
//! audio, notifications) are driven by [`AppState`](super::AppState) based on
//! the outcomes these methods return.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimerStatus {
    Idle,
    Running,
    Completed,
}

/// Result of feeding a countdown sample into the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running, or the sample belongs to an earlier session
    Ignored,
    Updated,
    /// Remaining time reached zero. Returned once per session.
    Expired,
}

/// What a cancel request should lead to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelRequest {
    /// A running timer is never dropped without confirmation
    AwaitingConfirmation,
    /// Nothing is running, reset right away
    ResetNow,
}

/// The single timer session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSession {
    pub status: TimerStatus,
    /// Epoch milliseconds at which the timer expires. Set only while running.
    pub target_instant_ms: Option<i64>,
    pub remaining_seconds: u64,
    /// Alarm rings played so far while completed
    pub ring_count: u32,
    pub pending_cancel_confirmation: bool,
    /// Bumped on every start. Countdown samples and alert callbacks carry the
    /// id they were started for.
    pub session_id: u64,
}

impl TimerSession {
    pub fn new() -> Self {
        Self {
            status: TimerStatus::Idle,
            target_instant_ms: None,
            remaining_seconds: 0,
            ring_count: 0,
            pending_cancel_confirmation: false,
            session_id: 0,
        }
    }

    /// Start counting down `total_minutes` from `now_ms`, returning the
    /// target instant.
    ///
    /// Returns `None` and leaves the session untouched when not idle or when
    /// the duration is zero.
    pub fn start(&mut self, total_minutes: u32, now_ms: i64) -> Option<i64> {
        if self.status != TimerStatus::Idle || total_minutes == 0 {
            return None;
        }

        let target_ms = now_ms + i64::from(total_minutes) * 60_000;
        self.session_id += 1;
        self.status = TimerStatus::Running;
        self.target_instant_ms = Some(target_ms);
        self.remaining_seconds = u64::from(total_minutes) * 60;
        self.ring_count = 0;
        self.pending_cancel_confirmation = false;
        Some(target_ms)
    }

    pub fn tick(&mut self, session_id: u64, remaining_seconds: u64) -> TickOutcome {
        if self.status != TimerStatus::Running || session_id != self.session_id {
            return TickOutcome::Ignored;
        }

        self.remaining_seconds = remaining_seconds;
        if remaining_seconds > 0 {
            return TickOutcome::Updated;
        }

        self.status = TimerStatus::Completed;
        self.target_instant_ms = None;
        self.pending_cancel_confirmation = false;
        TickOutcome::Expired
    }

    /// Mirror the alert sequencer's ring counter
    pub fn record_ring(&mut self, session_id: u64, ring: u32) -> bool {
        if self.status != TimerStatus::Completed || session_id != self.session_id {
            return false;
        }
        self.ring_count = ring;
        true
    }

    pub fn request_cancel(&mut self) -> CancelRequest {
        if self.status == TimerStatus::Running {
            self.pending_cancel_confirmation = true;
            CancelRequest::AwaitingConfirmation
        } else {
            CancelRequest::ResetNow
        }
    }

    /// Close the confirmation prompt, returning whether one was open
    pub fn clear_cancel_confirmation(&mut self) -> bool {
        std::mem::replace(&mut self.pending_cancel_confirmation, false)
    }

    /// Back to idle defaults. The session id survives so stale samples stay stale.
    pub fn reset(&mut self) {
        *self = Self {
            session_id: self.session_id,
            ..Self::new()
        };
    }
}

impl Default for TimerSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Format seconds the way the timer face shows them: `HH:MM:SS` once there
/// are hours to show, `MM:SS` otherwise
pub fn format_remaining(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(minutes: u32, now_ms: i64) -> TimerSession {
        let mut session = TimerSession::new();
        assert!(session.start(minutes, now_ms).is_some());
        session
    }

    #[test]
    fn start_sets_target_and_remaining() {
        let session = running(25, 0);
        assert_eq!(session.status, TimerStatus::Running);
        assert_eq!(session.target_instant_ms, Some(1_500_000));
        assert_eq!(session.remaining_seconds, 1500);
        assert_eq!(session.session_id, 1);
    }

    #[test]
    fn zero_minutes_is_ignored() {
        let mut session = TimerSession::new();
        assert_eq!(session.start(0, 1_000), None);
        assert_eq!(session, TimerSession::new());
    }

    #[test]
    fn start_only_from_idle() {
        let mut session = running(5, 0);
        let before = session.clone();
        assert_eq!(session.start(10, 50_000), None);
        assert_eq!(session, before);
    }

    #[test]
    fn expiry_fires_exactly_once() {
        let mut session = running(1, 0);
        let id = session.session_id;

        assert_eq!(session.tick(id, 1), TickOutcome::Updated);
        assert_eq!(session.tick(id, 0), TickOutcome::Expired);
        assert_eq!(session.status, TimerStatus::Completed);
        assert_eq!(session.target_instant_ms, None);

        assert_eq!(session.tick(id, 0), TickOutcome::Ignored);
        assert_eq!(session.tick(id, 0), TickOutcome::Ignored);
        assert_eq!(session.status, TimerStatus::Completed);
    }

    #[test]
    fn ticks_from_another_session_are_ignored() {
        let mut session = running(1, 0);
        let stale = session.session_id;
        session.reset();
        assert_eq!(session.start(2, 10_000), Some(130_000));

        assert_eq!(session.tick(stale, 0), TickOutcome::Ignored);
        assert_eq!(session.status, TimerStatus::Running);
        assert_eq!(session.remaining_seconds, 120);
    }

    #[test]
    fn tick_after_reset_is_ignored() {
        let mut session = running(1, 0);
        let id = session.session_id;
        session.reset();

        assert_eq!(session.tick(id, 30), TickOutcome::Ignored);
        assert_eq!(session.remaining_seconds, 0);
    }

    #[test]
    fn rings_only_count_while_completed() {
        let mut session = running(1, 0);
        let id = session.session_id;
        assert!(!session.record_ring(id, 1));

        session.tick(id, 0);
        assert!(session.record_ring(id, 1));
        assert!(session.record_ring(id, 2));
        assert_eq!(session.ring_count, 2);
        assert!(!session.record_ring(id + 1, 3));
    }

    #[test]
    fn reset_yields_identical_state_from_every_status() {
        let mut idle = TimerSession::new();
        idle.reset();

        let mut active = running(3, 0);
        active.request_cancel();
        active.reset();

        let mut completed = running(3, 0);
        completed.tick(1, 0);
        completed.record_ring(1, 2);
        completed.reset();

        for session in [&active, &completed] {
            assert_eq!(session.status, TimerStatus::Idle);
            assert_eq!(session.target_instant_ms, None);
            assert_eq!(session.remaining_seconds, 0);
            assert_eq!(session.ring_count, 0);
            assert!(!session.pending_cancel_confirmation);
        }
        assert_eq!(active, completed);
        assert_eq!(idle.status, active.status);
    }

    #[test]
    fn cancel_needs_confirmation_only_while_running() {
        let mut session = TimerSession::new();
        assert_eq!(session.request_cancel(), CancelRequest::ResetNow);
        assert!(!session.pending_cancel_confirmation);

        let mut session = running(10, 0);
        assert_eq!(session.request_cancel(), CancelRequest::AwaitingConfirmation);
        assert!(session.pending_cancel_confirmation);

        assert!(session.clear_cancel_confirmation());
        assert!(!session.clear_cancel_confirmation());
        assert_eq!(session.status, TimerStatus::Running);
    }

    #[test]
    fn expiry_closes_the_confirmation_prompt() {
        let mut session = running(1, 0);
        session.request_cancel();
        session.tick(1, 0);
        assert!(!session.pending_cancel_confirmation);
    }

    #[test]
    fn formats_like_the_timer_face() {
        assert_eq!(format_remaining(0), "00:00");
        assert_eq!(format_remaining(1500), "25:00");
        assert_eq!(format_remaining(59), "00:59");
        assert_eq!(format_remaining(3661), "01:01:01");
    }
}
