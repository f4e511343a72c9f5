//! Error types for the timer engine and its platform collaborators.
//!
//! None of these are fatal to a running timer: platform errors are logged
//! and swallowed at the point of use, selection errors are reported back to
//! the HTTP caller.

/// Failures reported by the platform services (audio, notifications, vibration).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    #[error("notification permission denied")]
    PermissionDenied,

    #[error("playback rejected: {0}")]
    PlaybackRejected(String),

    #[error("{0} is not supported on this host")]
    Unsupported(&'static str),

    #[error("command failed: {0}")]
    CommandFailed(String),
}

/// Reasons a duration selection update is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("hours must be between 0 and {max}, got {value}")]
    HoursOutOfRange { value: u32, max: u32 },

    #[error("minutes must be between 0 and {max}, got {value}")]
    MinutesOutOfRange { value: u32, max: u32 },

    #[error("the duration can only be changed while the timer is idle")]
    NotIdle,

    #[error("{0}")]
    State(String),
}
