//! State management module
//! 
//! This module contains the timer session, the duration selection and the
//! state machine that ties them to the countdown and alert tasks.

pub mod app_state;
pub mod cancel_guard;
pub mod selection;
pub mod session;
pub mod snapshot;

// Re-export main types
pub use app_state::{AppState, Platform};
pub use cancel_guard::CancelGuard;
pub use selection::DurationSelection;
pub use session::{format_remaining, CancelRequest, TickOutcome, TimerSession, TimerStatus};
pub use snapshot::TimerSnapshot;
