//! Two-step confirmation before a running timer is thrown away

use super::AppState;

/// The confirm/abort prompt for a pending cancel request.
///
/// Only handed out by [`AppState::cancel_guard`] while a confirmation is
/// pending. It borrows the state machine and holds nothing else, so callers
/// fetch a fresh one whenever they need it.
pub struct CancelGuard<'a> {
    state: &'a AppState,
}

impl<'a> CancelGuard<'a> {
    pub(super) fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Close the prompt and reset the timer
    pub fn confirm(self) -> Result<bool, String> {
        self.state.confirm_cancel()
    }

    /// Close the prompt and keep the timer running
    pub fn abort(self) -> Result<bool, String> {
        self.state.abort_cancel()
    }
}
