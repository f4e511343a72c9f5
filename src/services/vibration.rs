//! Vibration motor access

use tracing::debug;

use crate::error::PlatformError;

pub trait Vibrator: Send + Sync {
    /// Alternating on/off durations in milliseconds, starting with "on"
    fn vibrate(&self, pattern: &[u64]) -> Result<(), PlatformError>;
}

/// For hosts without a vibration motor
#[derive(Debug, Default, Clone, Copy)]
pub struct NoVibration;

impl Vibrator for NoVibration {
    fn vibrate(&self, pattern: &[u64]) -> Result<(), PlatformError> {
        debug!("Skipping vibration pattern {:?}", pattern);
        Err(PlatformError::Unsupported("vibration"))
    }
}
