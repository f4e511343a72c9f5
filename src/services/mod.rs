//! Platform services module
//! 
//! This module contains the collaborators the timer engine talks to:
//! the clock, audio output, notifications and vibration.

pub mod audio;
pub mod clock;
pub mod notification;
pub mod system;
pub mod vibration;

// Re-export main types
pub use audio::{AudioBackend, AudioChannel, AudioRole, CommandAudio, Playback, SoundConfig};
pub use clock::{Clock, ManualClock, SystemClock};
pub use notification::{DesktopNotifier, Notification, Notifier, Permission};
pub use system::check_command_available;
pub use vibration::{NoVibration, Vibrator};
