//! Expiry alerts module
//! 
//! This module contains the sequencer that rings the alarm when a timer runs out.

pub mod sequencer;

// Re-export main types
pub use sequencer::{AlertSequencer, AlertTimings};
