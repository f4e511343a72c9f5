//! Background tasks module
//! 
//! This module contains the countdown tasks that run alongside the HTTP server.

pub mod countdown;
pub mod sampler;

// Re-export main items
pub use countdown::countdown_task;
pub use sampler::{remaining_seconds, CountdownSampler, SamplerEvent};
