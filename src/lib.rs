//! Stove Timer - A countdown timer service that reminds you to check the stove
//! 
//! This library provides the timer state machine, a drift-free countdown,
//! the alarm sequence that runs on expiry, and the HTTP API driving them.

pub mod alerts;
pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, Platform};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
