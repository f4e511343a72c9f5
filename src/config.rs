//! Configuration and CLI argument handling

use std::time::Duration;

use clap::Parser;

use crate::alerts::AlertTimings;
use crate::services::SoundConfig;

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "stove-timer")]
#[command(about = "A countdown timer service that reminds you to check the stove")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// How often the countdown re-samples the clock, in milliseconds
    #[arg(long, default_value = "250")]
    pub tick_interval_ms: u64,

    /// Number of alarm rings before the timer resets itself
    #[arg(long, default_value = "3")]
    pub rings: u32,

    /// Pause between two rings, in milliseconds
    #[arg(long, default_value = "2000")]
    pub ring_pause_ms: u64,

    /// Pause after the last ring before resetting, in milliseconds
    #[arg(long, default_value = "1000")]
    pub final_pause_ms: u64,

    /// Alarm sound played on expiry
    #[arg(long, default_value = "/usr/share/sounds/freedesktop/stereo/alarm-clock-elapsed.oga")]
    pub alarm_sound: String,

    /// Quiet clip looped while a timer runs to keep the audio device awake
    #[arg(long)]
    pub keep_alive_sound: Option<String>,

    /// Program used to play sound files
    #[arg(long, default_value = "paplay")]
    pub player: String,

    /// Largest selectable number of hours
    #[arg(long, default_value = "12", value_parser = clap::value_parser!(u32).range(0..=99))]
    pub max_hours: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn tick_interval(&self) -> Duration {
        // A zero period would make tokio's interval panic
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn alert_timings(&self) -> AlertTimings {
        AlertTimings {
            rings: self.rings.max(1),
            ring_pause: Duration::from_millis(self.ring_pause_ms),
            final_pause: Duration::from_millis(self.final_pause_ms),
            ..AlertTimings::default()
        }
    }

    pub fn sounds(&self) -> SoundConfig {
        SoundConfig {
            alarm: self.alarm_sound.clone(),
            keep_alive: self.keep_alive_sound.clone(),
        }
    }
}
