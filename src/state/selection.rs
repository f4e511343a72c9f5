//! Duration picked by the user before starting

use serde::{Deserialize, Serialize};

use crate::error::SelectionError;

/// The minutes wheel offers 0 through 60
pub const MAX_MINUTES: u32 = 60;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationSelection {
    pub hours: u32,
    pub minutes: u32,
    /// Whether the hours wheel is shown at all
    pub show_hours: bool,
}

impl DurationSelection {
    pub fn total_minutes(&self) -> u32 {
        self.hours.saturating_mul(60).saturating_add(self.minutes)
    }

    /// Update either wheel. Nothing changes unless both values are in range.
    pub fn set(&mut self, hours: Option<u32>, minutes: Option<u32>, max_hours: u32) -> Result<(), SelectionError> {
        if let Some(value) = hours {
            if value > max_hours {
                return Err(SelectionError::HoursOutOfRange { value, max: max_hours });
            }
        }
        if let Some(value) = minutes {
            if value > MAX_MINUTES {
                return Err(SelectionError::MinutesOutOfRange {
                    value,
                    max: MAX_MINUTES,
                });
            }
        }

        if let Some(value) = hours {
            self.hours = value;
            if value > 0 {
                self.show_hours = true;
            }
        }
        if let Some(value) = minutes {
            self.minutes = value;
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.hours = 0;
        self.minutes = 0;
    }

    /// Hiding the hours wheel drops any hours picked on it
    pub fn toggle_hours(&mut self) {
        self.show_hours = !self.show_hours;
        if !self.show_hours {
            self.hours = 0;
        }
    }
}
