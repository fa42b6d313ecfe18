// Time slot model
// One cell of the gantt time axis

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Display hour, wrapped into 0..24.
    pub hour: u32,
    pub minute: u32,
    /// "HH:MM" built from the display hour.
    pub label: String,
    pub is_hour_mark: bool,
    /// True elapsed minutes since the grid start; strictly increasing along the axis.
    pub offset_minutes: u32,
}

impl TimeSlot {
    pub fn new(hour: u32, minute: u32, offset_minutes: u32) -> Self {
        let display_hour = hour % 24;
        Self {
            hour: display_hour,
            minute,
            label: format!("{:02}:{:02}", display_hour, minute),
            is_hour_mark: minute == 0,
            offset_minutes,
        }
    }
}
