// Gantt render configuration
// Read once per initialization from the host page's embedded attributes

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const DEFAULT_START_HOUR: u32 = 6;
pub const DEFAULT_END_HOUR: u32 = 24;
pub const DEFAULT_INTERVAL_MINUTES: u32 = 10;
pub const DEFAULT_CELL_WIDTH_PX: u32 = 30;

/// Host page attribute names carrying the grid configuration.
pub const ATTR_START_HOUR: &str = "data-start-hour";
pub const ATTR_END_HOUR: &str = "data-end-hour";
pub const ATTR_INTERVAL: &str = "data-interval";
pub const ATTR_CELL_WIDTH: &str = "data-cell-width";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GanttConfig {
    pub start_hour: u32,
    /// May exceed 24 to express a close after midnight.
    pub end_hour: u32,
    pub interval_minutes: u32,
    pub cell_width_px: u32,
}

impl Default for GanttConfig {
    fn default() -> Self {
        Self {
            start_hour: DEFAULT_START_HOUR,
            end_hour: DEFAULT_END_HOUR,
            interval_minutes: DEFAULT_INTERVAL_MINUTES,
            cell_width_px: DEFAULT_CELL_WIDTH_PX,
        }
    }
}

impl GanttConfig {
    /// Build a config from host page attributes.
    ///
    /// Each value falls back to its default independently when missing or
    /// not a number, mirroring how the page script reads them.
    pub fn from_attributes(attributes: &HashMap<String, String>) -> Self {
        let defaults = Self::default();
        let read = |key: &str, fallback: u32| -> u32 {
            match attributes.get(key).map(|v| v.trim().parse::<u32>()) {
                Some(Ok(value)) => value,
                Some(Err(_)) => {
                    log::warn!("Ignoring non-numeric gantt attribute {}", key);
                    fallback
                }
                None => fallback,
            }
        };

        let config = Self {
            start_hour: read(ATTR_START_HOUR, defaults.start_hour),
            end_hour: read(ATTR_END_HOUR, defaults.end_hour),
            interval_minutes: read(ATTR_INTERVAL, defaults.interval_minutes),
            cell_width_px: read(ATTR_CELL_WIDTH, defaults.cell_width_px),
        };

        if let Err(err) = config.validate() {
            log::warn!("Invalid gantt attributes ({}), using defaults", err);
            return defaults;
        }

        config
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.start_hour > 23 {
            return Err("Start hour must be between 0 and 23".to_string());
        }

        if self.end_hour <= self.start_hour {
            return Err("End hour must be after start hour".to_string());
        }

        if self.end_hour - self.start_hour > 24 {
            return Err("Grid cannot span more than 24 hours".to_string());
        }

        if self.interval_minutes == 0 || self.interval_minutes > 60 {
            return Err("Interval must be between 1 and 60 minutes".to_string());
        }

        if self.cell_width_px == 0 {
            return Err("Cell width must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Total minutes covered by the grid.
    pub fn span_minutes(&self) -> u32 {
        self.end_hour.saturating_sub(self.start_hour) * 60
    }

    /// Number of slots produced for this config (both ends inclusive).
    pub fn slot_count(&self) -> usize {
        if self.interval_minutes == 0 {
            return 0;
        }
        (self.span_minutes() / self.interval_minutes) as usize + 1
    }

    pub fn grid_width_px(&self) -> f32 {
        self.slot_count() as f32 * self.cell_width_px as f32
    }
}
