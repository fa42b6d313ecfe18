//! Time axis for the gantt view.
//!
//! Generates the fixed-interval slot sequence for a business day and converts
//! clock times into horizontal pixel offsets on that axis.

use anyhow::{anyhow, Result};
use chrono::{NaiveTime, Timelike};

use crate::models::gantt_config::GanttConfig;
use crate::models::time_slot::TimeSlot;
use crate::utils::time::{time_to_minutes, MINUTES_PER_DAY};

/// Generate the slot sequence for one render pass.
///
/// Slots run from `start_hour` to `end_hour` inclusive. Hours past 24 wrap for
/// display while `offset_minutes` keeps counting.
pub fn generate_time_slots(config: &GanttConfig) -> Vec<TimeSlot> {
    if config.interval_minutes == 0 || config.end_hour < config.start_hour {
        return Vec::new();
    }

    let total_minutes = config.span_minutes();
    (0..=total_minutes)
        .step_by(config.interval_minutes as usize)
        .map(|minutes| {
            let hour = minutes / 60 + config.start_hour;
            let minute = minutes % 60;
            TimeSlot::new(hour, minute, minutes)
        })
        .collect()
}

fn first_slot_minutes(slots: &[TimeSlot]) -> Result<u32> {
    let first = slots
        .first()
        .ok_or_else(|| anyhow!("Time grid has no slots"))?;
    Ok(time_to_minutes(&first.label)?)
}

fn minutes_to_px(minutes: f32, config: &GanttConfig) -> f32 {
    minutes / config.interval_minutes as f32 * config.cell_width_px as f32
}

/// Pixel offset of `time` from the first slot. Not clamped to the grid.
pub fn calculate_position(time: &str, slots: &[TimeSlot], config: &GanttConfig) -> Result<f32> {
    let origin = first_slot_minutes(slots)? as f32;
    let minutes = time_to_minutes(time)? as f32;
    Ok(minutes_to_px(minutes - origin, config))
}

/// Pixel width between `start` and `end`.
///
/// An end at or before the start is a visit across midnight, so a day is added
/// to the end before subtracting.
pub fn calculate_duration(
    start: &str,
    end: &str,
    slots: &[TimeSlot],
    config: &GanttConfig,
) -> Result<f32> {
    // An empty grid cannot host a bar even if the arithmetic would work.
    first_slot_minutes(slots)?;

    let start_minutes = time_to_minutes(start)?;
    let mut end_minutes = time_to_minutes(end)?;
    if end_minutes <= start_minutes {
        end_minutes += MINUTES_PER_DAY;
    }
    Ok(minutes_to_px((end_minutes - start_minutes) as f32, config))
}

/// One render pass worth of axis: the config plus its generated slots.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    config: GanttConfig,
    slots: Vec<TimeSlot>,
}

impl TimeGrid {
    pub fn new(config: GanttConfig) -> Self {
        let slots = generate_time_slots(&config);
        log::debug!(
            "Generated {} time slots ({:02}:00-{:02}:00 every {}m)",
            slots.len(),
            config.start_hour,
            config.end_hour,
            config.interval_minutes
        );
        Self { config, slots }
    }

    pub fn config(&self) -> &GanttConfig {
        &self.config
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    pub fn cell_width_px(&self) -> f32 {
        self.config.cell_width_px as f32
    }

    pub fn grid_width_px(&self) -> f32 {
        self.config.grid_width_px()
    }

    pub fn position_of(&self, time: &str) -> Result<f32> {
        calculate_position(time, &self.slots, &self.config)
    }

    pub fn width_between(&self, start: &str, end: &str) -> Result<f32> {
        calculate_duration(start, end, &self.slots, &self.config)
    }

    /// Offset of the "now" indicator line, or `None` outside the visible range.
    ///
    /// Unlike [`calculate_position`] this follows the grid across midnight, so a
    /// 01:30 clock on a 06:00-27:00 grid lands near the right edge.
    pub fn current_time_position(&self, now: NaiveTime) -> Option<f32> {
        if self.slots.is_empty() {
            return None;
        }

        let start = self.config.start_hour * 60;
        let mut minutes = now.hour() * 60 + now.minute();
        if minutes < start {
            minutes += MINUTES_PER_DAY;
        }

        // Unvalidated configs may start past midnight; those never show the line.
        let elapsed = minutes.checked_sub(start)?;
        if elapsed > self.config.span_minutes() {
            return None;
        }

        let seconds_fraction = now.second() as f32 / 60.0;
        Some(minutes_to_px(elapsed as f32 + seconds_fraction, &self.config))
    }
}
