//! Work/off classification of gantt slots against a resource's shift.

use serde::Serialize;

use crate::models::resource_row::ResourceRow;
use crate::models::time_slot::TimeSlot;
use crate::utils::time::{parse_optional, MINUTES_PER_DAY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotState {
    Work,
    Off,
}

/// Per-row classification of every slot on the axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowClassification {
    pub resource_id: String,
    pub states: Vec<SlotState>,
}

/// Whether `slot_time` falls inside the shift `start_time..=end_time`.
///
/// The slot on the start boundary is still off; the slot on the end boundary
/// is the last working one. Shifts ending at or before their start run past
/// midnight, and early-morning slots are then moved onto the next day.
/// Missing, blank or malformed inputs classify as off.
pub fn is_within_work_time(
    slot_time: Option<&str>,
    start_time: Option<&str>,
    end_time: Option<&str>,
) -> bool {
    let (Some(mut slot), Some(start), Some(mut end)) = (
        parse_optional(slot_time),
        parse_optional(start_time),
        parse_optional(end_time),
    ) else {
        return false;
    };

    if end <= start {
        end += MINUTES_PER_DAY;
        if slot <= start {
            slot += MINUTES_PER_DAY;
        }
    }

    slot > start && slot <= end
}

/// Classify every slot for one row. Rows without a shift are entirely off.
pub fn classify_row(row: &ResourceRow, slots: &[TimeSlot]) -> RowClassification {
    let states = slots
        .iter()
        .map(|slot| {
            if is_within_work_time(
                Some(&slot.label),
                row.work_start_time.as_deref(),
                row.work_end_time.as_deref(),
            ) {
                SlotState::Work
            } else {
                SlotState::Off
            }
        })
        .collect();

    RowClassification {
        resource_id: row.resource_id.clone(),
        states,
    }
}

pub fn classify_rows(rows: &[ResourceRow], slots: &[TimeSlot]) -> Vec<RowClassification> {
    rows.iter().map(|row| classify_row(row, slots)).collect()
}
