// Dashboard record model
// One entry or exit event for a cast at a clock time

use serde::{Deserialize, Serialize};

use crate::utils::time;

pub type RecordId = i64;

pub const FIELD_ENTRY_TIME: &str = "entry_time";
pub const FIELD_EXIT_TIME: &str = "exit_time";
pub const FIELD_COURSE: &str = "course_id";
pub const FIELD_HOTEL: &str = "hotel_id";
pub const FIELD_CAST: &str = "cast_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordRole {
    Entry,
    Exit,
}

impl RecordRole {
    pub fn opposite(self) -> Self {
        match self {
            RecordRole::Entry => RecordRole::Exit,
            RecordRole::Exit => RecordRole::Entry,
        }
    }

    /// Ledger field name holding this role's time.
    pub fn time_field(self) -> &'static str {
        match self {
            RecordRole::Entry => FIELD_ENTRY_TIME,
            RecordRole::Exit => FIELD_EXIT_TIME,
        }
    }

    pub fn is_entry(self) -> bool {
        self == RecordRole::Entry
    }
}

/// Entry and exit records of one visit are paired by the linker from current
/// field values; no foreign key connects them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardRecord {
    pub record_id: RecordId,
    /// Cast the record belongs to.
    pub resource_id: String,
    pub role: RecordRole,
    /// "HH:MM" as shown in the form; may be blank.
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub course_id: Option<i64>,
    #[serde(default)]
    pub hotel_id: Option<String>,
}

impl DashboardRecord {
    pub fn new(
        record_id: RecordId,
        resource_id: impl Into<String>,
        role: RecordRole,
        time: impl Into<String>,
    ) -> Self {
        Self {
            record_id,
            resource_id: resource_id.into(),
            role,
            time: time.into(),
            course_id: None,
            hotel_id: None,
        }
    }

    pub fn with_course(mut self, course_id: i64) -> Self {
        self.course_id = Some(course_id);
        self
    }

    pub fn with_hotel(mut self, hotel_id: impl Into<String>) -> Self {
        self.hotel_id = Some(hotel_id.into());
        self
    }

    /// Parsed time in minutes; `None` when blank or malformed.
    pub fn time_minutes(&self) -> Option<u32> {
        time::parse_optional(Some(&self.time))
    }

    pub fn has_resource(&self) -> bool {
        !self.resource_id.trim().is_empty()
    }
}
