// Page snapshot
// Rows, bars and records as rendered on one page, plus edits waiting to be applied

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::record::{DashboardRecord, RecordId};
use super::resource_row::{Bar, ResourceRow};

/// A single form edit: set `field` of `record_id` to `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldEdit {
    pub record_id: RecordId,
    pub field: String,
    pub value: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub rows: Vec<ResourceRow>,
    pub bars: Vec<Bar>,
    pub records: Vec<DashboardRecord>,
    pub edits: Vec<FieldEdit>,
}

impl Snapshot {
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}
