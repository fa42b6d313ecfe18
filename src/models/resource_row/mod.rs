// Resource row and bar models
// A staff/cast lane in the timeline and the bars drawn on it

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceRow {
    pub resource_id: String,
    #[serde(default)]
    pub work_start_time: Option<String>,
    #[serde(default)]
    pub work_end_time: Option<String>,
}

impl ResourceRow {
    pub fn new(resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            work_start_time: None,
            work_end_time: None,
        }
    }

    pub fn with_work_time(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.work_start_time = Some(start.into());
        self.work_end_time = Some(end.into());
        self
    }

    /// Whether both shift boundaries are present and non-blank.
    pub fn has_work_time(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.work_start_time) && present(&self.work_end_time)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarKind {
    /// Filled shift background behind a row.
    WorkBackground,
    Reservation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub bar_id: String,
    pub kind: BarKind,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    pub owner_row_id: String,
}

impl Bar {
    pub fn reservation(
        bar_id: impl Into<String>,
        owner_row_id: impl Into<String>,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
    ) -> Self {
        Self {
            bar_id: bar_id.into(),
            kind: BarKind::Reservation,
            start_time: Some(start_time.into()),
            end_time: Some(end_time.into()),
            owner_row_id: owner_row_id.into(),
        }
    }

    pub fn work_background(
        owner_row_id: impl Into<String>,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
    ) -> Self {
        let owner_row_id = owner_row_id.into();
        Self {
            bar_id: format!("work-{}", owner_row_id),
            kind: BarKind::WorkBackground,
            start_time: Some(start_time.into()),
            end_time: Some(end_time.into()),
            owner_row_id,
        }
    }
}

/// Derived on-screen position of a bar; recomputed every render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarPlacement {
    pub bar_id: String,
    pub owner_row_id: String,
    pub kind: BarKind,
    pub left_px: f32,
    pub width_px: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_work_time() {
        assert!(!ResourceRow::new("A").has_work_time());
        assert!(ResourceRow::new("A").with_work_time("10:00", "18:00").has_work_time());

        let blank_end = ResourceRow {
            resource_id: "B".to_string(),
            work_start_time: Some("10:00".to_string()),
            work_end_time: Some("  ".to_string()),
        };
        assert!(!blank_end.has_work_time());
    }

    #[test]
    fn test_work_background_id() {
        let bar = Bar::work_background("cast-7", "12:00", "20:00");
        assert_eq!(bar.bar_id, "work-cast-7");
        assert_eq!(bar.kind, BarKind::WorkBackground);
    }
}
