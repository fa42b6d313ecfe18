// Shared gantt test data
// Grid configs, dashboard records and an in-memory back-office used by the integration tests
#![allow(dead_code)]

use std::sync::Mutex;

use dashboard_gantt::models::course::{Course, CourseCache};
use dashboard_gantt::models::gantt_config::GanttConfig;
use dashboard_gantt::models::record::{DashboardRecord, RecordRole};
use dashboard_gantt::services::api::{ApiError, RecordSink, UpdateRecordRequest};

/// Sample grid configurations
pub mod configs {
    use super::*;

    /// 06:00-08:00 in hourly cells of 30px
    pub fn hourly_morning() -> GanttConfig {
        GanttConfig {
            start_hour: 6,
            end_hour: 8,
            interval_minutes: 60,
            cell_width_px: 30,
        }
    }

    /// Evening shop open until 03:00
    pub fn late_night() -> GanttConfig {
        GanttConfig {
            start_hour: 18,
            end_hour: 27,
            interval_minutes: 10,
            cell_width_px: 30,
        }
    }
}

/// Sample dashboard records
pub mod records {
    use super::*;

    pub fn entry(id: i64, cast: &str, time: &str) -> DashboardRecord {
        DashboardRecord::new(id, cast, RecordRole::Entry, time)
    }

    pub fn exit(id: i64, cast: &str, time: &str) -> DashboardRecord {
        DashboardRecord::new(id, cast, RecordRole::Exit, time)
    }

    /// One 90-minute visit for cast A: entry 10:00, exit 11:30
    pub fn single_visit() -> Vec<DashboardRecord> {
        vec![
            entry(1, "A", "10:00").with_course(90),
            exit(2, "A", "11:30"),
        ]
    }

    pub fn courses() -> CourseCache {
        CourseCache::from_courses(vec![
            Course { course_id: 60, time: 60 },
            Course { course_id: 90, time: 90 },
            Course { course_id: 120, time: 120 },
        ])
    }
}

/// Back-office stand-in that accepts every save except those for `failing_field`.
#[derive(Default)]
pub struct FakeBackOffice {
    pub failing_field: Option<&'static str>,
    pub received: Mutex<Vec<UpdateRecordRequest>>,
}

impl FakeBackOffice {
    pub fn failing_on(field: &'static str) -> Self {
        Self {
            failing_field: Some(field),
            ..Self::default()
        }
    }

    pub fn received_count(&self) -> usize {
        self.received.lock().unwrap().len()
    }
}

impl RecordSink for FakeBackOffice {
    fn update_record(&self, request: &UpdateRecordRequest) -> Result<(), ApiError> {
        self.received.lock().unwrap().push(request.clone());
        if self.failing_field == Some(request.field.as_str()) {
            return Err(ApiError::Rejected(format!("cannot save {}", request.field)));
        }
        Ok(())
    }
}
