// Course reference data
// Durations keyed by course id, loaded once per page and read-only afterwards

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Course as delivered by the course endpoint; `time` is the duration in minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub course_id: i64,
    pub time: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseCache {
    durations: HashMap<i64, i64>,
}

impl CourseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_courses(courses: impl IntoIterator<Item = Course>) -> Self {
        let durations = courses
            .into_iter()
            .map(|course| (course.course_id, course.time))
            .collect();
        Self { durations }
    }

    /// Duration in minutes; unknown course ids are a normal "no data" case.
    pub fn duration_minutes(&self, course_id: i64) -> Option<i64> {
        self.durations.get(&course_id).copied()
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }
}
