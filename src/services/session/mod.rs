//! Dashboard editing session.
//!
//! Owns the record snapshot, the pending-change ledger and the course cache for
//! one page, and runs the linker synchronously after each edit so derived
//! values are staged before the next edit arrives.

use anyhow::{anyhow, Result};
use serde_json::Value;

use crate::models::course::CourseCache;
use crate::models::record::{
    DashboardRecord, RecordId, FIELD_CAST, FIELD_COURSE, FIELD_ENTRY_TIME, FIELD_EXIT_TIME,
    FIELD_HOTEL,
};
use crate::models::snapshot::FieldEdit;
use crate::services::api::{ChangeCheck, ChangeChecker, CourseSource, RecordSink};
use crate::services::ledger::{FlushReport, PendingChanges};
use crate::services::linker::{self, LinkEffect, NearestInTime, PairingStrategy};
use crate::utils::time::{time_to_minutes, TimeParseError};

pub struct DashboardSession {
    records: Vec<DashboardRecord>,
    ledger: PendingChanges,
    courses: CourseCache,
    strategy: Box<dyn PairingStrategy>,
}

impl DashboardSession {
    pub fn new(records: Vec<DashboardRecord>) -> Self {
        Self {
            records,
            ledger: PendingChanges::new(),
            courses: CourseCache::new(),
            strategy: Box::new(NearestInTime),
        }
    }

    pub fn with_courses(mut self, courses: CourseCache) -> Self {
        self.courses = courses;
        self
    }

    pub fn with_strategy(mut self, strategy: Box<dyn PairingStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn records(&self) -> &[DashboardRecord] {
        &self.records
    }

    pub fn record(&self, record_id: RecordId) -> Option<&DashboardRecord> {
        self.records.iter().find(|r| r.record_id == record_id)
    }

    pub fn ledger(&self) -> &PendingChanges {
        &self.ledger
    }

    pub fn courses(&self) -> &CourseCache {
        &self.courses
    }

    fn record_mut(&mut self, record_id: RecordId) -> Option<&mut DashboardRecord> {
        self.records.iter_mut().find(|r| r.record_id == record_id)
    }

    /// Load course durations once; later calls keep the cached data.
    pub fn load_courses(&mut self, source: &dyn CourseSource) -> Result<usize> {
        if !self.courses.is_empty() {
            return Ok(self.courses.len());
        }

        let courses = source
            .get_course_data()
            .map_err(|err| anyhow!("Failed to load course data: {}", err))?;
        self.courses = CourseCache::from_courses(courses);
        log::info!("Loaded {} courses", self.courses.len());
        Ok(self.courses.len())
    }

    /// Edit the time of an entry or exit record.
    ///
    /// Blank clears the time. Entry edits recompute the paired exit.
    pub fn set_time(
        &mut self,
        record_id: RecordId,
        time: &str,
    ) -> Result<Vec<LinkEffect>, TimeParseError> {
        let time = time.trim();
        if !time.is_empty() {
            time_to_minutes(time)?;
        }

        let Some(record) = self.record_mut(record_id) else {
            log::debug!("Ignoring time edit for unknown record {}", record_id);
            return Ok(Vec::new());
        };
        record.time = time.to_string();
        let role = record.role;

        self.ledger.record_change(record_id, role.time_field(), time);
        Ok(self.follow_up_entry(record_id))
    }

    pub fn set_course(&mut self, record_id: RecordId, course_id: Option<i64>) -> Vec<LinkEffect> {
        let Some(record) = self.record_mut(record_id) else {
            return Vec::new();
        };
        record.course_id = course_id;

        self.ledger
            .record_change(record_id, FIELD_COURSE, course_id.map_or(Value::Null, Value::from));
        self.follow_up_entry(record_id)
    }

    /// Reassign a record to another cast.
    pub fn set_resource(&mut self, record_id: RecordId, resource_id: &str) -> Vec<LinkEffect> {
        let Some(record) = self.record_mut(record_id) else {
            return Vec::new();
        };
        record.resource_id = resource_id.trim().to_string();

        self.ledger
            .record_change(record_id, FIELD_CAST, resource_id.trim());
        self.follow_up_entry(record_id)
    }

    pub fn set_hotel(&mut self, record_id: RecordId, hotel_id: Option<&str>) -> Vec<LinkEffect> {
        let hotel_id = hotel_id.map(str::trim).filter(|h| !h.is_empty());
        let Some(record) = self.record_mut(record_id) else {
            return Vec::new();
        };
        record.hotel_id = hotel_id.map(str::to_string);

        self.ledger
            .record_change(record_id, FIELD_HOTEL, hotel_id.map_or(Value::Null, Value::from));
        self.sync_hotel_selection(record_id).into_iter().collect()
    }

    /// Stage any other field (memo, payment, ...) without linking.
    pub fn set_field(&mut self, record_id: RecordId, field: &str, value: impl Into<Value>) {
        self.ledger.record_change(record_id, field, value);
    }

    /// Route a generic form edit to the matching setter.
    pub fn apply_edit(&mut self, edit: &FieldEdit) -> Result<Vec<LinkEffect>> {
        let as_text = |value: &Value| -> Option<String> {
            match value {
                Value::Null => None,
                Value::String(text) => Some(text.clone()),
                other => Some(other.to_string()),
            }
        };

        match edit.field.as_str() {
            FIELD_ENTRY_TIME | FIELD_EXIT_TIME => {
                let time = as_text(&edit.value).unwrap_or_default();
                Ok(self.set_time(edit.record_id, &time)?)
            }
            FIELD_COURSE => {
                let course_id = match &edit.value {
                    Value::Null => None,
                    Value::Number(number) => number.as_i64(),
                    Value::String(text) if text.trim().is_empty() => None,
                    Value::String(text) => Some(text.trim().parse::<i64>().map_err(|_| {
                        anyhow!("Course id '{}' for record {} is not a number", text, edit.record_id)
                    })?),
                    other => return Err(anyhow!("Unsupported course value {}", other)),
                };
                Ok(self.set_course(edit.record_id, course_id))
            }
            FIELD_HOTEL => {
                let hotel_id = as_text(&edit.value);
                Ok(self.set_hotel(edit.record_id, hotel_id.as_deref()))
            }
            FIELD_CAST => {
                let cast = as_text(&edit.value).unwrap_or_default();
                Ok(self.set_resource(edit.record_id, &cast))
            }
            field => {
                self.set_field(edit.record_id, field, edit.value.clone());
                Ok(Vec::new())
            }
        }
    }

    fn follow_up_entry(&mut self, record_id: RecordId) -> Vec<LinkEffect> {
        match self.record(record_id) {
            Some(record) if record.role.is_entry() => {
                self.recompute_exit_time(record_id).into_iter().collect()
            }
            _ => Vec::new(),
        }
    }

    /// Push entry time + course duration onto the paired exit record.
    pub fn recompute_exit_time(&mut self, entry_id: RecordId) -> Option<LinkEffect> {
        let effect = linker::plan_exit_time(
            &self.records,
            entry_id,
            &self.courses,
            self.strategy.as_ref(),
        )?;
        log::debug!("Entry {} updates record {}", entry_id, effect.record_id());
        self.apply(&effect);
        Some(effect)
    }

    /// Copy a record's hotel onto its paired record if they differ.
    pub fn sync_hotel_selection(&mut self, record_id: RecordId) -> Option<LinkEffect> {
        let effect = linker::plan_hotel_sync(&self.records, record_id, self.strategy.as_ref())?;
        self.apply(&effect);
        Some(effect)
    }

    /// Recompute exits for entries whose time, course or cast is staged.
    ///
    /// Run before saving to catch edits made out of order. Untouched visits and
    /// exit times edited by hand are left alone. Returns how many exits were set.
    pub fn recompute_staged_exit_times(&mut self) -> usize {
        let entry_ids: Vec<RecordId> = self
            .records
            .iter()
            .filter(|r| r.role.is_entry())
            .filter(|r| {
                [FIELD_ENTRY_TIME, FIELD_COURSE, FIELD_CAST]
                    .iter()
                    .any(|field| self.ledger.get(r.record_id, field).is_some())
            })
            .map(|r| r.record_id)
            .collect();

        entry_ids
            .into_iter()
            .filter_map(|id| self.recompute_exit_time(id))
            .count()
    }

    fn apply(&mut self, effect: &LinkEffect) {
        match effect {
            LinkEffect::SetTime {
                record_id,
                field,
                time,
            } => {
                if let Some(record) = self.record_mut(*record_id) {
                    record.time = time.clone();
                }
                self.ledger.record_change(*record_id, *field, time.as_str());
            }
            LinkEffect::SetHotel {
                record_id,
                hotel_id,
            } => {
                if let Some(record) = self.record_mut(*record_id) {
                    record.hotel_id = hotel_id.clone();
                }
                let value = hotel_id.clone().map_or(Value::Null, Value::from);
                self.ledger.record_change(*record_id, FIELD_HOTEL, value);
            }
        }
    }

    /// Ask the server whether a record has a change pending on its side.
    ///
    /// Network failures assume no conflicting state and return the default;
    /// a server-side rejection is an error for the caller to show.
    pub fn check_change(&self, checker: &dyn ChangeChecker, record_id: RecordId) -> Result<ChangeCheck> {
        match checker.check_change(record_id) {
            Ok(check) => Ok(check),
            Err(err) if err.is_transport() => {
                log::warn!("Change check for record {} failed, continuing: {}", record_id, err);
                Ok(ChangeCheck::default())
            }
            Err(err) => Err(anyhow!("Change check for record {} failed: {}", record_id, err)),
        }
    }

    /// Recompute derived exits, then flush all staged edits.
    pub fn save_all(&mut self, sink: &dyn RecordSink) -> FlushReport {
        let recomputed = self.recompute_staged_exit_times();
        log::debug!("Recomputed {} exit times before save", recomputed);
        self.ledger.flush(sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::course::Course;
    use crate::models::record::RecordRole;
    use crate::services::api::{ApiError, MockChangeChecker, MockCourseSource};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn session() -> DashboardSession {
        DashboardSession::new(vec![
            DashboardRecord::new(1, "A", RecordRole::Entry, "10:00")
                .with_course(1)
                .with_hotel("h-1"),
            DashboardRecord::new(2, "A", RecordRole::Exit, "11:30").with_hotel("h-1"),
            DashboardRecord::new(3, "B", RecordRole::Entry, "12:00").with_course(2),
            DashboardRecord::new(4, "B", RecordRole::Exit, "13:00"),
        ])
        .with_courses(CourseCache::from_courses(vec![
            Course { course_id: 1, time: 90 },
            Course { course_id: 2, time: 120 },
        ]))
    }

    #[test]
    fn test_entry_time_edit_moves_exit() {
        let mut session = session();
        let effects = session.set_time(1, "10:15").unwrap();

        assert_eq!(effects.len(), 1);
        assert_eq!(session.record(2).unwrap().time, "11:45");
        assert_eq!(session.ledger().get(1, "entry_time"), Some(&json!("10:15")));
        assert_eq!(session.ledger().get(2, "exit_time"), Some(&json!("11:45")));
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut session = session();
        session.set_time(1, "10:15").unwrap();
        let before = session.ledger().clone();

        session.recompute_exit_time(1);
        session.recompute_exit_time(1);
        assert_eq!(session.ledger(), &before);
    }

    #[test]
    fn test_malformed_time_is_rejected_without_staging() {
        let mut session = session();
        assert!(session.set_time(1, "1015").is_err());
        assert!(session.ledger().is_empty());
        assert_eq!(session.record(1).unwrap().time, "10:00");
    }

    #[test]
    fn test_exit_time_edit_does_not_link() {
        let mut session = session();
        let effects = session.set_time(2, "12:00").unwrap();
        assert!(effects.is_empty());
        assert_eq!(session.ledger().len(), 1);
    }

    #[test]
    fn test_unknown_record_is_silent() {
        let mut session = session();
        assert!(session.set_time(99, "10:00").unwrap().is_empty());
        assert!(session.set_course(99, Some(1)).is_empty());
        assert!(session.ledger().is_empty());
    }

    #[test]
    fn test_course_change_recomputes_exit() {
        let mut session = session();
        session.set_course(1, Some(2));
        assert_eq!(session.record(2).unwrap().time, "12:00");
        assert_eq!(session.ledger().get(1, "course_id"), Some(&json!(2)));
    }

    #[test]
    fn test_resource_change_links_to_new_cast() {
        let mut session = session();
        session.set_resource(1, "B");
        // Entry at 10:00 for B now pairs with B's 13:00 exit.
        assert_eq!(session.record(4).unwrap().time, "11:30");
        assert_eq!(session.ledger().get(1, "cast_id"), Some(&json!("B")));
    }

    #[test]
    fn test_hotel_change_is_mirrored() {
        let mut session = session();
        let effects = session.set_hotel(1, Some("h-2"));
        assert_eq!(effects.len(), 1);
        assert_eq!(session.record(2).unwrap().hotel_id.as_deref(), Some("h-2"));
        assert_eq!(session.ledger().get(2, "hotel_id"), Some(&json!("h-2")));
    }

    #[test]
    fn test_hotel_same_value_not_staged_on_pair() {
        let mut session = session();
        let effects = session.set_hotel(1, Some("h-1"));
        assert!(effects.is_empty());
        assert!(session.ledger().get(2, "hotel_id").is_none());
    }

    /// Sink that accepts every save and remembers what it was sent.
    #[derive(Default)]
    struct CollectingSink {
        sent: std::sync::Mutex<Vec<(RecordId, String, Value)>>,
    }

    impl RecordSink for CollectingSink {
        fn update_record(
            &self,
            request: &crate::services::api::UpdateRecordRequest,
        ) -> Result<(), ApiError> {
            self.sent.lock().unwrap().push((
                request.record_id,
                request.field.clone(),
                request.value.clone(),
            ));
            Ok(())
        }
    }

    impl CollectingSink {
        fn sorted(&self) -> Vec<(RecordId, String, Value)> {
            let mut sent = self.sent.lock().unwrap().clone();
            sent.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));
            sent
        }
    }

    #[test]
    fn test_recompute_staged_only_touches_edited_entries() {
        let mut session = session();
        assert_eq!(session.recompute_staged_exit_times(), 0);
        assert!(session.ledger().is_empty());

        session.set_field(3, "course_id", 2);
        assert_eq!(session.recompute_staged_exit_times(), 1);
        assert_eq!(session.record(4).unwrap().time, "14:00");
        assert!(session.ledger().get(2, "exit_time").is_none());
    }

    #[test]
    fn test_save_keeps_hand_edited_exit_time() {
        let mut session = session();
        session.set_time(2, "12:00").unwrap();

        let sink = CollectingSink::default();
        assert!(session.save_all(&sink).is_success());
        assert_eq!(
            sink.sorted(),
            vec![(2, "exit_time".to_string(), json!("12:00"))]
        );
        assert_eq!(session.record(2).unwrap().time, "12:00");
    }

    #[test]
    fn test_save_sends_only_staged_fields() {
        let mut session = session();
        session.set_field(1, "memo", "regular");

        let sink = CollectingSink::default();
        assert!(session.save_all(&sink).is_success());
        assert_eq!(sink.sorted(), vec![(1, "memo".to_string(), json!("regular"))]);
    }

    #[test]
    fn test_save_recomputes_entry_edited_before_courses_loaded() {
        let mut session = DashboardSession::new(vec![
            DashboardRecord::new(1, "A", RecordRole::Entry, "10:00").with_course(1),
            DashboardRecord::new(2, "A", RecordRole::Exit, "11:00"),
        ]);
        assert!(session.set_time(1, "10:15").unwrap().is_empty());

        let mut session = session.with_courses(CourseCache::from_courses(vec![Course {
            course_id: 1,
            time: 90,
        }]));
        let sink = CollectingSink::default();
        assert!(session.save_all(&sink).is_success());
        assert_eq!(
            sink.sorted(),
            vec![
                (1, "entry_time".to_string(), json!("10:15")),
                (2, "exit_time".to_string(), json!("11:45")),
            ]
        );
    }

    #[test]
    fn test_check_change_fails_open_on_network_error() {
        // Nothing listens on port 1, so this yields a real transport error.
        let transport = reqwest::blocking::Client::builder()
            .no_proxy()
            .build()
            .unwrap()
            .get("http://127.0.0.1:1")
            .send()
            .unwrap_err();
        let mut checker = MockChangeChecker::new();
        checker
            .expect_check_change()
            .return_once(move |_| Err(ApiError::Transport(transport)));

        let check = session().check_change(&checker, 2).unwrap();
        assert_eq!(
            check,
            ChangeCheck {
                is_exit: false,
                has_change: false,
            }
        );
    }

    #[test]
    fn test_apply_edit_routes_fields() {
        let mut session = session();
        let edit = |field: &str, value: Value| FieldEdit {
            record_id: 1,
            field: field.to_string(),
            value,
        };

        let effects = session.apply_edit(&edit("entry_time", json!("10:15"))).unwrap();
        assert_eq!(effects.len(), 1);

        session.apply_edit(&edit("course_id", json!("2"))).unwrap();
        assert_eq!(session.record(1).unwrap().course_id, Some(2));
        assert_eq!(session.record(2).unwrap().time, "12:15");

        session.apply_edit(&edit("memo", json!("VIP"))).unwrap();
        assert_eq!(session.ledger().get(1, "memo"), Some(&json!("VIP")));

        assert!(session.apply_edit(&edit("course_id", json!("long"))).is_err());
        assert!(session.apply_edit(&edit("entry_time", json!("noon"))).is_err());
    }

    #[test]
    fn test_load_courses_once() {
        let mut source = MockCourseSource::new();
        source
            .expect_get_course_data()
            .times(1)
            .returning(|| Ok(vec![Course { course_id: 7, time: 45 }]));

        let mut session = DashboardSession::new(Vec::new());
        assert_eq!(session.load_courses(&source).unwrap(), 1);
        assert_eq!(session.load_courses(&source).unwrap(), 1);
        assert_eq!(session.courses().duration_minutes(7), Some(45));
    }

    #[test]
    fn test_load_courses_rejected() {
        let mut source = MockCourseSource::new();
        source
            .expect_get_course_data()
            .returning(|| Err(ApiError::Rejected("store closed".to_string())));

        let mut session = DashboardSession::new(Vec::new());
        assert!(session.load_courses(&source).is_err());
        assert!(session.courses().is_empty());
    }

    #[test]
    fn test_check_change_passes_result() {
        let mut checker = MockChangeChecker::new();
        checker.expect_check_change().returning(|_| {
            Ok(ChangeCheck {
                is_exit: true,
                has_change: true,
            })
        });

        let check = session().check_change(&checker, 2).unwrap();
        assert!(check.is_exit && check.has_change);
    }

    #[test]
    fn test_check_change_rejection_is_error() {
        let mut checker = MockChangeChecker::new();
        checker
            .expect_check_change()
            .returning(|_| Err(ApiError::Rejected("record locked".to_string())));

        assert!(session().check_change(&checker, 2).is_err());
    }
}
