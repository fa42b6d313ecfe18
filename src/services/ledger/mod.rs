//! Pending-change ledger.
//!
//! Unsaved per-record field edits, last write wins. A flush sends one request
//! per (record, field) concurrently and clears the ledger only when every
//! request succeeded; otherwise all edits stay staged for another attempt.

use std::collections::HashMap;
use std::thread;

use serde_json::Value;

use crate::models::record::RecordId;
use crate::services::api::{RecordSink, UpdateRecordRequest};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingChanges {
    changes: HashMap<RecordId, HashMap<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushFailure {
    pub record_id: RecordId,
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub attempted: usize,
    pub failures: Vec<FlushFailure>,
}

impl FlushReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.attempted - self.failures.len()
    }
}

impl PendingChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `value` for `record_id.field`, replacing any earlier value.
    pub fn record_change(&mut self, record_id: RecordId, field: impl Into<String>, value: impl Into<Value>) {
        self.changes
            .entry(record_id)
            .or_default()
            .insert(field.into(), value.into());
    }

    pub fn get(&self, record_id: RecordId, field: &str) -> Option<&Value> {
        self.changes.get(&record_id)?.get(field)
    }

    /// Number of staged (record, field) pairs.
    pub fn len(&self) -> usize {
        self.changes.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.changes.clear();
    }

    /// One request per staged pair, ordered by record id then field name.
    pub fn requests(&self) -> Vec<UpdateRecordRequest> {
        let mut requests: Vec<UpdateRecordRequest> = self
            .changes
            .iter()
            .flat_map(|(record_id, fields)| {
                fields.iter().map(move |(field, value)| UpdateRecordRequest {
                    record_id: *record_id,
                    field: field.clone(),
                    value: value.clone(),
                })
            })
            .collect();
        requests.sort_by(|a, b| (a.record_id, &a.field).cmp(&(b.record_id, &b.field)));
        requests
    }

    /// Send every staged change to `sink` at once and wait for all of them.
    pub fn flush(&mut self, sink: &dyn RecordSink) -> FlushReport {
        let requests = self.requests();
        if requests.is_empty() {
            return FlushReport::default();
        }

        let attempted = requests.len();
        let failures: Vec<FlushFailure> = thread::scope(|scope| {
            let handles: Vec<_> = requests
                .into_iter()
                .map(|request| {
                    let key = (request.record_id, request.field.clone());
                    let handle = scope.spawn(move || sink.update_record(&request));
                    (key, handle)
                })
                .collect();

            handles
                .into_iter()
                .filter_map(|((record_id, field), handle)| {
                    let message = match handle.join() {
                        Ok(Ok(())) => return None,
                        Ok(Err(err)) => err.to_string(),
                        Err(_) => "save request panicked".to_string(),
                    };
                    log::warn!("Failed to save {} for record {}: {}", field, record_id, message);
                    Some(FlushFailure {
                        record_id,
                        field,
                        message,
                    })
                })
                .collect()
        });

        let report = FlushReport { attempted, failures };
        if report.is_success() {
            self.clear();
            log::info!("Saved {} pending changes", attempted);
        } else {
            log::warn!(
                "{} of {} changes failed to save; keeping all {} staged",
                report.failures.len(),
                attempted,
                self.len()
            );
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::api::ApiError;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records every request and rejects the fields listed in `reject`.
    #[derive(Default)]
    struct RecordingSink {
        reject: Vec<&'static str>,
        seen: Mutex<Vec<(RecordId, String)>>,
    }

    impl RecordSink for RecordingSink {
        fn update_record(&self, request: &UpdateRecordRequest) -> Result<(), ApiError> {
            self.seen
                .lock()
                .unwrap()
                .push((request.record_id, request.field.clone()));
            if self.reject.contains(&request.field.as_str()) {
                return Err(ApiError::Rejected(format!("{} too long", request.field)));
            }
            Ok(())
        }
    }

    fn staged_three() -> PendingChanges {
        let mut ledger = PendingChanges::new();
        ledger.record_change(1, "entry_time", "10:15");
        ledger.record_change(2, "exit_time", "11:45");
        ledger.record_change(2, "memo", "late checkout");
        ledger
    }

    #[test]
    fn test_last_write_wins() {
        let mut ledger = PendingChanges::new();
        ledger.record_change(5, "memo", "hello");
        ledger.record_change(5, "memo", "world");
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get(5, "memo"), Some(&json!("world")));
    }

    #[test]
    fn test_requests_are_sorted() {
        let requests = staged_three().requests();
        let keys: Vec<(RecordId, &str)> = requests
            .iter()
            .map(|r| (r.record_id, r.field.as_str()))
            .collect();
        assert_eq!(keys, vec![(1, "entry_time"), (2, "exit_time"), (2, "memo")]);
    }

    #[test]
    fn test_flush_all_success_clears() {
        let sink = RecordingSink::default();

        let mut ledger = staged_three();
        let report = ledger.flush(&sink);
        assert!(report.is_success());
        assert_eq!(report.attempted, 3);
        assert_eq!(sink.seen.lock().unwrap().len(), 3);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_flush_partial_failure_keeps_everything() {
        let sink = RecordingSink {
            reject: vec!["memo"],
            ..RecordingSink::default()
        };

        let mut ledger = staged_three();
        let report = ledger.flush(&sink);
        assert!(!report.is_success());
        assert_eq!(report.succeeded(), 2);
        assert_eq!(
            report.failures,
            vec![FlushFailure {
                record_id: 2,
                field: "memo".to_string(),
                message: "memo too long".to_string(),
            }]
        );
        assert_eq!(ledger, staged_three());
    }

    #[test]
    fn test_flush_empty_is_noop() {
        let sink = RecordingSink::default();
        let mut ledger = PendingChanges::new();
        let report = ledger.flush(&sink);
        assert_eq!(report, FlushReport::default());
        assert!(sink.seen.lock().unwrap().is_empty());
    }
}
