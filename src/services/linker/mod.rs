//! Entry/exit pairing for dashboard records.
//!
//! Entry and exit records of one visit are edited independently, so the pair
//! is found again from the current snapshot every time it is needed. Planning
//! functions here are pure: they return [`LinkEffect`]s and leave applying them
//! to the session.

use crate::models::course::CourseCache;
use crate::models::record::{DashboardRecord, RecordId, RecordRole, FIELD_EXIT_TIME};
use crate::utils::time::add_minutes;

/// Chooses the paired record for a changed record.
pub trait PairingStrategy: Send + Sync {
    fn find_pair<'a>(
        &self,
        records: &'a [DashboardRecord],
        record_id: RecordId,
        resource_id: &str,
        is_entry: bool,
    ) -> Option<&'a DashboardRecord>;
}

/// Nearest opposite-role record of the same cast on the correct side in time.
///
/// An entry pairs with the closest strictly later exit, an exit with the
/// closest strictly earlier entry. Equal distances keep the first record in
/// snapshot order. Times are compared as plain minutes of day, so an exit past
/// midnight never pairs with an evening entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestInTime;

impl PairingStrategy for NearestInTime {
    fn find_pair<'a>(
        &self,
        records: &'a [DashboardRecord],
        record_id: RecordId,
        resource_id: &str,
        is_entry: bool,
    ) -> Option<&'a DashboardRecord> {
        let source_minutes = records
            .iter()
            .find(|record| record.record_id == record_id)?
            .time_minutes()?;
        let source_role = if is_entry {
            RecordRole::Entry
        } else {
            RecordRole::Exit
        };
        let wanted_role = source_role.opposite();

        records
            .iter()
            .filter(|record| record.record_id != record_id)
            .filter(|record| record.resource_id == resource_id && record.role == wanted_role)
            .filter_map(|record| record.time_minutes().map(|minutes| (record, minutes)))
            .filter(|(_, minutes)| {
                if is_entry {
                    *minutes > source_minutes
                } else {
                    *minutes < source_minutes
                }
            })
            .min_by_key(|(_, minutes)| minutes.abs_diff(source_minutes))
            .map(|(record, _)| record)
    }
}

/// Find the paired record with the default nearest-in-time heuristic.
pub fn find_paired_record<'a>(
    records: &'a [DashboardRecord],
    record_id: RecordId,
    resource_id: &str,
    is_entry: bool,
) -> Option<&'a DashboardRecord> {
    NearestInTime.find_pair(records, record_id, resource_id, is_entry)
}

/// A derived change to apply to a paired record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEffect {
    SetTime {
        record_id: RecordId,
        field: &'static str,
        time: String,
    },
    SetHotel {
        record_id: RecordId,
        hotel_id: Option<String>,
    },
}

impl LinkEffect {
    pub fn record_id(&self) -> RecordId {
        match self {
            LinkEffect::SetTime { record_id, .. } | LinkEffect::SetHotel { record_id, .. } => {
                *record_id
            }
        }
    }
}

/// Exit time for an entry record: entry time plus its course duration.
///
/// `None` when the record is not an entry, lacks a cast, time or course, the
/// course is unknown, or no exit pairs with it.
pub fn plan_exit_time(
    records: &[DashboardRecord],
    entry_id: RecordId,
    courses: &CourseCache,
    strategy: &dyn PairingStrategy,
) -> Option<LinkEffect> {
    let entry = records.iter().find(|record| record.record_id == entry_id)?;
    if !entry.role.is_entry() || !entry.has_resource() {
        return None;
    }

    entry.time_minutes()?;
    let duration = courses.duration_minutes(entry.course_id?)?;
    let exit_time = add_minutes(&entry.time, duration).ok()?;

    let exit = strategy.find_pair(records, entry_id, &entry.resource_id, true)?;
    log::debug!(
        "Entry {} ({} + {}m) pairs with exit {} -> {}",
        entry_id,
        entry.time,
        duration,
        exit.record_id,
        exit_time
    );

    Some(LinkEffect::SetTime {
        record_id: exit.record_id,
        field: FIELD_EXIT_TIME,
        time: exit_time,
    })
}

/// Mirror a record's hotel onto its pair when the two differ.
pub fn plan_hotel_sync(
    records: &[DashboardRecord],
    record_id: RecordId,
    strategy: &dyn PairingStrategy,
) -> Option<LinkEffect> {
    let source = records.iter().find(|record| record.record_id == record_id)?;
    if !source.has_resource() {
        return None;
    }

    let paired = strategy.find_pair(records, record_id, &source.resource_id, source.role.is_entry())?;
    if paired.hotel_id == source.hotel_id {
        return None;
    }

    Some(LinkEffect::SetHotel {
        record_id: paired.record_id,
        hotel_id: source.hotel_id.clone(),
    })
}
