//! Attendance records embedded in a staff document.
//!
//! A staff member has at most one record per calendar day. All day
//! arithmetic is done in UTC.

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    /// Midnight of the recorded day.
    pub date: Timestamp,
    pub is_present: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

/// Truncate a timestamp to midnight of the same UTC day.
pub fn start_of_day(ts: Timestamp) -> Timestamp {
    ts.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// The last representable millisecond of the UTC day containing `ts`.
pub fn end_of_day(ts: Timestamp) -> Timestamp {
    start_of_day(ts) + Duration::days(1) - Duration::milliseconds(1)
}

/// Whether the two timestamps fall on the same UTC calendar day.
pub fn same_day(a: Timestamp, b: Timestamp) -> bool {
    a.date_naive() == b.date_naive()
}

/// Outcome of [`upsert_attendance`], used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Updated,
    Appended,
}

/// Record attendance for the day containing `date`.
///
/// If a record already exists for that day its presence flag is overwritten
/// and its remarks replaced only when non-empty `remarks` are given. Otherwise a new
/// record dated at midnight is appended.
pub fn upsert_attendance(
    records: &mut Vec<AttendanceRecord>,
    date: Timestamp,
    is_present: bool,
    remarks: Option<String>,
) -> UpsertOutcome {
    let day = start_of_day(date);

    if let Some(existing) = records.iter_mut().find(|r| same_day(r.date, day)) {
        existing.is_present = is_present;
        if let Some(remarks) = remarks.filter(|r| !r.is_empty()) {
            existing.remarks = Some(remarks);
        }
        return UpsertOutcome::Updated;
    }

    records.push(AttendanceRecord {
        date: day,
        is_present,
        remarks,
    });
    UpsertOutcome::Appended
}

/// Records whose date lies in `[start, end_of_day(end)]`, newest first.
///
/// A missing `start` leaves the range open below; a missing `end` means
/// "through today".
pub fn attendance_in_range(
    records: &[AttendanceRecord],
    start: Option<Timestamp>,
    end: Option<Timestamp>,
    now: Timestamp,
) -> Vec<AttendanceRecord> {
    let lower = start.unwrap_or(Timestamp::MIN_UTC);
    let upper = end_of_day(end.unwrap_or(now));

    let mut filtered: Vec<AttendanceRecord> = records
        .iter()
        .filter(|r| r.date >= lower && r.date <= upper)
        .cloned()
        .collect();
    sort_newest_first(&mut filtered);
    filtered
}

pub fn sort_newest_first(records: &mut [AttendanceRecord]) {
    records.sort_by(|a, b| b.date.cmp(&a.date));
}

/// The record for the day containing `day`, if any.
pub fn attendance_on(records: &[AttendanceRecord], day: Timestamp) -> Option<&AttendanceRecord> {
    records.iter().find(|r| same_day(r.date, day))
}
