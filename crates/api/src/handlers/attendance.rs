//! Attendance endpoints under `/staff`.
//!
//! Attendance lives inside the staff row as a JSON list; every write loads
//! the list, applies [`upsert_attendance`], and stores the whole list back.
//! All endpoints require the `admin` or `executive` role.

use axum::extract::State;
use chrono::Utc;
use sarathi_core::attendance::{
    attendance_in_range, attendance_on, sort_newest_first, start_of_day, upsert_attendance,
    AttendanceRecord,
};
use sarathi_core::error::CoreError;
use sarathi_core::types::{DbId, Timestamp};
use sarathi_core::validation::parse_client_date;
use sarathi_db::models::staff::StaffResponse;
use sarathi_db::repositories::StaffRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extract::{Json, Path, Query};
use crate::middleware::rbac::RequireAdminOrExecutive;
use crate::payload::lenient;
use crate::state::AppState;

const STAFF_ENTITY: &str = "Staff member";

/// Request body for `POST /staff/{staffId}/attendance`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordAttendanceRequest {
    #[serde(default, deserialize_with = "lenient::string")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_present: Option<bool>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub remarks: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRangeParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AttendanceDateParams {
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffAttendanceResponse {
    pub staff_id: DbId,
    pub name: String,
    pub attendance: Vec<AttendanceRecord>,
}

/// One roster line in the by-date report. `attendance` is `null` when the
/// staff member has no record for that day.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAttendanceEntry {
    pub staff_id: DbId,
    pub name: String,
    pub phone: String,
    pub role: String,
    pub attendance: Option<AttendanceRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAttendanceResponse {
    pub date: Timestamp,
    pub staff_attendance: Vec<DailyAttendanceEntry>,
}

/// Parse an optional client date, rejecting anything unparseable.
fn parse_optional_date(raw: Option<&str>) -> Result<Option<Timestamp>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => parse_client_date(raw)
            .map(Some)
            .ok_or_else(|| AppError::BadRequest("Invalid date format".into())),
    }
}

/// POST /api/staff/{staffId}/attendance
///
/// Record presence for one day. A second call for the same day overwrites
/// the flag instead of adding a record. `isPresent` defaults to `true`.
pub async fn record_attendance(
    State(state): State<AppState>,
    RequireAdminOrExecutive(user): RequireAdminOrExecutive,
    Path(staff_id): Path<DbId>,
    Json(input): Json<RecordAttendanceRequest>,
) -> AppResult<Json<StaffResponse>> {
    let date = parse_optional_date(input.date.as_deref())?
        .ok_or_else(|| AppError::BadRequest("Date parameter is required".into()))?;

    let staff = StaffRepo::find_by_id(&state.pool, staff_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: STAFF_ENTITY,
            id: staff_id,
        })?;

    let mut records = staff.attendance.0;
    let outcome = upsert_attendance(
        &mut records,
        date,
        input.is_present.unwrap_or(true),
        input.remarks,
    );

    let updated = StaffRepo::replace_attendance(&state.pool, staff_id, &records)
        .await?
        .ok_or(CoreError::NotFound {
            entity: STAFF_ENTITY,
            id: staff_id,
        })?;

    tracing::info!(
        staff_id,
        recorded_by = user.staff_id,
        day = %start_of_day(date).date_naive(),
        ?outcome,
        "Attendance recorded"
    );

    Ok(Json(updated.into()))
}

/// GET /api/staff/{staffId}/attendance?startDate=&endDate=
///
/// With neither bound the full history is returned. Otherwise a missing
/// start is open-ended and a missing end means today; the end day is
/// included in full.
pub async fn staff_attendance(
    State(state): State<AppState>,
    RequireAdminOrExecutive(_user): RequireAdminOrExecutive,
    Path(staff_id): Path<DbId>,
    Query(params): Query<AttendanceRangeParams>,
) -> AppResult<Json<StaffAttendanceResponse>> {
    let start = parse_optional_date(params.start_date.as_deref())?;
    let end = parse_optional_date(params.end_date.as_deref())?;

    let staff = StaffRepo::find_by_id(&state.pool, staff_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: STAFF_ENTITY,
            id: staff_id,
        })?;

    let attendance = if start.is_none() && end.is_none() {
        let mut all = staff.attendance.0;
        sort_newest_first(&mut all);
        all
    } else {
        attendance_in_range(&staff.attendance.0, start, end, Utc::now())
    };

    Ok(Json(StaffAttendanceResponse {
        staff_id: staff.id,
        name: staff.name,
        attendance,
    }))
}

/// GET /api/staff/attendance/date?date=
///
/// Every staff member with their record for the given day, or `null`.
pub async fn attendance_by_date(
    State(state): State<AppState>,
    RequireAdminOrExecutive(_user): RequireAdminOrExecutive,
    Query(params): Query<AttendanceDateParams>,
) -> AppResult<Json<DailyAttendanceResponse>> {
    let day = parse_optional_date(params.date.as_deref())?
        .map(start_of_day)
        .ok_or_else(|| AppError::BadRequest("Date parameter is required".into()))?;

    let staff = StaffRepo::list(&state.pool).await?;
    let staff_attendance = staff
        .into_iter()
        .map(|s| DailyAttendanceEntry {
            attendance: attendance_on(&s.attendance.0, day).cloned(),
            staff_id: s.id,
            name: s.name,
            phone: s.phone,
            role: s.role,
        })
        .collect();

    Ok(Json(DailyAttendanceResponse {
        date: day,
        staff_attendance,
    }))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn blank_date_is_treated_as_absent() {
        assert_matches!(parse_optional_date(Some("  ")), Ok(None));
        assert_matches!(parse_optional_date(None), Ok(None));
    }

    #[test]
    fn garbage_date_is_a_bad_request() {
        assert_matches!(
            parse_optional_date(Some("yesterday")),
            Err(AppError::BadRequest(msg)) if msg == "Invalid date format"
        );
    }

    #[test]
    fn is_present_accepts_form_strings() {
        let req: RecordAttendanceRequest =
            serde_json::from_value(serde_json::json!({ "date": "2025-03-01", "isPresent": "false" }))
                .unwrap();
        assert_eq!(req.is_present, Some(false));
        assert!(req.remarks.is_none());
    }
}
