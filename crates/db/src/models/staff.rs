//! Staff entity model and DTOs.

use sarathi_core::attendance::AttendanceRecord;
use sarathi_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// Full row from the `staff` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`StaffResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct Staff {
    pub id: DbId,
    pub name: String,
    pub phone: String,
    pub password_hash: String,
    pub role: String,
    pub email: Option<String>,
    pub attendance: Json<Vec<AttendanceRecord>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe staff representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffResponse {
    pub id: DbId,
    pub name: String,
    pub phone: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub created_at: Timestamp,
    pub attendance: Vec<AttendanceRecord>,
}

impl From<Staff> for StaffResponse {
    fn from(staff: Staff) -> Self {
        Self {
            id: staff.id,
            name: staff.name,
            phone: staff.phone,
            role: staff.role,
            email: staff.email,
            created_at: staff.created_at,
            attendance: staff.attendance.0,
        }
    }
}

/// DTO for inserting a staff account. The password is already hashed.
#[derive(Debug, Clone)]
pub struct CreateStaff {
    pub name: String,
    pub phone: String,
    pub password_hash: String,
    pub role: String,
    pub email: Option<String>,
}

/// DTO for patching a staff account. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateStaff {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}
