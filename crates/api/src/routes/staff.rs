//! Route definitions for staff accounts and attendance.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{attendance, staff};
use crate::state::AppState;

/// Staff routes mounted at `/staff`.
///
/// ```text
/// POST   /login                     -> login
/// GET    /attendance/date           -> attendance_by_date
/// GET    /                          -> list_staff
/// POST   /                          -> create_staff
/// GET    /{id}                      -> get_staff
/// PUT    /{id}                      -> update_staff
/// DELETE /{id}                      -> delete_staff
/// POST   /{id}/attendance           -> record_attendance
/// GET    /{id}/attendance           -> staff_attendance
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(staff::login))
        .route("/attendance/date", get(attendance::attendance_by_date))
        .route("/", get(staff::list_staff).post(staff::create_staff))
        .route(
            "/{id}",
            get(staff::get_staff)
                .put(staff::update_staff)
                .delete(staff::delete_staff),
        )
        .route(
            "/{id}/attendance",
            get(attendance::staff_attendance).post(attendance::record_attendance),
        )
}
