//! Handlers for the `/staff` resource (accounts and login).
//!
//! Listing and fetching require any valid token; mutations require the
//! `admin` role via [`RequireAdmin`]. Login is public.

use axum::extract::State;
use axum::http::StatusCode;
use sarathi_core::error::CoreError;
use sarathi_core::roles::{StaffRole, VALID_ROLES};
use sarathi_core::types::DbId;
use sarathi_core::validation::{validate_email, validate_not_blank, validate_phone, validate_role};
use sarathi_db::models::staff::{CreateStaff, StaffResponse, UpdateStaff};
use sarathi_db::repositories::StaffRepo;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::extract::{Json, Path};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::payload::lenient;
use crate::response::MessageResponse;
use crate::state::AppState;

const STAFF_ENTITY: &str = "Staff member";

/// Same body for unknown phone and wrong password.
const INVALID_CREDENTIALS: &str = "Invalid credentials";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /staff`.
///
/// Every field is optional at the type level so missing fields can be
/// reported together instead of failing on the first.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStaffRequest {
    #[serde(default, deserialize_with = "lenient::string")]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::secret")]
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    #[validate(custom(function = "validate_email"))]
    pub email: Option<String>,
}

/// Request body for `PUT /staff/{id}`. Absent fields are left unchanged;
/// a blank password keeps the current one.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStaffRequest {
    #[serde(default, deserialize_with = "lenient::string")]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::secret")]
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    #[validate(custom(function = "validate_role"))]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    #[validate(custom(function = "validate_email"))]
    pub email: Option<String>,
}

/// Request body for `POST /staff/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "lenient::string")]
    pub phone: Option<String>,
    #[serde(default)]
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub staff: StaffResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/staff
///
/// List every staff account, newest first. Password hashes are never included.
pub async fn list_staff(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> AppResult<Json<Vec<StaffResponse>>> {
    let staff = StaffRepo::list(&state.pool).await?;
    Ok(Json(staff.into_iter().map(StaffResponse::from).collect()))
}

/// GET /api/staff/{id}
pub async fn get_staff(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<StaffResponse>> {
    let staff = StaffRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: STAFF_ENTITY,
            id,
        })?;
    Ok(Json(staff.into()))
}

/// POST /api/staff
///
/// Create a staff account. Checks required fields and the role before field
/// validation, hashes the password, and returns 201 without the hash.
pub async fn create_staff(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateStaffRequest>,
) -> AppResult<(StatusCode, Json<StaffResponse>)> {
    let (Some(name), Some(phone), Some(password), Some(role)) = (
        input.name.as_deref(),
        input.phone.as_deref(),
        input.password.as_deref(),
        input.role.as_deref(),
    ) else {
        return Err(CoreError::InvalidFields {
            message: "Missing required fields".into(),
            details: json!({
                "name": input.name.is_some(),
                "phone": input.phone.is_some(),
                "password": input.password.is_some(),
                "role": input.role.is_some(),
            }),
        }
        .into());
    };

    let role: StaffRole = role.parse().map_err(|_| CoreError::InvalidFields {
        message: "Invalid role specified".into(),
        details: json!({
            "receivedRole": role,
            "validRoles": VALID_ROLES,
        }),
    })?;

    input.validate()?;

    let password_hash = hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let dto = CreateStaff {
        name: name.to_string(),
        phone: phone.to_string(),
        password_hash,
        role: role.as_str().to_string(),
        email: input.email.as_deref().map(normalize_email),
    };

    let staff = StaffRepo::create(&state.pool, &dto).await?;
    tracing::info!(
        staff_id = staff.id,
        role = %staff.role,
        created_by = admin.staff_id,
        "Staff member created"
    );

    Ok((StatusCode::CREATED, Json(staff.into())))
}

/// PUT /api/staff/{id}
///
/// Patch a staff account. The password is re-hashed only when a non-blank
/// new one is supplied.
pub async fn update_staff(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateStaffRequest>,
) -> AppResult<Json<StaffResponse>> {
    input.validate()?;

    let password_hash = match input.password.as_deref() {
        Some(password) => Some(
            hash_password(password)
                .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?,
        ),
        None => None,
    };

    let dto = UpdateStaff {
        name: input.name,
        phone: input.phone,
        role: input.role,
        email: input.email.as_deref().map(normalize_email),
        password_hash,
    };

    let staff = StaffRepo::update(&state.pool, id, &dto)
        .await?
        .ok_or(CoreError::NotFound {
            entity: STAFF_ENTITY,
            id,
        })?;
    tracing::info!(
        staff_id = staff.id,
        updated_by = admin.staff_id,
        password_changed = dto.password_hash.is_some(),
        "Staff member updated"
    );

    Ok(Json(staff.into()))
}

/// DELETE /api/staff/{id}
pub async fn delete_staff(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    if !StaffRepo::delete(&state.pool, id).await? {
        return Err(CoreError::NotFound {
            entity: STAFF_ENTITY,
            id,
        }
        .into());
    }
    tracing::info!(staff_id = id, deleted_by = admin.staff_id, "Staff member deleted");
    Ok(Json(MessageResponse::new("Staff member deleted successfully")))
}

/// POST /api/staff/login
///
/// Authenticate with phone + password. Returns a signed token and the
/// staff record.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let invalid = || AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into()));

    let phone = input.phone.ok_or_else(invalid)?;
    let staff = StaffRepo::find_by_phone(&state.pool, &phone)
        .await?
        .ok_or_else(invalid)?;

    let password_valid = verify_password(&input.password, &staff.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::debug!(staff_id = staff.id, "Login rejected: wrong password");
        return Err(invalid());
    }

    let token = generate_access_token(staff.id, &staff.phone, &staff.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(staff_id = staff.id, role = %staff.role, "Staff member logged in");
    Ok(Json(LoginResponse {
        token,
        staff: staff.into(),
    }))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
