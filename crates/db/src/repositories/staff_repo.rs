//! Repository for the `staff` table.

use sarathi_core::attendance::AttendanceRecord;
use sarathi_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::staff::{CreateStaff, Staff, UpdateStaff};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, phone, password_hash, role, email, attendance, \
                       created_at, updated_at";

/// Provides CRUD and attendance persistence for staff accounts.
pub struct StaffRepo;

impl StaffRepo {
    /// Insert a new staff account, returning the created row.
    ///
    /// A duplicate phone surfaces as a `23505` error on `uq_staff_phone`.
    pub async fn create(pool: &PgPool, input: &CreateStaff) -> Result<Staff, sqlx::Error> {
        let query = format!(
            "INSERT INTO staff (name, phone, password_hash, role, email)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Staff>(&query)
            .bind(&input.name)
            .bind(&input.phone)
            .bind(&input.password_hash)
            .bind(&input.role)
            .bind(&input.email)
            .fetch_one(pool)
            .await
    }

    /// Insert the account unless one with the same phone already exists.
    ///
    /// Returns `true` if a row was inserted.
    pub async fn insert_if_absent(pool: &PgPool, input: &CreateStaff) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO staff (name, phone, password_hash, role, email)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (phone) DO NOTHING",
        )
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.password_hash)
        .bind(&input.role)
        .bind(&input.email)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find a staff account by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Staff>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM staff WHERE id = $1");
        sqlx::query_as::<_, Staff>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a staff account by phone number.
    pub async fn find_by_phone(pool: &PgPool, phone: &str) -> Result<Option<Staff>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM staff WHERE phone = $1");
        sqlx::query_as::<_, Staff>(&query)
            .bind(phone)
            .fetch_optional(pool)
            .await
    }

    /// Resolve the id of the account registered under `email`.
    ///
    /// Emails are stored lowercased; the lookup lowercases its input too.
    pub async fn find_id_by_email(pool: &PgPool, email: &str) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM staff WHERE email = LOWER($1) ORDER BY id LIMIT 1",
        )
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// List all staff ordered by most recently created first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Staff>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM staff ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Staff>(&query).fetch_all(pool).await
    }

    /// Update a staff account. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateStaff,
    ) -> Result<Option<Staff>, sqlx::Error> {
        let query = format!(
            "UPDATE staff SET
                name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                role = COALESCE($4, role),
                email = COALESCE($5, email),
                password_hash = COALESCE($6, password_hash)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Staff>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.phone)
            .bind(&input.role)
            .bind(&input.email)
            .bind(&input.password_hash)
            .fetch_optional(pool)
            .await
    }

    /// Replace the embedded attendance list.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn replace_attendance(
        pool: &PgPool,
        id: DbId,
        attendance: &[AttendanceRecord],
    ) -> Result<Option<Staff>, sqlx::Error> {
        let query = format!(
            "UPDATE staff SET attendance = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Staff>(&query)
            .bind(id)
            .bind(Json(attendance))
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete a staff account. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM staff WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
