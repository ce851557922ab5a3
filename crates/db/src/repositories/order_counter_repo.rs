//! Repository for the `order_counters` table.
//!
//! Counters are advanced with a single `INSERT ... ON CONFLICT DO UPDATE`
//! statement, so two concurrent callers can never observe the same value.

use sqlx::{PgExecutor, PgPool};

/// Counter backing display order numbers.
pub const ORDER_NUMBER_COUNTER: &str = "order_number";

/// Provides atomic increment-and-fetch over named counters.
pub struct OrderCounterRepo;

impl OrderCounterRepo {
    /// Increment the counter and return its new value (`1` on first use).
    ///
    /// Accepts any executor so callers can run it inside the transaction
    /// that consumes the value.
    pub async fn next_value<'e, E>(executor: E, name: &str) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO order_counters (name, value) VALUES ($1, 1)
             ON CONFLICT (name) DO UPDATE SET value = order_counters.value + 1
             RETURNING value",
        )
        .bind(name)
        .fetch_one(executor)
        .await
    }

    /// Raise the counter to at least `floor`. Never lowers it.
    ///
    /// Returns the counter's value after the call.
    pub async fn advance_to(pool: &PgPool, name: &str, floor: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO order_counters (name, value) VALUES ($1, $2)
             ON CONFLICT (name) DO UPDATE SET value = GREATEST(order_counters.value, $2)
             RETURNING value",
        )
        .bind(name)
        .bind(floor)
        .fetch_one(pool)
        .await
    }

    /// Current value, or `None` if the counter was never used.
    pub async fn current(pool: &PgPool, name: &str) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT value FROM order_counters WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await
    }
}
