//! Repository for the `orders` table.

use sarathi_core::order::{format_order_number, highest_order_sequence};
use sarathi_core::types::{DbId, Timestamp};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::order::{CreateOrder, MarkPaid, Order, UpdateOrder};
use crate::repositories::order_counter_repo::{OrderCounterRepo, ORDER_NUMBER_COUNTER};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, order_number, customer_name, customer_email, customer_phone, \
                       customer_address, items, total, status, notes, created_by, assigned_to, \
                       delivery_person, payment_condition, priority, dispatch_date, \
                       scheduled_date, order_image, is_paid, paid_at, paid_by, \
                       payment_received_by, is_without, created_at, updated_at";

/// Provides CRUD operations and filtered listings for orders.
pub struct OrderRepo;

impl OrderRepo {
    /// Insert a new order, assigning the next display order number.
    ///
    /// The counter increment and the insert share one transaction: if the
    /// insert fails, the sequence value is rolled back with it.
    pub async fn create(pool: &PgPool, input: &CreateOrder) -> Result<Order, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let sequence = OrderCounterRepo::next_value(&mut *tx, ORDER_NUMBER_COUNTER).await?;
        let order_number = format_order_number(sequence);

        let query = format!(
            "INSERT INTO orders (
                order_number, customer_name, customer_email, customer_phone,
                customer_address, items, total, status, notes, created_by,
                assigned_to, delivery_person, payment_condition, priority,
                dispatch_date, scheduled_date, order_image, is_without
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
             RETURNING {COLUMNS}"
        );
        let order = sqlx::query_as::<_, Order>(&query)
            .bind(&order_number)
            .bind(&input.customer_name)
            .bind(&input.customer_email)
            .bind(&input.customer_phone)
            .bind(&input.customer_address)
            .bind(Json(&input.items))
            .bind(input.total)
            .bind(&input.status)
            .bind(&input.notes)
            .bind(input.created_by)
            .bind(input.assigned_to)
            .bind(input.delivery_person)
            .bind(&input.payment_condition)
            .bind(&input.priority)
            .bind(input.dispatch_date)
            .bind(input.scheduled_date)
            .bind(&input.order_image)
            .bind(input.is_without)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(order)
    }

    /// Find an order by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Order>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders WHERE id = $1");
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all orders, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Order>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Order>(&query).fetch_all(pool).await
    }

    /// List orders with an exact status match, newest first.
    pub async fn list_by_status(pool: &PgPool, status: &str) -> Result<Vec<Order>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM orders WHERE status = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    /// List orders created within `[start, end]` (both inclusive), newest first.
    pub async fn list_created_between(
        pool: &PgPool,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<Order>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM orders WHERE created_at BETWEEN $1 AND $2
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(start)
            .bind(end)
            .fetch_all(pool)
            .await
    }

    /// List orders assigned to a staff member, newest first.
    pub async fn list_by_assignee(pool: &PgPool, staff_id: DbId) -> Result<Vec<Order>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM orders WHERE assigned_to = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(staff_id)
            .fetch_all(pool)
            .await
    }

    /// List orders created by a staff member, newest first.
    pub async fn list_by_creator(pool: &PgPool, staff_id: DbId) -> Result<Vec<Order>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM orders WHERE created_by = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(staff_id)
            .fetch_all(pool)
            .await
    }

    /// Update an order. Only non-`None` fields in `input` are applied; a
    /// `Some(None)` on a nullable column sets it to NULL.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateOrder,
    ) -> Result<Option<Order>, sqlx::Error> {
        let query = format!(
            "UPDATE orders SET
                customer_name = COALESCE($2, customer_name),
                customer_phone = COALESCE($3, customer_phone),
                items = COALESCE($4, items),
                total = COALESCE($5, total),
                status = COALESCE($6, status),
                created_by = COALESCE($7, created_by),
                payment_condition = COALESCE($8, payment_condition),
                priority = COALESCE($9, priority),
                is_without = COALESCE($10, is_without),
                customer_email = CASE WHEN $11 THEN $12 ELSE customer_email END,
                customer_address = CASE WHEN $13 THEN $14 ELSE customer_address END,
                notes = CASE WHEN $15 THEN $16 ELSE notes END,
                assigned_to = CASE WHEN $17 THEN $18 ELSE assigned_to END,
                delivery_person = CASE WHEN $19 THEN $20 ELSE delivery_person END,
                dispatch_date = CASE WHEN $21 THEN $22 ELSE dispatch_date END,
                scheduled_date = CASE WHEN $23 THEN $24 ELSE scheduled_date END,
                order_image = CASE WHEN $25 THEN $26 ELSE order_image END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .bind(&input.customer_name)
            .bind(&input.customer_phone)
            .bind(input.items.as_ref().map(Json))
            .bind(input.total)
            .bind(&input.status)
            .bind(input.created_by)
            .bind(&input.payment_condition)
            .bind(&input.priority)
            .bind(input.is_without)
            .bind(input.customer_email.is_some())
            .bind(input.customer_email.clone().flatten())
            .bind(input.customer_address.is_some())
            .bind(input.customer_address.clone().flatten())
            .bind(input.notes.is_some())
            .bind(input.notes.clone().flatten())
            .bind(input.assigned_to.is_some())
            .bind(input.assigned_to.flatten())
            .bind(input.delivery_person.is_some())
            .bind(input.delivery_person.flatten())
            .bind(input.dispatch_date.is_some())
            .bind(input.dispatch_date.flatten())
            .bind(input.scheduled_date.is_some())
            .bind(input.scheduled_date.flatten())
            .bind(input.order_image.is_some())
            .bind(input.order_image.clone().flatten())
            .fetch_optional(pool)
            .await
    }

    /// Mark an order paid, stamping `paid_at` with the database clock.
    ///
    /// Status and every other field are left untouched.
    pub async fn mark_paid(
        pool: &PgPool,
        id: DbId,
        input: &MarkPaid,
    ) -> Result<Option<Order>, sqlx::Error> {
        let query = format!(
            "UPDATE orders SET
                is_paid = TRUE,
                paid_at = NOW(),
                paid_by = $2,
                payment_received_by = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .bind(&input.paid_by)
            .bind(&input.payment_received_by)
            .fetch_optional(pool)
            .await
    }

    /// Set only the delivery person.
    pub async fn assign_delivery_person(
        pool: &PgPool,
        id: DbId,
        delivery_person: DbId,
    ) -> Result<Option<Order>, sqlx::Error> {
        let query = format!(
            "UPDATE orders SET delivery_person = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .bind(delivery_person)
            .fetch_optional(pool)
            .await
    }

    /// Delete an order, returning the removed row if it existed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Order>, sqlx::Error> {
        let query = format!("DELETE FROM orders WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Raise the order-number counter to the highest sequence already in use.
    ///
    /// Rows imported without going through [`OrderRepo::create`] (or created
    /// before the counter existed) would otherwise collide with freshly
    /// issued numbers. Returns the counter value after syncing.
    pub async fn sync_order_counter(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let numbers: Vec<String> = sqlx::query_scalar("SELECT order_number FROM orders")
            .fetch_all(pool)
            .await?;
        let highest = highest_order_sequence(numbers.iter().map(String::as_str));

        let value = OrderCounterRepo::advance_to(pool, ORDER_NUMBER_COUNTER, highest).await?;
        tracing::debug!(highest, counter = value, "Order number counter synced");
        Ok(value)
    }
}
