//! Order entity model and DTOs.

use sarathi_core::order::OrderItem;
use sarathi_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `orders` table, serialized as-is to API clients.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: DbId,
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: String,
    pub customer_address: Option<String>,
    pub items: Json<Vec<OrderItem>>,
    pub total: f64,
    pub status: String,
    pub notes: Option<String>,
    pub created_by: DbId,
    pub assigned_to: Option<DbId>,
    pub delivery_person: Option<DbId>,
    pub payment_condition: String,
    pub priority: String,
    pub dispatch_date: Option<Timestamp>,
    pub scheduled_date: Option<Timestamp>,
    pub order_image: Option<String>,
    pub is_paid: bool,
    pub paid_at: Option<Timestamp>,
    pub paid_by: Option<String>,
    pub payment_received_by: Option<String>,
    /// Set when the order is assigned to the special staff account.
    #[serde(rename = "iswithout")]
    pub is_without: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting an order. The order number is assigned by the
/// repository, never by the caller.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: String,
    pub customer_address: Option<String>,
    pub items: Vec<OrderItem>,
    pub total: f64,
    pub status: String,
    pub notes: Option<String>,
    pub created_by: DbId,
    pub assigned_to: Option<DbId>,
    pub delivery_person: Option<DbId>,
    pub payment_condition: String,
    pub priority: String,
    pub dispatch_date: Option<Timestamp>,
    pub scheduled_date: Option<Timestamp>,
    pub order_image: Option<String>,
    pub is_without: bool,
}

/// DTO for patching an order. `None` leaves the column unchanged.
///
/// Nullable columns use `Option<Option<T>>`: `Some(None)` clears the value.
/// `order_number` and `created_at` are absent; both are fixed at creation.
#[derive(Debug, Clone, Default)]
pub struct UpdateOrder {
    pub customer_name: Option<String>,
    pub customer_email: Option<Option<String>>,
    pub customer_phone: Option<String>,
    pub customer_address: Option<Option<String>>,
    pub items: Option<Vec<OrderItem>>,
    pub total: Option<f64>,
    pub status: Option<String>,
    pub notes: Option<Option<String>>,
    pub created_by: Option<DbId>,
    pub assigned_to: Option<Option<DbId>>,
    pub delivery_person: Option<Option<DbId>>,
    pub payment_condition: Option<String>,
    pub priority: Option<String>,
    pub dispatch_date: Option<Option<Timestamp>>,
    pub scheduled_date: Option<Option<Timestamp>>,
    pub order_image: Option<Option<String>>,
    pub is_without: Option<bool>,
}

/// Attribution recorded when an order is marked paid.
#[derive(Debug, Clone, Default)]
pub struct MarkPaid {
    pub paid_by: Option<String>,
    pub payment_received_by: Option<String>,
}
