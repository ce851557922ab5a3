//! Product entity model and DTOs.

use sarathi_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `products` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: DbId,
    pub name: String,
    pub stock: f64,
    pub dimension: String,
    pub threshold: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a product. `dimension` must already be validated.
#[derive(Debug, Clone)]
pub struct CreateProduct {
    pub name: String,
    pub stock: f64,
    pub dimension: String,
    pub threshold: Option<f64>,
}

/// DTO for patching a product. All fields are optional.
#[derive(Debug, Clone, Default)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub stock: Option<f64>,
    pub dimension: Option<String>,
    pub threshold: Option<f64>,
}
