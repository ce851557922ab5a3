//! Handlers for the `/products` resource.
//!
//! Reads are public; create, update and delete need any valid token.

use axum::extract::State;
use axum::http::StatusCode;
use sarathi_core::error::CoreError;
use sarathi_core::product::DEFAULT_DIMENSION;
use sarathi_core::types::DbId;
use sarathi_core::validation::{validate_dimension, validate_not_blank};
use sarathi_db::models::product::{CreateProduct, Product, UpdateProduct};
use sarathi_db::repositories::ProductRepo;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::{Json, Path};
use crate::middleware::rbac::RequireAuth;
use crate::payload::lenient;
use crate::state::AppState;

const PRODUCT_ENTITY: &str = "Product";

/// Request body for `POST /products`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[serde(default, deserialize_with = "lenient::string")]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    #[validate(range(min = 0.0, message = "Stock cannot be negative"))]
    pub stock: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string")]
    #[validate(custom(function = "validate_dimension"))]
    pub dimension: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    #[validate(range(min = 0.0, message = "Threshold cannot be negative"))]
    pub threshold: Option<f64>,
}

/// Request body for `PUT /products/{id}`. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[serde(default, deserialize_with = "lenient::string")]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    #[validate(range(min = 0.0, message = "Stock cannot be negative"))]
    pub stock: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string")]
    #[validate(custom(function = "validate_dimension"))]
    pub dimension: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    #[validate(range(min = 0.0, message = "Threshold cannot be negative"))]
    pub threshold: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ProductDeletedResponse {
    pub message: &'static str,
    pub product: Product,
}

/// GET /api/products
pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    let products = ProductRepo::list(&state.pool).await?;
    Ok(Json(products))
}

/// GET /api/products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Product>> {
    let product = ProductRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: PRODUCT_ENTITY,
            id,
        })?;
    Ok(Json(product))
}

/// POST /api/products
///
/// Stock defaults to 0 and dimension to `Pc` when omitted.
pub async fn create_product(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let Some(name) = input.name.as_deref() else {
        return Err(CoreError::InvalidFields {
            message: "Validation error".into(),
            details: json!({ "name": "Product name is required" }),
        }
        .into());
    };
    input.validate()?;

    let dto = CreateProduct {
        name: name.to_string(),
        stock: input.stock.unwrap_or(0.0),
        dimension: input
            .dimension
            .clone()
            .unwrap_or_else(|| DEFAULT_DIMENSION.as_str().to_string()),
        threshold: input.threshold,
    };

    let product = ProductRepo::create(&state.pool, &dto).await?;
    tracing::info!(
        product_id = product.id,
        created_by = user.staff_id,
        "Product created"
    );

    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/products/{id}
pub async fn update_product(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProductRequest>,
) -> AppResult<Json<Product>> {
    input.validate()?;

    let dto = UpdateProduct {
        name: input.name,
        stock: input.stock,
        dimension: input.dimension,
        threshold: input.threshold,
    };

    let product = ProductRepo::update(&state.pool, id, &dto)
        .await?
        .ok_or(CoreError::NotFound {
            entity: PRODUCT_ENTITY,
            id,
        })?;
    tracing::info!(product_id = id, updated_by = user.staff_id, "Product updated");

    Ok(Json(product))
}

/// DELETE /api/products/{id}
///
/// Responds with the removed product.
pub async fn delete_product(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<ProductDeletedResponse>> {
    let product = ProductRepo::delete(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: PRODUCT_ENTITY,
            id,
        })?;
    tracing::info!(product_id = id, deleted_by = user.staff_id, "Product deleted");

    Ok(Json(ProductDeletedResponse {
        message: "Product deleted successfully",
        product,
    }))
}
