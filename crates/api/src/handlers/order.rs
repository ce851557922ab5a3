//! Handlers for the `/orders` resource.
//!
//! Reads are public. Create and update accept either JSON or
//! `multipart/form-data` (see [`OrderPayload`]); an attached `orderImage`
//! is pushed to the image store and its URL saved on the order. Order
//! numbers come from the database counter, never from the client.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use sarathi_cloud::format::public_id_from_url;
use sarathi_cloud::{UploadRequest, UploadedImage};
use sarathi_core::attendance::end_of_day;
use sarathi_core::error::CoreError;
use sarathi_core::order::{is_special_assignment, OrderItem, OrderStatus, PaymentCondition, Priority};
use sarathi_core::types::{DbId, Timestamp};
use sarathi_core::validation::{
    parse_client_date, validate_not_blank, validate_order_status, validate_payment_condition,
    validate_priority,
};
use sarathi_db::models::order::{CreateOrder, MarkPaid, Order, UpdateOrder};
use sarathi_db::repositories::{OrderRepo, StaffRepo};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{Json, Path};
use crate::middleware::rbac::RequireAuth;
use crate::payload::{lenient, OrderPayload};
use crate::response::MessageResponse;
use crate::state::AppState;

const ORDER_ENTITY: &str = "Order";

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Decoded body of `POST /orders`.
///
/// `iswithout` and `orderNumber` are not accepted; both are derived.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default, deserialize_with = "lenient::string")]
    #[validate(custom(function = "validate_not_blank"))]
    pub customer_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub customer_email: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    #[validate(custom(function = "validate_not_blank"))]
    pub customer_phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub customer_address: Option<String>,
    #[serde(default, deserialize_with = "lenient::items")]
    pub items: Option<Vec<OrderItem>>,
    #[serde(default, deserialize_with = "lenient::number")]
    #[validate(range(min = 0.0, message = "Total cannot be negative"))]
    pub total: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string")]
    #[validate(custom(function = "validate_order_status"))]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient::id")]
    pub created_by: Option<DbId>,
    #[serde(default, deserialize_with = "lenient::id")]
    pub assigned_to: Option<DbId>,
    #[serde(default, deserialize_with = "lenient::id")]
    pub delivery_person: Option<DbId>,
    #[serde(default, deserialize_with = "lenient::string")]
    #[validate(custom(function = "validate_payment_condition"))]
    pub payment_condition: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    #[validate(custom(function = "validate_priority"))]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub dispatch_date: Option<Timestamp>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub scheduled_date: Option<Timestamp>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub order_image: Option<String>,
}

/// Decoded body of `PUT /orders/{id}`.
///
/// Absent fields are left unchanged. Nullable fields sent as `null` (or a
/// blank form value) are cleared.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    #[serde(default, deserialize_with = "lenient::string")]
    #[validate(custom(function = "validate_not_blank"))]
    pub customer_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::clearable_string")]
    pub customer_email: Option<Option<String>>,
    #[serde(default, deserialize_with = "lenient::string")]
    #[validate(custom(function = "validate_not_blank"))]
    pub customer_phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::clearable_string")]
    pub customer_address: Option<Option<String>>,
    #[serde(default, deserialize_with = "lenient::items")]
    pub items: Option<Vec<OrderItem>>,
    #[serde(default, deserialize_with = "lenient::number")]
    #[validate(range(min = 0.0, message = "Total cannot be negative"))]
    pub total: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string")]
    #[validate(custom(function = "validate_order_status"))]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::clearable_string")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "lenient::id")]
    pub created_by: Option<DbId>,
    #[serde(default, deserialize_with = "lenient::clearable_id")]
    pub assigned_to: Option<Option<DbId>>,
    #[serde(default, deserialize_with = "lenient::clearable_id")]
    pub delivery_person: Option<Option<DbId>>,
    #[serde(default, deserialize_with = "lenient::string")]
    #[validate(custom(function = "validate_payment_condition"))]
    pub payment_condition: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    #[validate(custom(function = "validate_priority"))]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "lenient::clearable_timestamp")]
    pub dispatch_date: Option<Option<Timestamp>>,
    #[serde(default, deserialize_with = "lenient::clearable_timestamp")]
    pub scheduled_date: Option<Option<Timestamp>>,
    #[serde(default, deserialize_with = "lenient::clearable_string")]
    pub order_image: Option<Option<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkPaidRequest {
    #[serde(default, deserialize_with = "lenient::string")]
    pub paid_by: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub payment_received_by: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignDeliveryRequest {
    #[serde(default, deserialize_with = "lenient::id")]
    pub delivery_person_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `{ field: message }` for each required field that is absent, or `None`
/// when all are present.
fn missing_fields(checks: &[(&str, bool, &str)]) -> Option<Value> {
    let missing: Map<String, Value> = checks
        .iter()
        .filter(|(_, present, _)| !present)
        .map(|(field, _, message)| (field.to_string(), Value::String(message.to_string())))
        .collect();
    (!missing.is_empty()).then_some(Value::Object(missing))
}

/// Decode a JSON body that may be empty.
fn optional_json<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))
}

fn parse_path_date(raw: &str) -> Result<Timestamp, AppError> {
    parse_client_date(raw).ok_or_else(|| AppError::BadRequest("Invalid date format".into()))
}

async fn special_staff_id(state: &AppState) -> Result<Option<DbId>, sqlx::Error> {
    StaffRepo::find_id_by_email(&state.pool, &state.config.special_staff_email).await
}

/// Push the attached image, if any.
async fn store_image(
    state: &AppState,
    image: Option<UploadRequest>,
) -> Result<Option<UploadedImage>, AppError> {
    let Some(image) = image else {
        return Ok(None);
    };
    let filename = image.filename.clone();
    let uploaded = state.images.upload(image).await?;
    tracing::info!(
        filename = %filename,
        public_id = %uploaded.public_id,
        "Order image uploaded"
    );
    Ok(Some(uploaded))
}

/// Destroy `public_id` on the image host in the background. Failures are
/// logged and never reach the client.
fn spawn_image_destroy(state: &AppState, public_id: String) {
    let images = state.images.clone();
    tokio::spawn(async move {
        match images.destroy(&public_id).await {
            Ok(()) => tracing::debug!(public_id = %public_id, "Order image removed"),
            Err(e) => {
                tracing::warn!(public_id = %public_id, error = %e, "Order image cleanup failed")
            }
        }
    });
}

/// Remove the stored image behind `url` in the background.
fn spawn_image_cleanup(state: &AppState, order_id: DbId, url: &str) {
    match public_id_from_url(url, state.images.folder()) {
        Some(public_id) => {
            tracing::debug!(order_id, public_id = %public_id, "Scheduling order image cleanup");
            spawn_image_destroy(state, public_id);
        }
        None => {
            tracing::warn!(order_id, url, "Could not derive image public id; skipping cleanup")
        }
    }
}

/// Drop an upload whose order write did not go through.
fn discard_upload(state: &AppState, uploaded: Option<UploadedImage>) {
    if let Some(image) = uploaded {
        tracing::warn!(public_id = %image.public_id, "Order write failed; removing uploaded image");
        spawn_image_destroy(state, image.public_id);
    }
}

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: ORDER_ENTITY,
        id,
    }
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// POST /api/orders
///
/// `createdBy` defaults to the caller. `iswithout` is set only when the
/// order is assigned to the special staff account.
pub async fn create_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    payload: OrderPayload,
) -> AppResult<(StatusCode, Json<Order>)> {
    let input: CreateOrderRequest = payload.decode()?;

    if let Some(details) = missing_fields(&[
        ("customerName", input.customer_name.is_some(), "Customer name is required"),
        ("customerPhone", input.customer_phone.is_some(), "Customer phone is required"),
        ("total", input.total.is_some(), "Total is required"),
    ]) {
        return Err(CoreError::InvalidFields {
            message: "Validation error".into(),
            details,
        }
        .into());
    }
    input.validate()?;

    let special_id = special_staff_id(&state).await?;
    let is_without = is_special_assignment(input.assigned_to, special_id);

    let uploaded = store_image(&state, payload.image).await?;
    let order_image = match &uploaded {
        Some(image) => Some(image.secure_url.clone()),
        None => input.order_image,
    };

    let dto = CreateOrder {
        customer_name: input.customer_name.unwrap_or_default(),
        customer_email: input.customer_email,
        customer_phone: input.customer_phone.unwrap_or_default(),
        customer_address: input.customer_address,
        items: input.items.unwrap_or_default(),
        total: input.total.unwrap_or_default(),
        status: input
            .status
            .unwrap_or_else(|| OrderStatus::default().as_str().to_string()),
        notes: input.notes,
        created_by: input.created_by.unwrap_or(user.staff_id),
        assigned_to: input.assigned_to,
        delivery_person: input.delivery_person,
        payment_condition: input
            .payment_condition
            .unwrap_or_else(|| PaymentCondition::default().as_str().to_string()),
        priority: input
            .priority
            .unwrap_or_else(|| Priority::default().as_str().to_string()),
        dispatch_date: input.dispatch_date,
        scheduled_date: input.scheduled_date,
        order_image,
        is_without,
    };

    let order = match OrderRepo::create(&state.pool, &dto).await {
        Ok(order) => order,
        Err(e) => {
            discard_upload(&state, uploaded);
            return Err(e.into());
        }
    };
    tracing::info!(
        order_id = order.id,
        order_number = %order.order_number,
        created_by = order.created_by,
        is_without,
        "Order created"
    );

    Ok((StatusCode::CREATED, Json(order)))
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/orders
pub async fn list_orders(State(state): State<AppState>) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(OrderRepo::list(&state.pool).await?))
}

/// GET /api/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Order>> {
    let order = OrderRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(not_found(id))?;
    Ok(Json(order))
}

/// GET /api/orders/status/{status}
///
/// Exact match; an unknown status simply matches nothing.
pub async fn orders_by_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(OrderRepo::list_by_status(&state.pool, &status).await?))
}

/// GET /api/orders/date-range/{start}/{end}
///
/// Orders created from `start` through the last millisecond of `end`'s day.
pub async fn orders_by_date_range(
    State(state): State<AppState>,
    Path((start, end)): Path<(String, String)>,
) -> AppResult<Json<Vec<Order>>> {
    let start = parse_path_date(&start)?;
    let end = end_of_day(parse_path_date(&end)?);
    Ok(Json(
        OrderRepo::list_created_between(&state.pool, start, end).await?,
    ))
}

/// GET /api/orders/assigned/{staffId}
pub async fn orders_by_assignee(
    State(state): State<AppState>,
    Path(staff_id): Path<DbId>,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(OrderRepo::list_by_assignee(&state.pool, staff_id).await?))
}

/// GET /api/orders/created/{staffId}
pub async fn orders_by_creator(
    State(state): State<AppState>,
    Path(staff_id): Path<DbId>,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(OrderRepo::list_by_creator(&state.pool, staff_id).await?))
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// PUT /api/orders/{id}
///
/// Partial update. Any change to `assignedTo`, including clearing it,
/// recomputes `iswithout`; the order number never changes.
pub async fn update_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DbId>,
    payload: OrderPayload,
) -> AppResult<Json<Order>> {
    let input: UpdateOrderRequest = payload.decode()?;
    input.validate()?;

    let existing = OrderRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(not_found(id))?;

    let is_without = match input.assigned_to {
        Some(assignee) => Some(is_special_assignment(
            assignee,
            special_staff_id(&state).await?,
        )),
        None => None,
    };

    let uploaded = store_image(&state, payload.image).await?;
    let order_image = match &uploaded {
        Some(image) => Some(Some(image.secure_url.clone())),
        None => input.order_image,
    };

    let dto = UpdateOrder {
        customer_name: input.customer_name,
        customer_email: input.customer_email,
        customer_phone: input.customer_phone,
        customer_address: input.customer_address,
        items: input.items,
        total: input.total,
        status: input.status,
        notes: input.notes,
        created_by: input.created_by,
        assigned_to: input.assigned_to,
        delivery_person: input.delivery_person,
        payment_condition: input.payment_condition,
        priority: input.priority,
        dispatch_date: input.dispatch_date,
        scheduled_date: input.scheduled_date,
        order_image,
        is_without,
    };

    let order = match OrderRepo::update(&state.pool, id, &dto).await {
        Ok(Some(order)) => order,
        Ok(None) => {
            discard_upload(&state, uploaded);
            return Err(not_found(id).into());
        }
        Err(e) => {
            discard_upload(&state, uploaded);
            return Err(e.into());
        }
    };
    tracing::info!(
        order_id = id,
        order_number = %order.order_number,
        updated_by = user.staff_id,
        "Order updated"
    );

    // A replaced or cleared image is no longer referenced.
    if let Some(previous) = existing.order_image.as_deref() {
        if order.order_image.as_deref() != Some(previous) {
            spawn_image_cleanup(&state, id, previous);
        }
    }

    Ok(Json(order))
}

/// PUT /api/orders/{id}/paid
///
/// Marks the order paid without touching its status. The body is optional.
pub async fn mark_order_paid(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DbId>,
    body: Bytes,
) -> AppResult<Json<Order>> {
    let input: MarkPaidRequest = optional_json(&body)?;
    let dto = MarkPaid {
        paid_by: input.paid_by,
        payment_received_by: input.payment_received_by,
    };

    let order = OrderRepo::mark_paid(&state.pool, id, &dto)
        .await?
        .ok_or(not_found(id))?;
    tracing::info!(
        order_id = id,
        order_number = %order.order_number,
        recorded_by = user.staff_id,
        "Order marked paid"
    );

    Ok(Json(order))
}

/// PUT /api/orders/{orderId}/delivery-person
pub async fn assign_delivery_person(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(order_id): Path<DbId>,
    body: Bytes,
) -> AppResult<Json<Order>> {
    let input: AssignDeliveryRequest = optional_json(&body)?;
    let delivery_person = input
        .delivery_person_id
        .ok_or_else(|| AppError::BadRequest("Delivery person ID is required".into()))?;

    let order = OrderRepo::assign_delivery_person(&state.pool, order_id, delivery_person)
        .await?
        .ok_or(not_found(order_id))?;
    tracing::info!(
        order_id,
        delivery_person,
        assigned_by = user.staff_id,
        "Delivery person assigned"
    );

    Ok(Json(order))
}

/// DELETE /api/orders/{id}
///
/// The row goes first; image cleanup follows in the background.
pub async fn delete_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    let order = OrderRepo::delete(&state.pool, id)
        .await?
        .ok_or(not_found(id))?;
    tracing::info!(
        order_id = id,
        order_number = %order.order_number,
        deleted_by = user.staff_id,
        "Order deleted"
    );

    if let Some(url) = order.order_image.as_deref() {
        spawn_image_cleanup(&state, id, url);
    }

    Ok(Json(MessageResponse::new("Order deleted successfully")))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_fields_lists_only_absent_ones() {
        let details = missing_fields(&[
            ("customerName", true, "Customer name is required"),
            ("total", false, "Total is required"),
        ])
        .unwrap();
        assert_eq!(details, json!({ "total": "Total is required" }));

        assert!(missing_fields(&[("customerName", true, "x")]).is_none());
    }

    #[test]
    fn unknown_status_fails_validation() {
        let req: CreateOrderRequest = serde_json::from_value(json!({
            "customerName": "Asha", "customerPhone": "9000000000", "total": 10,
            "status": "shipped"
        }))
        .unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("status"));
    }

    #[test]
    fn client_iswithout_is_ignored() {
        let req: UpdateOrderRequest =
            serde_json::from_value(json!({ "iswithout": true, "orderNumber": "ORD999" }))
                .unwrap();
        assert!(req.validate().is_ok());
        assert!(req.assigned_to.is_none());
    }

    #[test]
    fn null_assignee_decodes_as_unassign() {
        let req: UpdateOrderRequest =
            serde_json::from_value(json!({ "assignedTo": null, "notes": null })).unwrap();
        assert_eq!(req.assigned_to, Some(None));
        assert_eq!(req.notes, Some(None));
        assert_eq!(req.delivery_person, None);
    }

    #[test]
    fn empty_body_decodes_to_default() {
        let req: MarkPaidRequest = optional_json(&Bytes::new()).unwrap();
        assert!(req.paid_by.is_none());

        let req: AssignDeliveryRequest =
            optional_json(&Bytes::from_static(br#"{"deliveryPersonId":"12"}"#)).unwrap();
        assert_eq!(req.delivery_person_id, Some(12));
    }

    #[test]
    fn malformed_json_body_is_a_bad_request() {
        assert_matches!(
            optional_json::<MarkPaidRequest>(&Bytes::from_static(b"{oops")),
            Err(AppError::BadRequest(_))
        );
    }

    #[test]
    fn path_dates_accept_plain_days() {
        assert!(parse_path_date("2025-03-01").is_ok());
        assert_matches!(parse_path_date("03/01/2025"), Err(AppError::BadRequest(_)));
    }
}
