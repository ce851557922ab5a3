//! Route definitions for orders.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, put};
use axum::Router;

use crate::handlers::order;
use crate::state::AppState;

/// Largest accepted order body, image included.
const MAX_ORDER_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Order routes mounted at `/orders`.
///
/// ```text
/// GET    /                              -> list_orders
/// POST   /                              -> create_order
/// GET    /status/{status}               -> orders_by_status
/// GET    /date-range/{start}/{end}      -> orders_by_date_range
/// GET    /assigned/{staffId}            -> orders_by_assignee
/// GET    /created/{staffId}             -> orders_by_creator
/// GET    /{id}                          -> get_order
/// PUT    /{id}                          -> update_order
/// DELETE /{id}                          -> delete_order
/// PUT    /{id}/paid                     -> mark_order_paid
/// PUT    /{id}/delivery-person          -> assign_delivery_person
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(order::list_orders).post(order::create_order))
        .route("/status/{status}", get(order::orders_by_status))
        .route("/date-range/{start}/{end}", get(order::orders_by_date_range))
        .route("/assigned/{staff_id}", get(order::orders_by_assignee))
        .route("/created/{staff_id}", get(order::orders_by_creator))
        .route(
            "/{id}",
            get(order::get_order)
                .put(order::update_order)
                .delete(order::delete_order),
        )
        .route("/{id}/paid", put(order::mark_order_paid))
        .route("/{id}/delivery-person", put(order::assign_delivery_person))
        .layer(DefaultBodyLimit::max(MAX_ORDER_BODY_BYTES))
}
