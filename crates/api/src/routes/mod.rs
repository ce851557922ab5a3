pub mod health;
pub mod order;
pub mod product;
pub mod staff;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /health                                   service + database health (public)
///
/// /staff/login                              login (public)
/// /staff                                    list (auth), create (admin)
/// /staff/{id}                               get (auth), update, delete (admin)
/// /staff/{staffId}/attendance               record, query (admin or executive)
/// /staff/attendance/date                    roster for one day (admin or executive)
///
/// /products                                 list (public), create (auth)
/// /products/{id}                            get (public), update, delete (auth)
///
/// /orders                                   list (public), create (auth)
/// /orders/{id}                              get (public), update, delete (auth)
/// /orders/status/{status}                   filter by status
/// /orders/date-range/{start}/{end}          filter by creation date
/// /orders/assigned/{staffId}                filter by assignee
/// /orders/created/{staffId}                 filter by creator
/// /orders/{id}/paid                         mark paid (auth)
/// /orders/{orderId}/delivery-person         assign delivery person (auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/staff", staff::router())
        .nest("/products", product::router())
        .nest("/orders", order::router())
}
