use std::sync::Arc;

use sarathi_cloud::ImageStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: sarathi_db::DbPool,
    /// Server configuration (JWT secret, special staff email, ...).
    pub config: Arc<ServerConfig>,
    /// Order image storage.
    pub images: Arc<dyn ImageStore>,
}
