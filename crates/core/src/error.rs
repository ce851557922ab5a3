use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Validation failure carrying a structured payload (which fields were
    /// missing, which values are accepted, ...).
    #[error("Validation failed: {message}")]
    InvalidFields {
        message: String,
        details: serde_json::Value,
    },

    /// A unique key already holds the submitted value.
    #[error("Duplicate value for {field}")]
    Duplicate { field: &'static str },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
