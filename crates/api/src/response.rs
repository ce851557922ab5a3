//! Shared response bodies for API handlers.
//!
//! Resources are returned bare (clients read `order.orderNumber`, not
//! `data.orderNumber`); this covers the plain acknowledgement shape.

use serde::Serialize;

/// `{ "message": ... }` acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
