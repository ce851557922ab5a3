//! Field-level validators shared by request DTOs.
//!
//! Each `validate_*` function has the signature the `validator` derive expects
//! for `#[validate(custom(function = ...))]`, so DTOs in the API crate can
//! declare their schema and still report failures per field.

use std::borrow::Cow;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use validator::ValidationError;

use crate::order::{OrderStatus, PaymentCondition, Priority};
use crate::product::Dimension;
use crate::roles::StaffRole;
use crate::types::Timestamp;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{10}$").expect("valid regex"));

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("valid regex"));

fn field_error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if PHONE_RE.is_match(phone.trim()) {
        Ok(())
    } else {
        Err(field_error(
            "phone",
            "Please enter a valid 10-digit phone number",
        ))
    }
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if EMAIL_RE.is_match(email.trim()) {
        Ok(())
    } else {
        Err(field_error("email", "Please enter a valid email"))
    }
}

/// Rejects strings that are empty once trimmed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(field_error("blank", "must not be blank"))
    } else {
        Ok(())
    }
}

pub fn validate_role(role: &str) -> Result<(), ValidationError> {
    role.parse::<StaffRole>()
        .map(|_| ())
        .map_err(|msg| field_error("role", msg))
}

pub fn validate_dimension(dimension: &str) -> Result<(), ValidationError> {
    dimension
        .parse::<Dimension>()
        .map(|_| ())
        .map_err(|msg| field_error("dimension", msg))
}

pub fn validate_order_status(status: &str) -> Result<(), ValidationError> {
    status
        .parse::<OrderStatus>()
        .map(|_| ())
        .map_err(|msg| field_error("status", msg))
}

pub fn validate_payment_condition(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<PaymentCondition>()
        .map(|_| ())
        .map_err(|msg| field_error("paymentCondition", msg))
}

pub fn validate_priority(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<Priority>()
        .map(|_| ())
        .map_err(|msg| field_error("priority", msg))
}

/// Parse a client-supplied date.
///
/// Accepts full RFC 3339 timestamps (`2025-03-01T10:30:00Z`) and plain
/// calendar dates (`2025-03-01`, read as UTC midnight). Returns `None` for
/// anything else.
pub fn parse_client_date(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
