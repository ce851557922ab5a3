//! Order lifecycle enums, line items, and order-number formatting.
//!
//! Enum names must match the `CHECK` constraints on the `orders` table.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Status / payment / priority
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Invoice,
    Dispatched,
    Dc,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Invoice,
        OrderStatus::Dispatched,
        OrderStatus::Dc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Invoice => "invoice",
            OrderStatus::Dispatched => "dispatched",
            OrderStatus::Dc => "dc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentCondition {
    #[default]
    Immediate,
    Days15,
    Days30,
}

impl PaymentCondition {
    pub const ALL: [PaymentCondition; 3] = [
        PaymentCondition::Immediate,
        PaymentCondition::Days15,
        PaymentCondition::Days30,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentCondition::Immediate => "immediate",
            PaymentCondition::Days15 => "days15",
            PaymentCondition::Days30 => "days30",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Urgent,
    #[default]
    Normal,
}

impl Priority {
    pub const ALL: [Priority; 2] = [Priority::Urgent, Priority::Normal];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Urgent => "urgent",
            Priority::Normal => "normal",
        }
    }
}

/// Shared `FromStr` for the lowercase order enums: match against `ALL`.
fn parse_variant<T: Copy>(
    raw: &str,
    all: &[T],
    name: fn(T) -> &'static str,
    label: &str,
) -> Result<T, String> {
    all.iter().copied().find(|v| name(*v) == raw).ok_or_else(|| {
        let valid: Vec<&str> = all.iter().map(|v| name(*v)).collect();
        format!("'{raw}' is not a valid {label}. Must be one of: {valid:?}")
    })
}

impl FromStr for OrderStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant(s, &Self::ALL, Self::as_str, "status")
    }
}

impl FromStr for PaymentCondition {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant(s, &Self::ALL, Self::as_str, "payment condition")
    }
}

impl FromStr for Priority {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant(s, &Self::ALL, Self::as_str, "priority")
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Line items
// ---------------------------------------------------------------------------

/// A product line captured on the order at creation time.
///
/// `product_name` and `price` are a snapshot; later product edits do not
/// change existing orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: DbId,
    pub product_name: String,
    pub quantity: f64,
    pub price: f64,
}

// ---------------------------------------------------------------------------
// Order numbers
// ---------------------------------------------------------------------------

/// Prefix of every display order number.
pub const ORDER_NUMBER_PREFIX: &str = "ORD";

/// Minimum digit count; shorter sequences are zero-padded.
pub const ORDER_NUMBER_MIN_DIGITS: usize = 3;

static ORDER_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ORD(\d+)").expect("valid regex"));

/// Render a sequence value as a display order number (`7` -> `ORD007`).
pub fn format_order_number(sequence: i64) -> String {
    format!(
        "{ORDER_NUMBER_PREFIX}{sequence:0width$}",
        width = ORDER_NUMBER_MIN_DIGITS
    )
}

/// Extract the sequence value from a display order number.
///
/// Returns `None` when the string carries no `ORD<digits>` group or the
/// digits overflow an `i64`.
pub fn parse_order_sequence(order_number: &str) -> Option<i64> {
    ORDER_NUMBER_RE
        .captures(order_number)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Highest parseable sequence among `order_numbers`, or `0` when none parse.
///
/// Comparison is numeric, so `ORD1000` outranks `ORD999`.
pub fn highest_order_sequence<'a, I>(order_numbers: I) -> i64
where
    I: IntoIterator<Item = &'a str>,
{
    order_numbers
        .into_iter()
        .filter_map(parse_order_sequence)
        .max()
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Special-staff assignment
// ---------------------------------------------------------------------------

/// Whether an order assigned to `assigned_to` must carry the special-staff
/// flag. Only the special account's id sets it.
pub fn is_special_assignment(assigned_to: Option<DbId>, special_staff_id: Option<DbId>) -> bool {
    matches!((assigned_to, special_staff_id), (Some(a), Some(s)) if a == s)
}
