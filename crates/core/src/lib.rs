//! Domain types and pure business rules for the Sarathi backend.
//!
//! Nothing in this crate touches the database or the network. Handlers and
//! repositories call into it for enum parsing, validation, order numbering,
//! and attendance bookkeeping.

pub mod attendance;
pub mod error;
pub mod order;
pub mod product;
pub mod roles;
pub mod seed;
pub mod types;
pub mod validation;
