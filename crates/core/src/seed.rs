//! Accounts created at startup when absent.
//!
//! Seeding is keyed by phone number; an existing account with the same phone
//! is left untouched, so re-running the bootstrap never duplicates rows.

use crate::roles::StaffRole;

#[derive(Debug, Clone, Copy)]
pub struct SeedAccount {
    pub name: &'static str,
    pub phone: &'static str,
    pub password: &'static str,
    pub role: StaffRole,
    pub email: &'static str,
}

/// Email identifying the special staff account. Orders assigned to it are
/// flagged `iswithout`.
pub const SPECIAL_STAFF_EMAIL: &str = "special@electrical.com";

pub const SEED_ACCOUNTS: &[SeedAccount] = &[
    SeedAccount {
        name: "Admin User",
        phone: "9876543210",
        password: "admin123",
        role: StaffRole::Admin,
        email: "admin@electrical.com",
    },
    SeedAccount {
        name: "Staff User",
        phone: "7875353444",
        password: "staff123",
        role: StaffRole::Staff,
        email: SPECIAL_STAFF_EMAIL,
    },
    SeedAccount {
        name: "Staff User",
        phone: "9876543211",
        password: "staff123",
        role: StaffRole::Staff,
        email: "staff@electrical.com",
    },
];
