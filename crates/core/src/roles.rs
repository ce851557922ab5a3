//! Staff roles and the allow-lists used by the authorization extractors.
//!
//! Role names must match the `CHECK` constraint on `staff.role`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_STAFF: &str = "staff";
pub const ROLE_EXECUTIVE: &str = "executive";

/// Every accepted role name, in display order.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_STAFF, ROLE_EXECUTIVE];

/// Roles allowed to administer attendance.
pub const ATTENDANCE_ADMIN_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_EXECUTIVE];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
    Admin,
    #[default]
    Staff,
    Executive,
}

impl StaffRole {
    pub fn as_str(self) -> &'static str {
        match self {
            StaffRole::Admin => ROLE_ADMIN,
            StaffRole::Staff => ROLE_STAFF,
            StaffRole::Executive => ROLE_EXECUTIVE,
        }
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StaffRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(StaffRole::Admin),
            ROLE_STAFF => Ok(StaffRole::Staff),
            ROLE_EXECUTIVE => Ok(StaffRole::Executive),
            other => Err(format!(
                "Role must be either admin, staff, or executive (got '{other}')"
            )),
        }
    }
}

/// Returns `true` when `role` appears in `allowed`.
pub fn role_allowed(role: &str, allowed: &[&str]) -> bool {
    allowed.contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_valid_role() {
        for name in VALID_ROLES {
            let role: StaffRole = name.parse().expect("valid role");
            assert_eq!(role.as_str(), *name);
        }
    }

    #[test]
    fn rejects_unknown_role() {
        let err = "manager".parse::<StaffRole>().unwrap_err();
        assert!(err.contains("manager"));
    }

    #[test]
    fn attendance_gate_admits_admin_and_executive_only() {
        assert!(role_allowed(ROLE_ADMIN, ATTENDANCE_ADMIN_ROLES));
        assert!(role_allowed(ROLE_EXECUTIVE, ATTENDANCE_ADMIN_ROLES));
        assert!(!role_allowed(ROLE_STAFF, ATTENDANCE_ADMIN_ROLES));
    }
}
