//! One-time startup tasks run before the server accepts requests.

use sarathi_core::seed::SEED_ACCOUNTS;
use sarathi_db::models::staff::CreateStaff;
use sarathi_db::repositories::{OrderRepo, StaffRepo};
use sarathi_db::DbPool;

use crate::auth::password::hash_password;

/// Errors raised while preparing the database at startup.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to hash seed password for {phone}: {reason}")]
    Hash { phone: &'static str, reason: String },
}

/// Create the fixed seed accounts that are not present yet.
///
/// Accounts are matched by phone; existing rows are never modified.
/// Returns how many accounts were inserted.
pub async fn seed_accounts(pool: &DbPool) -> Result<usize, BootstrapError> {
    let mut created = 0;

    for account in SEED_ACCOUNTS {
        let password_hash = hash_password(account.password).map_err(|e| BootstrapError::Hash {
            phone: account.phone,
            reason: e.to_string(),
        })?;

        let dto = CreateStaff {
            name: account.name.to_string(),
            phone: account.phone.to_string(),
            password_hash,
            role: account.role.as_str().to_string(),
            email: Some(account.email.to_string()),
        };

        if StaffRepo::insert_if_absent(pool, &dto).await? {
            tracing::info!(phone = account.phone, role = %account.role.as_str(), "Seed account created");
            created += 1;
        } else {
            tracing::debug!(phone = account.phone, "Seed account already present");
        }
    }

    Ok(created)
}

/// Bring the order-number counter up to the highest number already issued.
pub async fn sync_order_counter(pool: &DbPool) -> Result<i64, BootstrapError> {
    let value = OrderRepo::sync_order_counter(pool).await?;
    tracing::info!(counter = value, "Order number counter synced");
    Ok(value)
}
