//! Demo data for local development.
//!
//! Seeds one account per role plus a doctor profile. Accounts that already
//! exist (matched by email) are left alone, so this is safe on every startup.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::info;

use super::{default_slots, DoctorDetail, DoctorFields, User};
use crate::auth::password::hash_password;
use crate::auth::Role;

/// (name, email, password, role)
const DEMO_ACCOUNTS: [(&str, &str, &str, Role); 3] = [
    ("Admin User", "admin@example.com", "admin123", Role::Admin),
    ("Dr. Smith", "doctor@example.com", "doctor123", Role::Doctor),
    ("John Doe", "patient@example.com", "patient123", Role::Patient),
];

/// Seed the demo accounts. Returns how many users were created.
pub async fn seed_demo_accounts(pool: &SqlitePool) -> Result<usize> {
    info!("Seeding demo accounts...");

    let mut created = 0;
    for (name, email, password, role) in DEMO_ACCOUNTS {
        if User::find_by_email(pool, email).await?.is_some() {
            continue;
        }

        let hash = hash_password(password)
            .map_err(|e| anyhow::anyhow!("Failed to hash demo password: {}", e))?;
        let user_id = User::insert(pool, name, email, &hash, role)
            .await
            .with_context(|| format!("Failed to create demo user {}", email))?;

        if role == Role::Doctor {
            let slots = default_slots();
            DoctorDetail::insert(
                pool,
                user_id,
                &DoctorFields {
                    specialization: "Cardiology",
                    clinic_name: Some("Heart Care Center"),
                    location: Some("Downtown"),
                    available_slots: &slots,
                },
            )
            .await
            .context("Failed to create demo doctor profile")?;
        }

        info!(email = %email, role = %role, "Created demo account");
        created += 1;
    }

    info!("Seeded {} demo accounts", created);
    Ok(created)
}
