use anyhow::{Result, anyhow};
use sqlx::MySqlPool;
use tracing::info;

use crate::{auth::password::hash_password, config::Config, model::role::Role, utils::email_filter};

/// Creates the bootstrap admin account when one is configured and the email
/// is not already present. Runs once at startup, before the server binds.
pub async fn seed_admin(pool: &MySqlPool, config: &Config) -> Result<()> {
    let (Some(email), Some(password)) = (
        &config.bootstrap_admin_email,
        &config.bootstrap_admin_password,
    ) else {
        return Ok(());
    };

    let email = email.trim().to_lowercase();

    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM employees WHERE email = ? LIMIT 1)",
    )
    .bind(&email)
    .fetch_one(pool)
    .await?;

    if exists {
        return Ok(());
    }

    let hashed = hash_password(password)
        .map_err(|e| anyhow!("Failed to hash bootstrap admin password: {}", e))?;

    sqlx::query(
        r#"
        INSERT INTO employees (name, email, password, role_id, department)
        VALUES (?, ?, ?, ?, 'General')
        "#,
    )
    .bind(&config.bootstrap_admin_name)
    .bind(&email)
    .bind(&hashed)
    .bind(Role::Admin as u8)
    .execute(pool)
    .await?;

    email_filter::insert(&email);

    info!(email = %email, "Bootstrap admin created");
    Ok(())
}
