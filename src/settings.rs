//! Key/value settings persisted alongside the workspace data.

use crate::db::models::Setting;
use crate::error::{Result, SprintError};
use sqlx::SqlitePool;

/// Keys that cannot be modified through `sprint config`
pub const PROTECTED_KEYS: &[&str] = &["schema_version"];

pub const SESSION_USER_KEY: &str = "session.user_id";

pub fn ensure_writable(key: &str) -> Result<()> {
    if PROTECTED_KEYS.contains(&key) {
        return Err(SprintError::ActionNotAllowed(format!(
            "Cannot modify protected key: '{}'",
            key
        )));
    }
    if key.trim().is_empty() {
        return Err(SprintError::Validation("Setting key is required".to_string()));
    }
    Ok(())
}

pub async fn config_set(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO settings (key, value) VALUES (?, ?) ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn config_get(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;
    Ok(value)
}

pub async fn config_list(pool: &SqlitePool, prefix: Option<&str>) -> Result<Vec<Setting>> {
    let entries = match prefix {
        Some(p) => {
            sqlx::query_as::<_, Setting>(
                "SELECT key, value FROM settings WHERE key LIKE ? ORDER BY key",
            )
            .bind(format!("{}%", p))
            .fetch_all(pool)
            .await?
        },
        None => {
            sqlx::query_as::<_, Setting>("SELECT key, value FROM settings ORDER BY key")
                .fetch_all(pool)
                .await?
        },
    };
    Ok(entries)
}

/// Remove a key, returning whether it existed
pub async fn config_unset(pool: &SqlitePool, key: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM settings WHERE key = ?")
        .bind(key)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
