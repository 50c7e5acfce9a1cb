//! The authenticated user on whose behalf records are created.
//!
//! A `Session` is resolved once at startup and handed to the mutation
//! gateway and managers; nothing below that point looks the user up again.

use crate::error::{Result, SprintError};
use crate::settings::{config_get, config_set, SESSION_USER_KEY};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

pub const SESSION_USER_ENV: &str = "SKILLSPRINT_USER";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    user_id: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Result<Self> {
        let user_id = user_id.into();
        if user_id.trim().is_empty() {
            return Err(SprintError::Validation(
                "Session user id must not be empty".to_string(),
            ));
        }
        Ok(Self { user_id })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Resolve the session for a workspace.
    ///
    /// Order: `SKILLSPRINT_USER`, then the `session.user_id` setting, then a
    /// freshly generated id that is stored for the next run.
    pub async fn resolve(pool: &SqlitePool) -> Result<Self> {
        if let Ok(user) = std::env::var(SESSION_USER_ENV) {
            if !user.trim().is_empty() {
                tracing::debug!(user_id = %user, "Session from environment");
                return Self::new(user);
            }
        }

        if let Some(user) = config_get(pool, SESSION_USER_KEY).await? {
            return Self::new(user);
        }

        let user = uuid::Uuid::new_v4().to_string();
        config_set(pool, SESSION_USER_KEY, &user).await?;
        tracing::info!(user_id = %user, "Created new local session");
        Self::new(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_helpers::TestContext;
    use serial_test::serial;

    #[test]
    fn test_empty_user_rejected() {
        assert!(matches!(
            Session::new("  "),
            Err(SprintError::Validation(_))
        ));
    }

    #[tokio::test]
    #[serial]
    async fn test_resolve_generates_and_persists() {
        std::env::remove_var(SESSION_USER_ENV);
        let ctx = TestContext::new().await;

        let first = Session::resolve(ctx.pool()).await.unwrap();
        let second = Session::resolve(ctx.pool()).await.unwrap();

        assert_eq!(first, second);
        assert!(!first.user_id().is_empty());
    }

    #[tokio::test]
    #[serial]
    async fn test_resolve_prefers_environment() {
        let ctx = TestContext::new().await;
        config_set(ctx.pool(), SESSION_USER_KEY, "stored-user")
            .await
            .unwrap();

        std::env::set_var(SESSION_USER_ENV, "env-user");
        let session = Session::resolve(ctx.pool()).await.unwrap();
        std::env::remove_var(SESSION_USER_ENV);

        assert_eq!(session.user_id(), "env-user");
    }
}
