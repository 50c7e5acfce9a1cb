use crate::db::{create_pool, run_migrations};
use crate::error::{Result, SprintError};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};

pub const SPRINT_DIR: &str = ".skillsprint";
pub const DB_FILE: &str = "sprint.db";
pub const WORKSPACE_DIR_ENV: &str = "SKILLSPRINT_DIR";

/// An opened SkillSprint workspace: where the data lives and a pool onto it
#[derive(Debug)]
pub struct WorkspaceContext {
    pub root: PathBuf,
    pub db_path: PathBuf,
    pub pool: SqlitePool,
}

impl WorkspaceContext {
    /// Find the workspace root.
    ///
    /// Search order:
    /// 1. `SKILLSPRINT_DIR` environment variable
    /// 2. Upwards from the current directory for `.skillsprint/`
    /// 3. The user's home directory
    pub fn find_workspace_root() -> Option<PathBuf> {
        if let Ok(env_path) = std::env::var(WORKSPACE_DIR_ENV) {
            let path = PathBuf::from(env_path);
            if path.join(SPRINT_DIR).is_dir() {
                tracing::debug!(root = %path.display(), "Using workspace from {}", WORKSPACE_DIR_ENV);
                return Some(path);
            }
            tracing::warn!(
                root = %path.display(),
                "{} set but no {} found there",
                WORKSPACE_DIR_ENV,
                SPRINT_DIR
            );
        }

        if let Ok(mut current) = std::env::current_dir() {
            loop {
                if current.join(SPRINT_DIR).is_dir() {
                    return Some(current);
                }
                if !current.pop() {
                    break;
                }
            }
        }

        dirs::home_dir().filter(|home| home.join(SPRINT_DIR).is_dir())
    }

    /// Create (or reopen) a workspace rooted at `root`
    pub async fn initialize_at(root: &Path) -> Result<Self> {
        let sprint_dir = root.join(SPRINT_DIR);
        if !sprint_dir.exists() {
            std::fs::create_dir_all(&sprint_dir)?;
        }

        let db_path = sprint_dir.join(DB_FILE);
        let pool = create_pool(&db_path).await?;
        run_migrations(&pool).await?;

        tracing::info!(root = %root.display(), "Workspace initialized");

        Ok(WorkspaceContext {
            root: root.to_path_buf(),
            db_path,
            pool,
        })
    }

    /// Initialize a workspace where the caller asked for one.
    ///
    /// `SKILLSPRINT_DIR` wins over the current directory.
    pub async fn initialize() -> Result<Self> {
        let root = match std::env::var(WORKSPACE_DIR_ENV) {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => std::env::current_dir()?,
        };
        Self::initialize_at(&root).await
    }

    /// Load an existing workspace
    pub async fn load() -> Result<Self> {
        let root = Self::find_workspace_root().ok_or(SprintError::NotAWorkspace)?;
        let db_path = root.join(SPRINT_DIR).join(DB_FILE);

        let pool = create_pool(&db_path).await?;
        run_migrations(&pool).await?;

        Ok(WorkspaceContext {
            root,
            db_path,
            pool,
        })
    }

    /// Load the workspace, initializing one if none is found
    pub async fn load_or_init() -> Result<Self> {
        match Self::load().await {
            Ok(ctx) => Ok(ctx),
            Err(SprintError::NotAWorkspace) => Self::initialize().await,
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_initialize_at_creates_database() {
        let temp_dir = TempDir::new().unwrap();

        let ctx = WorkspaceContext::initialize_at(temp_dir.path())
            .await
            .unwrap();

        assert!(ctx.db_path.exists());
        assert_eq!(ctx.root, temp_dir.path());
        assert!(temp_dir.path().join(SPRINT_DIR).is_dir());
    }

    #[tokio::test]
    async fn test_initialize_at_twice_keeps_data() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = WorkspaceContext::initialize_at(temp_dir.path())
            .await
            .unwrap();
        crate::settings::config_set(&ctx.pool, "k", "v").await.unwrap();
        drop(ctx);

        let ctx = WorkspaceContext::initialize_at(temp_dir.path())
            .await
            .unwrap();
        let value = crate::settings::config_get(&ctx.pool, "k").await.unwrap();
        assert_eq!(value.as_deref(), Some("v"));
    }
}
