use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SprintError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Failed to {operation}: {source}")]
    Persistence {
        operation: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Action not allowed: {0}")]
    ActionNotAllowed(String),

    #[error("Current directory is not a SkillSprint workspace")]
    NotAWorkspace,

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl SprintError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        SprintError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Wrap a raw backing-store failure so the caller learns which operation broke.
    ///
    /// `RowNotFound` becomes a `NotFound` for the given entity; errors that
    /// are already part of the taxonomy pass through untouched.
    pub fn into_persistence(self, operation: &str, entity: &'static str, id: &str) -> Self {
        match self {
            SprintError::DatabaseError(sqlx::Error::RowNotFound) => {
                SprintError::not_found(entity, id)
            },
            SprintError::DatabaseError(source) => SprintError::Persistence {
                operation: operation.to_string(),
                source,
            },
            other => other,
        }
    }

    pub fn to_error_code(&self) -> &'static str {
        match self {
            SprintError::Validation(_) => "VALIDATION_ERROR",
            SprintError::NotFound { .. } => "NOT_FOUND",
            SprintError::Persistence { .. } => "PERSISTENCE_ERROR",
            SprintError::DatabaseError(_) => "DATABASE_ERROR",
            SprintError::ActionNotAllowed(_) => "ACTION_NOT_ALLOWED",
            SprintError::NotAWorkspace => "NOT_A_WORKSPACE",
            _ => "INTERNAL_ERROR",
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            code: self.to_error_code().to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SprintError>;
