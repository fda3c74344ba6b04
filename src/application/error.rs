use thiserror::Error;

use crate::{
    application::{archive::ArchiveError, editor::EditorError, repos::StoreError},
    cache::CacheError,
    config::LoadError,
    infra::error::InfraError,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// Process exit code reported for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Config(_) | AppError::Validation(_) => 2,
            AppError::Editor(EditorError::UnknownPage(_))
            | AppError::Editor(EditorError::ConstraintViolation(_))
            | AppError::Editor(EditorError::InvalidAssignment(_)) => 2,
            AppError::Store(_)
            | AppError::Cache(_)
            | AppError::Editor(EditorError::Store(_))
            | AppError::Editor(EditorError::Refresh(_))
            | AppError::Archive(ArchiveError::Store(_)) => 3,
            AppError::Infra(_) | AppError::Archive(_) | AppError::Unexpected(_) => 1,
        }
    }
}
