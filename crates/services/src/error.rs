//! Shared error types for the services crate.

use thiserror::Error;

use countdown_core::model::ProjectError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ProjectService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProjectServiceError {
    #[error("no project has been set up")]
    NoProject,
    #[error("a project already exists; reset it first")]
    AlreadyExists,
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
