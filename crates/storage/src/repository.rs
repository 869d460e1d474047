use async_trait::async_trait;
use chrono::NaiveDateTime;
use countdown_core::dates::CalendarDay;
use countdown_core::model::{Completion, Project, ProjectError};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Fixed identifier of the single project record.
pub const PROJECT_KEY: &str = "current";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape of a project.
///
/// This mirrors the domain `Project` so repositories can serialize/deserialize
/// without leaking storage concerns into the domain layer.
#[derive(Debug, Clone)]
pub struct ProjectRecord {
    pub total_pages: u32,
    pub start_date: CalendarDay,
    pub end_date: CalendarDay,
    pub completions: Vec<Completion>,
    pub locked_frontier: u32,
    pub created_at: NaiveDateTime,
}

impl ProjectRecord {
    #[must_use]
    pub fn from_project(project: &Project) -> Self {
        Self {
            total_pages: project.total_pages(),
            start_date: project.start_date(),
            end_date: project.end_date(),
            completions: project.completions().to_vec(),
            locked_frontier: project.locked_frontier(),
            created_at: project.created_at(),
        }
    }

    /// Convert the record back into a domain `Project`.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError` if the stored values break a project invariant.
    pub fn into_project(self) -> Result<Project, ProjectError> {
        Project::from_persisted(
            self.total_pages,
            self.start_date,
            self.end_date,
            self.completions,
            self.locked_frontier,
            self.created_at,
        )
    }
}

/// Repository contract for the single active project.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Fetch the stored project, if one has been set up.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be read or decoded.
    async fn load(&self) -> Result<Option<Project>, StorageError>;

    /// Persist the project, replacing any stored one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the project cannot be stored.
    async fn save(&self, project: &Project) -> Result<(), StorageError>;

    /// Delete the stored project. Clearing an empty store is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    async fn clear(&self) -> Result<(), StorageError>;
}

/// Whether the backing store survives the process, and a way to ask for it.
#[async_trait]
pub trait DurabilityProbe: Send + Sync {
    /// Report whether stored data is already durable.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be queried.
    async fn persisted(&self) -> Result<bool, StorageError>;

    /// Whether [`DurabilityProbe::persist`] can do anything on this backend.
    fn supports_persist(&self) -> bool {
        true
    }

    /// Ask the backend to keep data durably. Returns whether it was granted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the request itself fails.
    async fn persist(&self) -> Result<bool, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    project: Arc<Mutex<Option<Project>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            project: Arc::new(Mutex::new(None)),
        }
    }
}

#[async_trait]
impl ProjectRepository for InMemoryRepository {
    async fn load(&self) -> Result<Option<Project>, StorageError> {
        let guard = self
            .project
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save(&self, project: &Project) -> Result<(), StorageError> {
        let mut guard = self
            .project
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(project.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let mut guard = self
            .project
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = None;
        Ok(())
    }
}

#[async_trait]
impl DurabilityProbe for InMemoryRepository {
    async fn persisted(&self) -> Result<bool, StorageError> {
        Ok(false)
    }

    fn supports_persist(&self) -> bool {
        false
    }

    async fn persist(&self) -> Result<bool, StorageError> {
        Ok(false)
    }
}

/// Aggregates the project repository and durability probe behind trait objects
/// for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub projects: Arc<dyn ProjectRepository>,
    pub durability: Arc<dyn DurabilityProbe>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let projects: Arc<dyn ProjectRepository> = Arc::new(repo.clone());
        let durability: Arc<dyn DurabilityProbe> = Arc::new(repo);
        Self {
            projects,
            durability,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use countdown_core::model::ProjectDraft;
    use countdown_core::time::{fixed_now, fixed_today};

    fn build_project() -> Project {
        ProjectDraft::new(12, "2025-01-01", "2025-01-12")
            .validate(fixed_now())
            .unwrap()
    }

    #[tokio::test]
    async fn round_trips_project_with_progress() {
        let repo = InMemoryRepository::new();
        assert!(repo.load().await.unwrap().is_none());

        let mut project = build_project();
        project.complete_page(1, fixed_today());
        project.complete_page(2, fixed_today());
        project.commit_lock_in(1);
        repo.save(&project).await.unwrap();

        let fetched = repo.load().await.unwrap().expect("project stored");
        assert_eq!(fetched, project);
        assert_eq!(fetched.locked_frontier(), 1);
    }

    #[tokio::test]
    async fn clear_removes_the_record() {
        let storage = Storage::in_memory();
        storage.projects.save(&build_project()).await.unwrap();
        storage.projects.clear().await.unwrap();
        assert!(storage.projects.load().await.unwrap().is_none());
        storage.projects.clear().await.unwrap();
    }

    #[tokio::test]
    async fn in_memory_store_is_never_durable() {
        let storage = Storage::in_memory();
        assert!(!storage.durability.persisted().await.unwrap());
        assert!(!storage.durability.supports_persist());
        assert!(!storage.durability.persist().await.unwrap());
    }

    #[test]
    fn record_conversion_preserves_fields() {
        let mut project = build_project();
        project.complete_page(1, fixed_today());
        let record = ProjectRecord::from_project(&project);
        assert_eq!(record.completions.len(), 1);
        assert_eq!(record.into_project().unwrap(), project);
    }
}
