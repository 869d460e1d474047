use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::celebration_service::CelebrationService;
use crate::error::AppServicesError;
use crate::persistence::PersistenceManager;
use crate::project_service::ProjectService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    projects: Arc<ProjectService>,
    persistence: Arc<PersistenceManager>,
    celebration: CelebrationService,
}

impl AppServices {
    #[must_use]
    pub fn from_storage(
        storage: &Storage,
        clock: Clock,
        celebration: CelebrationService,
        persistence: impl FnOnce(PersistenceManager) -> PersistenceManager,
    ) -> Self {
        let projects = Arc::new(ProjectService::new(clock, Arc::clone(&storage.projects)));
        let persistence = Arc::new(persistence(PersistenceManager::new(Arc::clone(
            &storage.durability,
        ))));
        Self {
            projects,
            persistence,
            celebration,
        }
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// `persistence` can attach an `on_denied` callback to the manager.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        celebration: CelebrationService,
        persistence: impl FnOnce(PersistenceManager) -> PersistenceManager,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, celebration, persistence))
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(
            &Storage::in_memory(),
            clock,
            CelebrationService::default(),
            |manager| manager,
        )
    }

    #[must_use]
    pub fn projects(&self) -> Arc<ProjectService> {
        Arc::clone(&self.projects)
    }

    #[must_use]
    pub fn persistence(&self) -> Arc<PersistenceManager> {
        Arc::clone(&self.persistence)
    }

    #[must_use]
    pub fn celebration(&self) -> CelebrationService {
        self.celebration
    }
}
