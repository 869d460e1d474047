use std::sync::Arc;

use countdown_core::model::{Project, ProjectDraft, ProjectError};
use storage::repository::ProjectRepository;
use tokio::sync::Mutex;

use crate::Clock;
use crate::dashboard::DashboardView;
use crate::error::ProjectServiceError;

/// Result of a user action against the stored project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectUpdate {
    /// The project after the action, identical to before when rejected.
    pub project: Project,
    /// Whether the action changed anything.
    pub applied: bool,
}

/// Applies user actions to the single stored project.
///
/// Every action runs load → mutate → save under one lock, so actions are
/// handled strictly one at a time against the latest snapshot.
#[derive(Clone)]
pub struct ProjectService {
    clock: Clock,
    repo: Arc<dyn ProjectRepository>,
    gate: Arc<Mutex<()>>,
}

impl ProjectService {
    #[must_use]
    pub fn new(clock: Clock, repo: Arc<dyn ProjectRepository>) -> Self {
        Self {
            clock,
            repo,
            gate: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::new(
            clock,
            Arc::new(storage::repository::InMemoryRepository::new()),
        )
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Load the stored project, if any.
    ///
    /// # Errors
    ///
    /// Returns `ProjectServiceError::Storage` on repository failures.
    pub async fn load(&self) -> Result<Option<Project>, ProjectServiceError> {
        Ok(self.repo.load().await?)
    }

    /// Load the stored project, failing when none has been set up.
    ///
    /// # Errors
    ///
    /// Returns `ProjectServiceError::NoProject` if nothing is stored.
    pub async fn current(&self) -> Result<Project, ProjectServiceError> {
        self.repo.load().await?.ok_or(ProjectServiceError::NoProject)
    }

    /// Validate setup input and store a fresh project.
    ///
    /// # Errors
    ///
    /// Returns `ProjectServiceError::Project` for invalid input and
    /// `ProjectServiceError::AlreadyExists` if a project is already stored.
    pub async fn setup(&self, draft: ProjectDraft) -> Result<Project, ProjectServiceError> {
        let _guard = self.gate.lock().await;
        if self.repo.load().await?.is_some() {
            return Err(ProjectServiceError::AlreadyExists);
        }

        let project = draft.validate(self.clock.now())?;
        self.repo.save(&project).await?;
        tracing::info!(
            total_pages = project.total_pages(),
            start = %project.start_date(),
            end = %project.end_date(),
            "project created"
        );
        Ok(project)
    }

    /// Complete `page` today, if it is the next page in sequence.
    ///
    /// # Errors
    ///
    /// Returns `ProjectServiceError` if no project exists or storage fails.
    pub async fn complete_page(&self, page: u32) -> Result<ProjectUpdate, ProjectServiceError> {
        let today = self.clock.today();
        self.update("complete", |project| Ok(project.complete_page(page, today)))
            .await
    }

    /// Complete whichever page is next. Rejected once the goal is met.
    ///
    /// # Errors
    ///
    /// Returns `ProjectServiceError` if no project exists or storage fails.
    pub async fn complete_next(&self) -> Result<ProjectUpdate, ProjectServiceError> {
        let today = self.clock.today();
        self.update("complete", |project| {
            Ok(project
                .next_page()
                .is_some_and(|page| project.complete_page(page, today)))
        })
        .await
    }

    /// Undo `page`, which must be the latest completion above the frontier.
    ///
    /// # Errors
    ///
    /// Returns `ProjectServiceError` if no project exists or storage fails.
    pub async fn undo_page(&self, page: u32) -> Result<ProjectUpdate, ProjectServiceError> {
        self.update("undo", |project| {
            let latest = project.completions().last().map(|c| c.page());
            Ok(latest == Some(page) && project.undo_last().is_some())
        })
        .await
    }

    /// The frontier a lock-in would commit, if it would move.
    ///
    /// Callers must get explicit confirmation before passing it to
    /// [`ProjectService::confirm_lock_in`].
    ///
    /// # Errors
    ///
    /// Returns `ProjectServiceError` if no project exists or storage fails.
    pub async fn lock_in_candidate(&self) -> Result<Option<u32>, ProjectServiceError> {
        Ok(self.current().await?.lock_in_candidate())
    }

    /// Commit a confirmed lock-in. Irreversible.
    ///
    /// # Errors
    ///
    /// Returns `ProjectServiceError` if no project exists or storage fails.
    pub async fn confirm_lock_in(&self, frontier: u32) -> Result<ProjectUpdate, ProjectServiceError> {
        self.update("lock", |project| Ok(project.commit_lock_in(frontier)))
            .await
    }

    /// Change the goal size.
    ///
    /// # Errors
    ///
    /// Returns `ProjectServiceError::Project` if `total_pages` is not positive,
    /// or other errors if no project exists or storage fails.
    pub async fn change_goal(&self, total_pages: i64) -> Result<ProjectUpdate, ProjectServiceError> {
        self.update("goal", |project| project.change_goal(total_pages))
            .await
    }

    /// Delete the stored project and all progress.
    ///
    /// # Errors
    ///
    /// Returns `ProjectServiceError::Storage` on repository failures.
    pub async fn reset(&self) -> Result<(), ProjectServiceError> {
        let _guard = self.gate.lock().await;
        self.repo.clear().await?;
        tracing::info!("project reset");
        Ok(())
    }

    /// Build the dashboard for today, or `None` before setup.
    ///
    /// # Errors
    ///
    /// Returns `ProjectServiceError::Storage` on repository failures.
    pub async fn dashboard(&self) -> Result<Option<DashboardView>, ProjectServiceError> {
        let today = self.clock.today();
        Ok(self
            .load()
            .await?
            .map(|project| DashboardView::build(&project, today)))
    }

    async fn update<F>(&self, action: &'static str, apply: F) -> Result<ProjectUpdate, ProjectServiceError>
    where
        F: FnOnce(&mut Project) -> Result<bool, ProjectError>,
    {
        let _guard = self.gate.lock().await;
        let mut project = self.current().await?;
        let applied = apply(&mut project)?;

        if applied {
            self.repo.save(&project).await?;
            tracing::info!(
                action,
                completed = project.completions().len(),
                locked_frontier = project.locked_frontier(),
                total_pages = project.total_pages(),
                "project updated"
            );
        } else {
            tracing::debug!(action, "action rejected; project unchanged");
        }

        Ok(ProjectUpdate { project, applied })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use countdown_core::time::fixed_clock;

    async fn service_with_project(total: i64) -> ProjectService {
        let service = ProjectService::in_memory(fixed_clock());
        service
            .setup(ProjectDraft::new(total, "2025-01-01", "2025-01-05"))
            .await
            .unwrap();
        service
    }

    #[tokio::test]
    async fn actions_need_a_project() {
        let service = ProjectService::in_memory(fixed_clock());
        assert!(service.dashboard().await.unwrap().is_none());
        assert!(matches!(
            service.complete_page(1).await,
            Err(ProjectServiceError::NoProject)
        ));
    }

    #[tokio::test]
    async fn setup_rejects_invalid_input_and_duplicates() {
        let service = ProjectService::in_memory(fixed_clock());
        let err = service
            .setup(ProjectDraft::new(10, "2025-01-05", "2025-01-01"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProjectServiceError::Project(ProjectError::EndNotAfterStart)
        ));

        service
            .setup(ProjectDraft::new(10, "2025-01-01", "2025-01-05"))
            .await
            .unwrap();
        assert!(matches!(
            service
                .setup(ProjectDraft::new(10, "2025-01-01", "2025-01-05"))
                .await,
            Err(ProjectServiceError::AlreadyExists)
        ));
    }

    #[tokio::test]
    async fn setup_caps_the_goal_size() {
        let service = ProjectService::in_memory(fixed_clock());
        let err = service
            .setup(ProjectDraft::new(4_000_000_000, "2025-01-01", "2025-01-05"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProjectServiceError::Project(ProjectError::TooManyPages { max: 100_000 })
        ));
        assert!(service.load().await.unwrap().is_none());

        let service = service_with_project(100_000).await;
        let view = service.dashboard().await.unwrap().expect("dashboard");
        assert_eq!(view.tiles.len(), 100_000);
    }

    #[tokio::test]
    async fn completions_are_dated_by_the_clock() {
        let service = service_with_project(5).await;
        let update = service.complete_page(1).await.unwrap();
        assert!(update.applied);
        assert_eq!(update.project.completions()[0].date_key(), "2025-01-01");

        let rejected = service.complete_page(3).await.unwrap();
        assert!(!rejected.applied);
        assert_eq!(rejected.project.completed_pages(), vec![1]);
    }

    #[tokio::test]
    async fn undo_only_targets_the_latest_page() {
        let service = service_with_project(5).await;
        service.complete_next().await.unwrap();
        service.complete_next().await.unwrap();

        assert!(!service.undo_page(1).await.unwrap().applied);
        let update = service.undo_page(2).await.unwrap();
        assert!(update.applied);
        assert_eq!(update.project.completed_pages(), vec![1]);
    }

    #[tokio::test]
    async fn lock_in_blocks_undo() {
        let service = service_with_project(5).await;
        service.complete_next().await.unwrap();
        service.complete_next().await.unwrap();

        let candidate = service.lock_in_candidate().await.unwrap();
        assert_eq!(candidate, Some(2));
        assert!(service.confirm_lock_in(2).await.unwrap().applied);
        assert_eq!(service.lock_in_candidate().await.unwrap(), None);
        assert!(!service.undo_page(2).await.unwrap().applied);
    }

    #[tokio::test]
    async fn goal_change_reconciles_progress() {
        let service = service_with_project(5).await;
        for _ in 0..4 {
            service.complete_next().await.unwrap();
        }
        service.confirm_lock_in(4).await.unwrap();

        let update = service.change_goal(3).await.unwrap();
        assert!(update.applied);
        assert_eq!(update.project.completed_pages(), vec![1, 2, 3]);
        assert_eq!(update.project.locked_frontier(), 3);

        assert!(matches!(
            service.change_goal(0).await,
            Err(ProjectServiceError::Project(ProjectError::InvalidTotalPages))
        ));
        assert!(matches!(
            service.change_goal(4_000_000_000).await,
            Err(ProjectServiceError::Project(ProjectError::TooManyPages { .. }))
        ));
        assert_eq!(service.current().await.unwrap().total_pages(), 3);
    }

    #[tokio::test]
    async fn complete_next_stops_at_the_goal() {
        let service = service_with_project(2).await;
        assert!(service.complete_next().await.unwrap().applied);
        assert!(service.complete_next().await.unwrap().applied);
        let update = service.complete_next().await.unwrap();
        assert!(!update.applied);
        assert!(update.project.is_goal_met());
    }

    #[tokio::test]
    async fn reset_clears_everything() {
        let service = service_with_project(5).await;
        service.complete_next().await.unwrap();
        service.reset().await.unwrap();
        assert!(service.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn dashboard_uses_the_clock_day() {
        let mut clock = fixed_clock();
        clock.advance(Duration::days(2));
        let service = ProjectService::in_memory(clock);
        service
            .setup(ProjectDraft::new(30, "2025-01-01", "2025-01-05"))
            .await
            .unwrap();

        let view = service.dashboard().await.unwrap().expect("dashboard");
        assert_eq!(view.stats.days_left, 3);
        assert!((view.stats.planned_pace - 6.0).abs() < f64::EPSILON);
    }
}
