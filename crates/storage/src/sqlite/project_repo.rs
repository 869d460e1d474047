use async_trait::async_trait;
use chrono::Utc;
use countdown_core::dates::to_date_key;
use countdown_core::model::Project;

use super::SqliteRepository;
use super::mapping::{encode_completions, map_project_row};
use crate::repository::{PROJECT_KEY, ProjectRepository, StorageError};

#[async_trait]
impl ProjectRepository for SqliteRepository {
    async fn load(&self) -> Result<Option<Project>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT
                total_pages,
                start_date,
                end_date,
                completions,
                locked_frontier,
                created_at
            FROM project
            WHERE id = ?1
            ",
        )
        .bind(PROJECT_KEY)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        row.as_ref().map(map_project_row).transpose()
    }

    async fn save(&self, project: &Project) -> Result<(), StorageError> {
        let completions = encode_completions(project.completions())?;

        sqlx::query(
            r"
            INSERT INTO project (
                id,
                total_pages,
                start_date,
                end_date,
                completions,
                locked_frontier,
                created_at,
                updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                total_pages = excluded.total_pages,
                start_date = excluded.start_date,
                end_date = excluded.end_date,
                completions = excluded.completions,
                locked_frontier = excluded.locked_frontier,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at
            ",
        )
        .bind(PROJECT_KEY)
        .bind(i64::from(project.total_pages()))
        .bind(to_date_key(project.start_date()))
        .bind(to_date_key(project.end_date()))
        .bind(completions)
        .bind(i64::from(project.locked_frontier()))
        .bind(project.created_at())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        tracing::debug!(
            completed = project.completions().len(),
            locked_frontier = project.locked_frontier(),
            "saved project"
        );
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM project WHERE id = ?1")
            .bind(PROJECT_KEY)
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        tracing::debug!("cleared project");
        Ok(())
    }
}
