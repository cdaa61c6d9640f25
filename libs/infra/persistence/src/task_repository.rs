// [libs/infra/persistence/src/task_repository.rs]
/*!
 * APARATO: SEARCH TASK REPOSITORY (ESTRATO L3)
 * RESPONSABILIDAD: CICLO DE VIDA PERSISTIDO DE UNA TAREA DE BÚSQUEDA
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{params, Row};

use tracer_domain_models::{LogEntry, SearchQueryParams, SearchTask, SearchTaskStatus};

use crate::client::DbClient;
use crate::errors::PersistenceError;
use crate::queries;
use crate::traits::TaskRepository;

pub struct SqliteTaskRepository {
    database_client: DbClient,
}

impl SqliteTaskRepository {
    pub fn new(client: DbClient) -> Self {
        Self { database_client: client }
    }

    fn status_tag(status: SearchTaskStatus) -> &'static str {
        match status {
            SearchTaskStatus::Pending => "pending",
            SearchTaskStatus::Running => "running",
            SearchTaskStatus::Completed => "completed",
            SearchTaskStatus::Failed => "failed",
            SearchTaskStatus::Stopped => "stopped",
            SearchTaskStatus::InsufficientCredits => "insufficient-credits",
        }
    }

    fn status_from_tag(tag: &str) -> SearchTaskStatus {
        match tag {
            "running" => SearchTaskStatus::Running,
            "completed" => SearchTaskStatus::Completed,
            "failed" => SearchTaskStatus::Failed,
            "stopped" => SearchTaskStatus::Stopped,
            "insufficient-credits" => SearchTaskStatus::InsufficientCredits,
            _ => SearchTaskStatus::Pending,
        }
    }

    fn row_to_task(row: &Row) -> Result<SearchTask, PersistenceError> {
        let query_params_json: String = row.get(4)?;
        let logs_json: String = row.get(10)?;
        let created_at_text: String = row.get(12)?;
        let completed_at_text: Option<String> = row.get(13)?;

        let query_params: SearchQueryParams = serde_json::from_str(&query_params_json)
            .map_err(|e| PersistenceError::MappingError(format!("query_params_json: {}", e)))?;
        let logs: Vec<LogEntry> = serde_json::from_str(&logs_json)
            .map_err(|e| PersistenceError::MappingError(format!("logs_json: {}", e)))?;
        let created_at = parse_rfc3339(&created_at_text)?;
        let completed_at = completed_at_text.map(|text| parse_rfc3339(&text)).transpose()?;

        Ok(SearchTask {
            id: row.get(0)?,
            token: row.get(1)?,
            submitter_id: row.get(2)?,
            query_fingerprint: row.get(3)?,
            query_params,
            requested_count: row.get::<i64>(5)? as u32,
            actual_kept_count: row.get::<i64>(6)? as u32,
            credits_spent: row.get(7)?,
            status: Self::status_from_tag(&row.get::<String>(8)?),
            progress_percent: row.get::<i64>(9)? as u8,
            logs,
            error_message: row.get(11)?,
            created_at,
            completed_at,
        })
    }
}

fn parse_rfc3339(text: &str) -> Result<DateTime<Utc>, PersistenceError> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| PersistenceError::MappingError(format!("timestamp: {}", e)))
}

#[async_trait]
impl TaskRepository for SqliteTaskRepository {
    async fn create(&self, task: &SearchTask) -> Result<(), PersistenceError> {
        let connection = self.database_client.get_connection()?;
        let query_params_json = serde_json::to_string(&task.query_params)
            .map_err(|e| PersistenceError::MappingError(e.to_string()))?;
        let logs_json =
            serde_json::to_string(&task.logs).map_err(|e| PersistenceError::MappingError(e.to_string()))?;

        connection
            .execute(
                queries::INSERT_SEARCH_TASK,
                params![
                    task.id.clone(),
                    task.token.clone(),
                    task.submitter_id.clone(),
                    task.query_fingerprint.clone(),
                    query_params_json,
                    task.requested_count as i64,
                    task.actual_kept_count as i64,
                    task.credits_spent,
                    Self::status_tag(task.status).to_string(),
                    task.progress_percent as i64,
                    logs_json,
                    task.error_message.clone(),
                    task.created_at.to_rfc3339(),
                    task.completed_at.map(|ts| ts.to_rfc3339()),
                ],
            )
            .await?;
        Ok(())
    }

    async fn get(&self, task_id: &str) -> Result<Option<SearchTask>, PersistenceError> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection.query(queries::GET_SEARCH_TASK, params![task_id.to_string()]).await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::row_to_task(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_by_token(&self, token: &str) -> Result<Option<SearchTask>, PersistenceError> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection.query(queries::GET_SEARCH_TASK_BY_TOKEN, params![token.to_string()]).await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::row_to_task(&row)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, submitter_id: &str) -> Result<Vec<SearchTask>, PersistenceError> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(queries::LIST_SEARCH_TASKS_FOR_SUBMITTER, params![submitter_id.to_string()])
            .await?;

        let mut tasks = Vec::new();
        while let Some(row) = rows.next().await? {
            tasks.push(Self::row_to_task(&row)?);
        }
        Ok(tasks)
    }

    async fn save_progress(&self, task: &SearchTask) -> Result<(), PersistenceError> {
        let connection = self.database_client.get_connection()?;
        let logs_json =
            serde_json::to_string(&task.logs).map_err(|e| PersistenceError::MappingError(e.to_string()))?;

        let rows_affected = connection
            .execute(
                queries::UPDATE_SEARCH_TASK_PROGRESS,
                params![
                    task.id.clone(),
                    Self::status_tag(task.status).to_string(),
                    task.progress_percent as i64,
                    task.actual_kept_count as i64,
                    task.credits_spent,
                    logs_json,
                    task.error_message.clone(),
                    task.completed_at.map(|ts| ts.to_rfc3339()),
                ],
            )
            .await?;

        if rows_affected == 0 {
            return Err(PersistenceError::TaskNotFound);
        }
        Ok(())
    }

    async fn cancel(&self, task_id: &str) -> Result<bool, PersistenceError> {
        let connection = self.database_client.get_connection()?;
        let rows_affected = connection
            .execute(queries::CANCEL_SEARCH_TASK, params![task_id.to_string(), Utc::now().to_rfc3339()])
            .await?;
        Ok(rows_affected > 0)
    }
}
