// [libs/infra/persistence/src/result_repository.rs]
/*!
 * APARATO: SEARCH RESULT REPOSITORY (ESTRATO L3)
 * RESPONSABILIDAD: PERSISTENCIA DE LOS REGISTROS CONSERVADOS POR TAREA
 */

use async_trait::async_trait;
use libsql::{params, Row};

use tracer_domain_models::{PhoneStatus, PhoneType, SearchResult};

use crate::client::DbClient;
use crate::errors::PersistenceError;
use crate::queries;
use crate::traits::ResultRepository;

pub struct SqliteResultRepository {
    database_client: DbClient,
}

impl SqliteResultRepository {
    pub fn new(client: DbClient) -> Self {
        Self { database_client: client }
    }

    fn phone_type_tag(phone_type: PhoneType) -> &'static str {
        match phone_type {
            PhoneType::Mobile => "mobile",
            PhoneType::Work => "work",
            PhoneType::Other => "other",
        }
    }

    fn phone_type_from_tag(tag: &str) -> PhoneType {
        match tag {
            "mobile" => PhoneType::Mobile,
            "work" => PhoneType::Work,
            _ => PhoneType::Other,
        }
    }

    fn phone_status_tag(status: PhoneStatus) -> &'static str {
        match status {
            PhoneStatus::NoPhone => "no-phone",
            PhoneStatus::Received => "received",
            PhoneStatus::Verified => "verified",
        }
    }

    fn phone_status_from_tag(tag: &str) -> PhoneStatus {
        match tag {
            "received" => PhoneStatus::Received,
            "verified" => PhoneStatus::Verified,
            _ => PhoneStatus::NoPhone,
        }
    }

    fn row_to_result(row: &Row) -> Result<SearchResult, PersistenceError> {
        let phone_type: Option<String> = row.get(11)?;
        let created_at_text: String = row.get(20)?;

        Ok(SearchResult {
            id: row.get(0)?,
            task_id: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            title: row.get(4)?,
            company: row.get(5)?,
            city: row.get(6)?,
            state: row.get(7)?,
            country: row.get(8)?,
            email: row.get(9)?,
            phone: row.get(10)?,
            phone_type: phone_type.as_deref().map(Self::phone_type_from_tag),
            phone_status: Self::phone_status_from_tag(&row.get::<String>(12)?),
            linkedin_url: row.get(13)?,
            age: row.get::<Option<i64>>(14)?.map(|v| v as u32),
            carrier: row.get(15)?,
            verified: row.get::<i64>(16)? != 0,
            verification_score: row.get::<i64>(17)? as u8,
            verification_source: row.get(18)?,
            data_source: row.get(19)?,
            created_at: chrono::DateTime::parse_from_rfc3339(&created_at_text)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .map_err(|e| PersistenceError::MappingError(format!("created_at: {}", e)))?,
        })
    }
}

#[async_trait]
impl ResultRepository for SqliteResultRepository {
    async fn insert_many(&self, results: &[SearchResult]) -> Result<(), PersistenceError> {
        if results.is_empty() {
            return Ok(());
        }
        let connection = self.database_client.get_connection()?;
        let transaction = connection.transaction().await.map_err(|_| PersistenceError::TransactionError)?;

        for result in results {
            transaction
                .execute(
                    queries::INSERT_SEARCH_RESULT,
                    params![
                        result.id.clone(),
                        result.task_id.clone(),
                        result.first_name.clone(),
                        result.last_name.clone(),
                        result.title.clone(),
                        result.company.clone(),
                        result.city.clone(),
                        result.state.clone(),
                        result.country.clone(),
                        result.email.clone(),
                        result.phone.clone(),
                        result.phone_type.map(Self::phone_type_tag).map(str::to_string),
                        Self::phone_status_tag(result.phone_status).to_string(),
                        result.linkedin_url.clone(),
                        result.age.map(|v| v as i64),
                        result.carrier.clone(),
                        result.verified as i64,
                        result.verification_score as i64,
                        result.verification_source.clone(),
                        result.data_source.clone(),
                        result.created_at.to_rfc3339(),
                    ],
                )
                .await?;
        }

        transaction.commit().await.map_err(|_| PersistenceError::TransactionError)?;
        Ok(())
    }

    async fn list_for_task(&self, task_id: &str) -> Result<Vec<SearchResult>, PersistenceError> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(queries::LIST_SEARCH_RESULTS_FOR_TASK, params![task_id.to_string()])
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(Self::row_to_result(&row)?);
        }
        Ok(results)
    }
}
