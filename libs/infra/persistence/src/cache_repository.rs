// [libs/infra/persistence/src/cache_repository.rs]
/*!
 * APARATO: CACHE ENVELOPE REPOSITORY (ESTRATO L3)
 * RESPONSABILIDAD: ALMACÉN `libsql` PARA BLOBS DE CACHÉ TIPADOS
 */

use async_trait::async_trait;
use libsql::{params, Row};

use tracer_domain_models::{CacheEnvelope, CacheKind};

use crate::client::DbClient;
use crate::errors::PersistenceError;
use crate::queries;
use crate::traits::CacheRepository;

pub struct SqliteCacheRepository {
    database_client: DbClient,
}

impl SqliteCacheRepository {
    pub fn new(client: DbClient) -> Self {
        Self { database_client: client }
    }

    fn kind_tag(kind: CacheKind) -> &'static str {
        match kind {
            CacheKind::Search => "search",
            CacheKind::Person => "person",
            CacheKind::Verification => "verification",
        }
    }

    fn kind_from_tag(tag: &str) -> CacheKind {
        match tag {
            "person" => CacheKind::Person,
            "verification" => CacheKind::Verification,
            _ => CacheKind::Search,
        }
    }

    fn row_to_envelope(row: &Row) -> Result<CacheEnvelope, PersistenceError> {
        let expires_at_text: String = row.get(4)?;
        Ok(CacheEnvelope {
            key: row.get(0)?,
            kind: Self::kind_from_tag(&row.get::<String>(1)?),
            payload_json: row.get(2)?,
            hit_count: row.get::<i64>(3)? as u64,
            expires_at: chrono::DateTime::parse_from_rfc3339(&expires_at_text)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .map_err(|e| PersistenceError::MappingError(format!("expires_at: {}", e)))?,
        })
    }
}

#[async_trait]
impl CacheRepository for SqliteCacheRepository {
    async fn get(&self, key: &str) -> Result<Option<CacheEnvelope>, PersistenceError> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection.query(queries::GET_CACHE_ENVELOPE, params![key.to_string()]).await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::row_to_envelope(&row)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, envelope: CacheEnvelope) -> Result<(), PersistenceError> {
        let connection = self.database_client.get_connection()?;
        connection
            .execute(
                queries::UPSERT_CACHE_ENVELOPE,
                params![
                    envelope.key,
                    Self::kind_tag(envelope.kind).to_string(),
                    envelope.payload_json,
                    envelope.hit_count as i64,
                    envelope.expires_at.to_rfc3339(),
                ],
            )
            .await?;
        Ok(())
    }

    async fn increment_hit(&self, key: &str) -> Result<(), PersistenceError> {
        let connection = self.database_client.get_connection()?;
        connection.execute(queries::INCREMENT_CACHE_HIT, params![key.to_string()]).await?;
        Ok(())
    }
}
