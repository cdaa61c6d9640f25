// [libs/infra/persistence/src/api_log_repository.rs]
/*!
 * APARATO: API LOG REPOSITORY (ESTRATO L3)
 * RESPONSABILIDAD: PERSISTENCIA DE MEJOR ESFUERZO DE LA TELEMETRÍA SALIENTE
 *
 * Satisface `tracer_infra_providers::ApiLogRepository`; un fallo de
 * escritura se registra y se traga — nunca debe abortar la llamada al
 * proveedor que originó el evento.
 */

use async_trait::async_trait;
use libsql::params;
use tracing::warn;

use tracer_domain_models::{ApiLogEntry, ProviderKind};
use tracer_infra_providers::ApiLogRepository;

use crate::client::DbClient;
use crate::queries;

pub struct SqliteApiLogRepository {
    database_client: DbClient,
}

impl SqliteApiLogRepository {
    pub fn new(client: DbClient) -> Self {
        Self { database_client: client }
    }

    fn provider_tag(provider: ProviderKind) -> &'static str {
        match provider {
            ProviderKind::Search => "search",
            ProviderKind::ExactSearch => "exact-search",
            ProviderKind::Enrichment => "enrichment",
            ProviderKind::ReverseLookupPrimary => "reverse-lookup-primary",
            ProviderKind::ReverseLookupFallback => "reverse-lookup-fallback",
        }
    }
}

#[async_trait]
impl ApiLogRepository for SqliteApiLogRepository {
    async fn record(&self, entry: ApiLogEntry) {
        let connection = match self.database_client.get_connection() {
            Ok(connection) => connection,
            Err(error) => {
                warn!("⚠️ [API_LOG]: connection unavailable, dropping entry: {}", error);
                return;
            }
        };

        let result = connection
            .execute(
                queries::INSERT_API_LOG_ENTRY,
                params![
                    Self::provider_tag(entry.provider).to_string(),
                    entry.latency_ms as i64,
                    entry.status_code.map(|code| code as i64),
                    entry.success as i64,
                    entry.credits_charged,
                    entry.related_task_id.map(|id| id.to_string()),
                    entry.created_at.to_rfc3339(),
                ],
            )
            .await;

        if let Err(error) = result {
            warn!("⚠️ [API_LOG]: write failed, telemetry dropped: {}", error);
        }
    }
}
