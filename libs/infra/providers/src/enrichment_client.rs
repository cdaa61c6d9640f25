// [libs/infra/providers/src/enrichment_client.rs]
/*!
 * APARATO: ENRICHMENT PROVIDER UPLINK (ESTRATO L3)
 * RESPONSABILIDAD: COMPLETAR TELÉFONO/EMAIL DE UN ÚNICO PERFIL
 */

use std::sync::Arc;
use std::time::Instant;

use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use tracer_domain_models::{ApiLogEntry, LeadPerson, ProviderKind};

use crate::api_log_sink::ApiLogRepository;
use crate::errors::ClientError;
use crate::normalize::{normalize_provider_person, RawProviderPerson};

#[derive(Debug, Deserialize)]
struct RawEnrichmentResponse {
    success: bool,
    #[serde(default)]
    person: Option<RawProviderPerson>,
}

pub struct EnrichmentProviderClient {
    http_client: Client,
    base_url: String,
    api_log: Arc<dyn ApiLogRepository>,
}

impl EnrichmentProviderClient {
    pub fn new(base_url: String, bearer_token: String, api_log: Arc<dyn ApiLogRepository>) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        let auth_value = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", bearer_token))
            .expect("invalid bearer token format");
        headers.insert(reqwest::header::AUTHORIZATION, auth_value);

        Self {
            http_client: Client::builder()
                .default_headers(headers)
                .user_agent("tracer-engine-enrichment/1.0")
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("failed to build enrichment provider http client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_log,
        }
    }

    /// Un llamado por perfil; puede omitirse si `search` ya entregó
    /// registros con contacto completo (spec §4.3).
    #[instrument(skip(self))]
    pub async fn enrich(&self, provider_id: &str, _user_id: Uuid) -> Result<Option<LeadPerson>, ClientError> {
        let started_at = Instant::now();
        let target_url = format!("{}/v1/enrich/{}", self.base_url, provider_id);

        let response = self.http_client.post(&target_url).send().await;
        let latency_ms = started_at.elapsed().as_millis() as u64;

        let response = match response {
            Ok(response) => response,
            Err(network_error) => {
                self.log_call(latency_ms, None, false).await;
                return Err(ClientError::Network(network_error));
            }
        };

        let status = response.status();
        if !status.is_success() {
            self.log_call(latency_ms, Some(status.as_u16()), false).await;
            return Err(ClientError::from_status(status.as_u16()));
        }

        let body: RawEnrichmentResponse = response.json().await?;
        self.log_call(latency_ms, Some(status.as_u16()), body.success).await;

        Ok(body.person.map(|raw| normalize_provider_person(raw, "enrichment")))
    }

    async fn log_call(&self, latency_ms: u64, status_code: Option<u16>, success: bool) {
        self.api_log
            .record(ApiLogEntry {
                provider: ProviderKind::Enrichment,
                latency_ms,
                status_code,
                success,
                credits_charged: None,
                related_task_id: None,
                created_at: chrono::Utc::now(),
            })
            .await;
    }
}
