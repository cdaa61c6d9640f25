// [libs/infra/providers/src/search_client.rs]
/*!
 * =================================================================
 * APARATO: BULK SEARCH PROVIDER UPLINK (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: NEGOCIACIÓN DE BÚSQUEDA MASIVA DE PERSONAS
 * =================================================================
 */

use std::sync::Arc;
use std::time::Instant;

use reqwest::Client;
use serde::Deserialize;
use tracing::{instrument, warn};
use uuid::Uuid;

use tracer_domain_models::{ApiLogEntry, LeadPerson, ProviderKind};

use crate::api_log_sink::ApiLogRepository;
use crate::errors::ClientError;
use crate::normalize::{normalize_provider_person, RawProviderPerson};

/// Envelope de respuesta común a los tres adaptadores (spec §4.3).
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub success: bool,
    pub people: Vec<LeadPerson>,
    pub total_count: Option<u32>,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSearchResponse {
    success: bool,
    #[serde(default)]
    people: Vec<RawProviderPerson>,
    #[serde(default)]
    total_count: Option<u32>,
    #[serde(default)]
    error_message: Option<String>,
}

pub struct SearchProviderClient {
    http_client: Client,
    base_url: String,
    api_log: Arc<dyn ApiLogRepository>,
}

impl SearchProviderClient {
    pub fn new(base_url: String, bearer_token: String, api_log: Arc<dyn ApiLogRepository>) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        let auth_value = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", bearer_token))
            .expect("invalid bearer token format");
        headers.insert(reqwest::header::AUTHORIZATION, auth_value);

        Self {
            http_client: Client::builder()
                .default_headers(headers)
                .user_agent("tracer-engine-search/1.0")
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("failed to build search provider http client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_log,
        }
    }

    #[instrument(skip(self, title))]
    pub async fn search(
        &self,
        name: &str,
        title: Option<&str>,
        state: Option<&str>,
        limit: u32,
        user_id: Uuid,
    ) -> Result<SearchOutcome, ClientError> {
        let started_at = Instant::now();
        let target_url = format!("{}/v1/search", self.base_url);

        let response = self
            .http_client
            .get(&target_url)
            .query(&[
                ("name", name),
                ("title", title.unwrap_or("")),
                ("state", state.unwrap_or("")),
                ("limit", &limit.to_string()),
            ])
            .send()
            .await;

        let latency_ms = started_at.elapsed().as_millis() as u64;

        let response = match response {
            Ok(response) => response,
            Err(network_error) => {
                self.log_call(latency_ms, None, false, Some(user_id)).await;
                return Err(ClientError::Network(network_error));
            }
        };

        let status = response.status();
        if !status.is_success() {
            self.log_call(latency_ms, Some(status.as_u16()), false, Some(user_id)).await;
            return Err(ClientError::from_status(status.as_u16()));
        }

        let body: RawSearchResponse = response.json().await?;
        self.log_call(latency_ms, Some(status.as_u16()), body.success, Some(user_id)).await;

        if !body.success {
            warn!("⚠️ [SEARCH_PROVIDER]: provider-reported failure: {:?}", body.error_message);
        }

        Ok(SearchOutcome {
            success: body.success,
            people: body.people.into_iter().map(|raw| normalize_provider_person(raw, "bulk-search")).collect(),
            total_count: body.total_count,
            error_message: body.error_message,
        })
    }

    async fn log_call(&self, latency_ms: u64, status_code: Option<u16>, success: bool, _user_id: Option<Uuid>) {
        self.api_log
            .record(ApiLogEntry {
                provider: ProviderKind::Search,
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
