// [libs/infra/providers/src/exact_search_client.rs]
/*!
 * =================================================================
 * APARATO: EXACT-SEARCH DISCOVERY UPLINK (ESTRATO L3)
 * RESPONSABILIDAD: PUENTE HACIA EL DESCUBRIMIENTO POR SCRAPING + ENRIQUECIMIENTO
 *
 * Envoltorio sobre un proveedor que combina descubrimiento basado en
 * scraping con enriquecimiento telefónico del lado del servidor — el
 * motor nunca ve las dos llamadas que el proveedor hace internamente,
 * sólo el `LeadPerson[]` ya completo. Costo por registro más alto que
 * `SearchProviderClient`, reflejado únicamente en la tarifa que aplica
 * el driver (§4.6), no en la forma de este adaptador.
 * =================================================================
 */

use std::sync::Arc;
use std::time::Instant;

use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use tracer_domain_models::{ApiLogEntry, ProviderKind};

use crate::api_log_sink::ApiLogRepository;
use crate::errors::ClientError;
use crate::normalize::{normalize_provider_person, RawProviderPerson};
use crate::search_client::SearchOutcome;

#[derive(Debug, Deserialize)]
struct RawExactSearchResponse {
    success: bool,
    #[serde(default)]
    people: Vec<RawProviderPerson>,
    #[serde(default)]
    total_count: Option<u32>,
    #[serde(default)]
    error_message: Option<String>,
}

pub struct ExactSearchProviderClient {
    http_client: Client,
    base_url: String,
    api_log: Arc<dyn ApiLogRepository>,
}

impl ExactSearchProviderClient {
    pub fn new(base_url: String, bearer_token: String, api_log: Arc<dyn ApiLogRepository>) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        let auth_value = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", bearer_token))
            .expect("invalid bearer token format");
        headers.insert(reqwest::header::AUTHORIZATION, auth_value);

        Self {
            http_client: Client::builder()
                .default_headers(headers)
                .user_agent("tracer-engine-exact-search/1.0")
                .timeout(std::time::Duration::from_secs(180))
                .build()
                .expect("failed to build exact-search provider http client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_log,
        }
    }

    #[instrument(skip(self, title))]
    pub async fn exact_search(
        &self,
        name: &str,
        title: Option<&str>,
        state: Option<&str>,
        limit: u32,
    ) -> Result<SearchOutcome, ClientError> {
        let started_at = Instant::now();
        let target_url = format!("{}/v1/exact-search", self.base_url);

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
                self.log_call(latency_ms, None, false).await;
                return Err(ClientError::Network(network_error));
            }
        };

        let status = response.status();
        if !status.is_success() {
            self.log_call(latency_ms, Some(status.as_u16()), false).await;
            return Err(ClientError::from_status(status.as_u16()));
        }

        let body: RawExactSearchResponse = response.json().await?;
        self.log_call(latency_ms, Some(status.as_u16()), body.success).await;

        Ok(SearchOutcome {
            success: body.success,
            people: body.people.into_iter().map(|raw| normalize_provider_person(raw, "exact-scrape")).collect(),
            total_count: body.total_count,
            error_message: body.error_message,
        })
    }

    async fn log_call(&self, latency_ms: u64, status_code: Option<u16>, success: bool) {
        self.api_log
            .record(ApiLogEntry {
                provider: ProviderKind::ExactSearch,
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
