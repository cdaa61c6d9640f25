// [libs/infra/providers/src/reverse_lookup_client.rs]
/*!
 * =================================================================
 * APARATO: REVERSE-LOOKUP SCRAPING PROXY UPLINK (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: PUENTE HACIA LOS DOS SITIOS DE CRUCE REVERSO
 *
 * VISION HIPER-HOLÍSTICA:
 * El proxy ya hace el scraping HTML del lado del proveedor; esta frontera
 * solo habla JSON con él. `ReverseLookupTransport` (tracer-domain-verification)
 * es el contrato que este adaptador satisface — el core de verificación
 * nunca ve una URL ni un bearer token.
 * =================================================================
 */

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use tracer_domain_models::{ApiLogEntry, ProviderKind};
use tracer_domain_verification::{ReverseLookupSite, ReverseLookupTransport, ScrapedProfile, SiteCallError};

use crate::api_log_sink::ApiLogRepository;
use crate::errors::ClientError;

#[derive(Debug, Deserialize)]
struct RawScrapeResponse {
    success: bool,
    #[serde(default)]
    data: Option<RawScrapeData>,
}

#[derive(Debug, Deserialize)]
struct RawScrapeData {
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    age: Option<u32>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    raw_text: String,
}

pub struct ReverseLookupScraperClient {
    http_client: Client,
    primary_base_url: String,
    fallback_base_url: String,
    api_log: Arc<dyn ApiLogRepository>,
}

impl ReverseLookupScraperClient {
    pub fn new(
        primary_base_url: String,
        fallback_base_url: String,
        bearer_token: String,
        api_log: Arc<dyn ApiLogRepository>,
    ) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        let auth_value = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", bearer_token))
            .expect("invalid bearer token format");
        headers.insert(reqwest::header::AUTHORIZATION, auth_value);

        Self {
            http_client: Client::builder()
                .default_headers(headers)
                .user_agent("tracer-engine-reverse-lookup/1.0")
                .timeout(std::time::Duration::from_secs(20))
                .build()
                .expect("failed to build reverse-lookup scraper http client"),
            primary_base_url: primary_base_url.trim_end_matches('/').to_string(),
            fallback_base_url: fallback_base_url.trim_end_matches('/').to_string(),
            api_log,
        }
    }

    async fn call_site(&self, site: ReverseLookupSite, phone: &str) -> Result<ScrapedProfile, ClientError> {
        let started_at = Instant::now();
        let base = match site {
            ReverseLookupSite::Primary => &self.primary_base_url,
            ReverseLookupSite::Fallback => &self.fallback_base_url,
        };
        let target_url = format!("{}/v1/reverse-lookup", base);

        let response = self.http_client.get(&target_url).query(&[("phone", phone)]).send().await;
        let latency_ms = started_at.elapsed().as_millis() as u64;

        let response = match response {
            Ok(response) => response,
            Err(network_error) => {
                self.log_call(site, latency_ms, None, false).await;
                return Err(ClientError::Network(network_error));
            }
        };

        let status = response.status();
        if !status.is_success() {
            self.log_call(site, latency_ms, Some(status.as_u16()), false).await;
            return Err(ClientError::from_status(status.as_u16()));
        }

        let body: RawScrapeResponse = response.json().await?;
        self.log_call(site, latency_ms, Some(status.as_u16()), body.success).await;

        let data = body.data.unwrap_or_default();
        Ok(ScrapedProfile {
            full_name: data.full_name,
            age: data.age,
            state: data.state,
            city: data.city,
            raw_text_blob: data.raw_text,
        })
    }

    async fn log_call(&self, site: ReverseLookupSite, latency_ms: u64, status_code: Option<u16>, success: bool) {
        let provider = match site {
            ReverseLookupSite::Primary => ProviderKind::ReverseLookupPrimary,
            ReverseLookupSite::Fallback => ProviderKind::ReverseLookupFallback,
        };
        self.api_log
            .record(ApiLogEntry {
                provider,
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

impl Default for RawScrapeData {
    fn default() -> Self {
        Self { full_name: None, age: None, state: None, city: None, raw_text: String::new() }
    }
}

#[async_trait]
impl ReverseLookupTransport for ReverseLookupScraperClient {
    #[instrument(skip(self, phone))]
    async fn query(&self, site: ReverseLookupSite, phone: &str) -> Result<ScrapedProfile, SiteCallError> {
        self.call_site(site, phone).await.map_err(|error| SiteCallError::from(&error))
    }
}
