// [apps/engine/src/config.rs]
/*!
 * =================================================================
 * APARATO: ENGINE CONFIGURATION CONTRACT (ESTRATO L4 - APPLICATION)
 * RESPONSABILIDAD: RESOLUCIÓN ÚNICA DE CONFIGURACIÓN DESDE EL ENTORNO
 *
 * VISION HIPER-HOLÍSTICA:
 * Todo lo que el driver y los adaptadores necesitan para arrancar se
 * resuelve una sola vez, aquí, al construir `EngineConfig::from_env()` —
 * nunca como una variable de entorno consultada ad-hoc en medio de la
 * lógica de negocio (Design Note "globally-scoped process configuration
 * → explicit config object").
 * =================================================================
 */

use tracer_core_executor::ExecutorConfig;
use tracer_domain_pipeline::FeeSchedule;

/// Selector del backend de caché del arnés de CLI. La producción real
/// siempre usa `Sqlite` (respaldado por `libsql`); `Memory` existe para
/// pruebas y para correr el motor sin un archivo de base de datos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Sqlite,
    Memory,
}

/// Configuración resuelta una sola vez al arrancar el proceso.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub database_connection_url: String,
    pub database_access_token: Option<String>,
    pub cache_backend: CacheBackend,

    pub search_provider_base_url: String,
    pub search_provider_bearer_token: String,
    pub enrichment_provider_base_url: String,
    pub enrichment_provider_bearer_token: String,
    pub exact_search_provider_base_url: String,
    pub exact_search_provider_bearer_token: String,
    pub reverse_lookup_primary_base_url: String,
    pub reverse_lookup_fallback_base_url: String,
    pub reverse_lookup_bearer_token: String,

    pub fees: FeeSchedule,
    pub executor: ExecutorConfig,

    /// Nombre de servicio reportado a `tracer_shared_telemetry::init_tracing`.
    pub service_name: String,
}

impl EngineConfig {
    /// Hidrata la configuración desde variables de entorno (`dotenvy` ya
    /// debe haberse cargado en `main`). Valores ausentes de infraestructura
    /// obligatoria (`DATABASE_URL`) son un `CRITICAL_FAULT`; el resto cae a
    /// defaults razonables para correr contra un mock local.
    pub fn from_env() -> Self {
        let database_connection_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| ":memory:".to_string());
        let database_access_token = std::env::var("TURSO_AUTH_TOKEN").ok();

        let cache_backend = match std::env::var("CACHE_BACKEND").unwrap_or_default().as_str() {
            "memory" => CacheBackend::Memory,
            _ => CacheBackend::Sqlite,
        };

        let fees = FeeSchedule {
            base_fee: env_parse_i64("BASE_FEE", FeeSchedule::default().base_fee),
            per_record_fee: env_parse_i64("PER_RECORD_FEE", FeeSchedule::default().per_record_fee),
        };

        let default_executor = ExecutorConfig::default();
        let executor = ExecutorConfig {
            batch_size: env_parse_usize("BATCH_SIZE", default_executor.batch_size),
            batch_delay_ms: env_parse_u64("BATCH_DELAY_MS", default_executor.batch_delay_ms),
            retry_base_ms: env_parse_u64("RETRY_BASE_MS", default_executor.retry_base_ms),
            deferred_retry_delay_ms: env_parse_u64(
                "RETRY_DELAY_MS",
                default_executor.deferred_retry_delay_ms,
            ),
            deferred_batch_size: env_parse_usize(
                "DEFERRED_BATCH_SIZE",
                default_executor.deferred_batch_size,
            ),
            deferred_batch_delay_ms: env_parse_u64(
                "DEFERRED_BATCH_DELAY_MS",
                default_executor.deferred_batch_delay_ms,
            ),
        };

        Self {
            database_connection_url,
            database_access_token,
            cache_backend,
            search_provider_base_url: env_or("SEARCH_PROVIDER_BASE_URL", "https://search.example.invalid"),
            search_provider_bearer_token: env_or("SEARCH_PROVIDER_TOKEN", ""),
            enrichment_provider_base_url: env_or(
                "ENRICHMENT_PROVIDER_BASE_URL",
                "https://enrichment.example.invalid",
            ),
            enrichment_provider_bearer_token: env_or("ENRICHMENT_PROVIDER_TOKEN", ""),
            exact_search_provider_base_url: env_or(
                "EXACT_SEARCH_PROVIDER_BASE_URL",
                "https://exact-search.example.invalid",
            ),
            exact_search_provider_bearer_token: env_or("EXACT_SEARCH_PROVIDER_TOKEN", ""),
            reverse_lookup_primary_base_url: env_or(
                "REVERSE_LOOKUP_PRIMARY_BASE_URL",
                "https://reverse-lookup-primary.example.invalid",
            ),
            reverse_lookup_fallback_base_url: env_or(
                "REVERSE_LOOKUP_FALLBACK_BASE_URL",
                "https://reverse-lookup-fallback.example.invalid",
            ),
            reverse_lookup_bearer_token: env_or("REVERSE_LOOKUP_TOKEN", ""),
            fees,
            executor,
            service_name: env_or("SERVICE_NAME", "tracer_engine"),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse_i64(key: &str, default: i64) -> i64 {
    std::env::var(key).ok().and_then(|value| value.parse().ok()).unwrap_or(default)
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key).ok().and_then(|value| value.parse().ok()).unwrap_or(default)
}

fn env_parse_usize(key: &str, default: usize) -> usize {
    std::env::var(key).ok().and_then(|value| value.parse().ok()).unwrap_or(default)
}
