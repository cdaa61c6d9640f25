// [apps/engine/src/bootstrap.rs]
/*!
 * =================================================================
 * APARATO: COMPOSITION ROOT (ESTRATO L4 - APPLICATION)
 * RESPONSABILIDAD: CABLEADO ÚNICO DE REPOSITORIOS, ADAPTADORES Y DRIVER
 *
 * El único lugar del crate donde un tipo concreto de `tracer-infra-*`
 * se nombra directamente — todo lo que vive aguas abajo de aquí (el
 * driver, la fachada) sólo conoce traits.
 * =================================================================
 */

use std::sync::Arc;

use anyhow::Context;

use tracer_domain_pipeline::PipelineDriver;
use tracer_domain_verification::{ReverseLookupVerifier, VerifierConfig};
use tracer_infra_persistence::{
    CacheRepository, CreditJournalRepository, DbClient, InMemoryCacheRepository, ResultRepository,
    SqliteApiLogRepository, SqliteCacheRepository, SqliteResultRepository, SqliteTaskRepository,
    SqliteUserRepository, TaskRepository, UserRepository,
};
use tracer_infra_providers::{
    ApiLogRepository, EnrichmentProviderClient, ExactSearchProviderClient, ReverseLookupScraperClient,
    SearchProviderClient,
};

use crate::config::{CacheBackend, EngineConfig};
use crate::facade::SearchEngineFacade;

/// Construye la fachada completa a partir de la configuración resuelta.
/// Abre la conexión a la base de datos, aplica el esquema (dentro de
/// `DbClient::connect`) y cablea las seis operaciones externas sobre los
/// adaptadores concretos que `config` describe.
pub async fn build_facade(config: &EngineConfig) -> anyhow::Result<SearchEngineFacade> {
    let database_client = DbClient::connect(
        &config.database_connection_url,
        config.database_access_token.clone(),
    )
    .await
    .context("failed to establish the database connection")?;

    let user_repo: Arc<dyn UserRepository> = Arc::new(SqliteUserRepository::new(database_client.clone()));
    let task_repo: Arc<dyn TaskRepository> = Arc::new(SqliteTaskRepository::new(database_client.clone()));
    let result_repo: Arc<dyn ResultRepository> = Arc::new(SqliteResultRepository::new(database_client.clone()));
    let cache_repo: Arc<dyn CacheRepository> = match config.cache_backend {
        CacheBackend::Sqlite => Arc::new(SqliteCacheRepository::new(database_client.clone())),
        CacheBackend::Memory => Arc::new(InMemoryCacheRepository::new()),
    };
    let ledger = Arc::new(CreditJournalRepository::new(database_client.clone()));

    let api_log: Arc<dyn ApiLogRepository> = Arc::new(SqliteApiLogRepository::new(database_client.clone()));

    let search_provider = Arc::new(SearchProviderClient::new(
        config.search_provider_base_url.clone(),
        config.search_provider_bearer_token.clone(),
        api_log.clone(),
    ));
    let enrichment_provider = Arc::new(EnrichmentProviderClient::new(
        config.enrichment_provider_base_url.clone(),
        config.enrichment_provider_bearer_token.clone(),
        api_log.clone(),
    ));
    let exact_search_provider = Arc::new(ExactSearchProviderClient::new(
        config.exact_search_provider_base_url.clone(),
        config.exact_search_provider_bearer_token.clone(),
        api_log.clone(),
    ));
    let reverse_lookup_transport = ReverseLookupScraperClient::new(
        config.reverse_lookup_primary_base_url.clone(),
        config.reverse_lookup_fallback_base_url.clone(),
        config.reverse_lookup_bearer_token.clone(),
        api_log,
    );
    let verifier = Arc::new(ReverseLookupVerifier::new(reverse_lookup_transport, VerifierConfig::default()));

    let driver = Arc::new(PipelineDriver::new(
        user_repo.clone(),
        task_repo.clone(),
        result_repo.clone(),
        cache_repo.clone(),
        ledger.clone(),
        search_provider,
        enrichment_provider,
        exact_search_provider,
        verifier,
        config.fees,
        config.executor,
    ));

    Ok(SearchEngineFacade::new(
        user_repo,
        task_repo,
        result_repo,
        cache_repo,
        ledger,
        driver,
        config.fees,
    ))
}
