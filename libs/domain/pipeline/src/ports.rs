// [libs/domain/pipeline/src/ports.rs]
/*!
 * =================================================================
 * APARATO: DRIVER-LOCAL PORT ABSTRACTIONS (ESTRATO L2)
 * RESPONSABILIDAD: FRONTERAS INYECTABLES ENTRE EL DRIVER Y C3/C4
 *
 * VISION HIPER-HOLÍSTICA:
 * El driver nunca depende de los tipos concretos de `tracer-infra-providers`
 * ni de `tracer-domain-verification` directamente — sólo de estos traits,
 * satisfechos aquí mismo por la regla de huérfanos (el trait es local, el
 * tipo no lo es). Esto deja al driver probable contra dobles en memoria
 * sin que `tracer-infra-providers` sepa nada del orquestador.
 * =================================================================
 */

use async_trait::async_trait;

use tracer_domain_models::LeadPerson;
use tracer_domain_verification::{ReverseLookupTransport, ReverseLookupVerifier, VerificationOutcome, VerificationQuery};
use tracer_infra_providers::{ClientError, EnrichmentProviderClient, ExactSearchProviderClient, SearchOutcome, SearchProviderClient};

#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(
        &self,
        name: &str,
        title: Option<&str>,
        state: Option<&str>,
        limit: u32,
        user_id: uuid::Uuid,
    ) -> Result<SearchOutcome, ClientError>;
}

#[async_trait]
impl SearchProvider for SearchProviderClient {
    async fn search(
        &self,
        name: &str,
        title: Option<&str>,
        state: Option<&str>,
        limit: u32,
        user_id: uuid::Uuid,
    ) -> Result<SearchOutcome, ClientError> {
        SearchProviderClient::search(self, name, title, state, limit, user_id).await
    }
}

#[async_trait]
pub trait EnrichmentProvider: Send + Sync {
    async fn enrich(&self, provider_id: &str, user_id: uuid::Uuid) -> Result<Option<LeadPerson>, ClientError>;
}

#[async_trait]
impl EnrichmentProvider for EnrichmentProviderClient {
    async fn enrich(&self, provider_id: &str, user_id: uuid::Uuid) -> Result<Option<LeadPerson>, ClientError> {
        EnrichmentProviderClient::enrich(self, provider_id, user_id).await
    }
}

#[async_trait]
pub trait ExactSearchProvider: Send + Sync {
    async fn exact_search(
        &self,
        name: &str,
        title: Option<&str>,
        state: Option<&str>,
        limit: u32,
    ) -> Result<SearchOutcome, ClientError>;
}

#[async_trait]
impl ExactSearchProvider for ExactSearchProviderClient {
    async fn exact_search(
        &self,
        name: &str,
        title: Option<&str>,
        state: Option<&str>,
        limit: u32,
    ) -> Result<SearchOutcome, ClientError> {
        ExactSearchProviderClient::exact_search(self, name, title, state, limit).await
    }
}

/// Verifica un teléfono contra un perfil esperado (C4). El blanket impl
/// debajo cubre cualquier `ReverseLookupVerifier<T>` sin que este crate
/// conozca el transporte concreto que lo respalda.
#[async_trait]
pub trait PhoneVerifier: Send + Sync {
    async fn verify(&self, phone: &str, query: &VerificationQuery) -> VerificationOutcome;
}

#[async_trait]
impl<T: ReverseLookupTransport> PhoneVerifier for ReverseLookupVerifier<T> {
    async fn verify(&self, phone: &str, query: &VerificationQuery) -> VerificationOutcome {
        ReverseLookupVerifier::verify(self, phone, query).await
    }
}
