// [libs/infra/providers/src/lib.rs]
/*!
 * =================================================================
 * APARATO: PROVIDER ADAPTER FLEET (V1.0 - PRODUCTION MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: FRONTERA DE RED HACIA LOS TRES PROVEEDORES EXTERNOS
 *
 * VISION HIPER-HOLÍSTICA:
 * Sucesor directo del `WorkerClient` soberano: mismo patrón de cliente
 * `reqwest` con cabecera `Authorization: Bearer` fija, mismo rastro
 * `#[instrument]`, ahora sirviendo a tres proveedores de localización
 * y verificación de contacto en lugar de un único centro de mando.
 * =================================================================
 */

pub mod api_log_sink;
pub mod enrichment_client;
pub mod errors;
pub mod exact_search_client;
pub mod normalize;
pub mod reverse_lookup_client;
pub mod search_client;

pub use api_log_sink::ApiLogRepository;
pub use enrichment_client::EnrichmentProviderClient;
pub use errors::ClientError;
pub use exact_search_client::ExactSearchProviderClient;
pub use normalize::{normalize_provider_person, parse_composite_location, RawProviderPerson, RawProviderPhone};
pub use reverse_lookup_client::ReverseLookupScraperClient;
pub use search_client::{SearchOutcome, SearchProviderClient};
