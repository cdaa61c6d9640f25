// [libs/domain/pipeline/src/lib.rs]
/*!
 * =================================================================
 * APARATO: CREDIT-METERED PIPELINE DRIVER (V1.0 - PRODUCTION MASTER)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: COMPOSICIÓN DE C1/C2/C3/C4/C5 EN LA MÁQUINA DE ESTADOS
 * DE UNA SEARCH TASK
 * =================================================================
 */

pub mod driver;
pub mod errors;
pub mod fees;
pub mod ports;
pub mod status;

pub use driver::{PipelineDriver, SubmitParams};
pub use errors::EngineError;
pub use fees::{FeeSchedule, CACHE_FULFILLMENT_THRESHOLD, CACHE_TTL_DAYS};
pub use ports::{EnrichmentProvider, ExactSearchProvider, PhoneVerifier, SearchProvider};
pub use status::{to_persisted_status, DriverPhase};
