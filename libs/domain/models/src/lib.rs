// [libs/domain/models/src/lib.rs]
/*!
 * =================================================================
 * APARATO: TRACER DOMAIN MODELS (V1.0 - PRODUCTION MASTER)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: DEFINICIÓN SUPREMA DE CONTRATOS DE DOMINIO
 *
 * VISION HIPER-HOLÍSTICA:
 * Single Source of Truth compartida por el ejecutor, los adaptadores
 * de proveedor, el verificador y el orquestador de tareas. Ningún tipo
 * aquí definido conoce HTTP, SQL ni HTML: son DTOs puros.
 * =================================================================
 */

pub mod api_log;
pub mod lead;
pub mod query;
pub mod credit;
pub mod cache;
pub mod task;
pub mod result;
pub mod verification;
pub mod progress;

pub use api_log::{ApiLogEntry, ProviderKind};
pub use lead::{LeadPerson, LeadPhone, PhoneType};
pub use query::{SearchMode, SearchQueryParams, compute_query_fingerprint};
pub use credit::{CreditJournalEntry, CreditJournalEntryKind, User, UserStatus};
pub use cache::{CacheEnvelope, CacheKind, SearchCacheData};
pub use task::{SearchTask, SearchTaskStatus};
pub use result::{SearchResult, PhoneStatus};
pub use verification::{VerificationOutcome, VerificationSource, ApiErrorSignal};
pub use progress::{LogEntry, LogLevel, LogPhase, StatsSnapshot};
