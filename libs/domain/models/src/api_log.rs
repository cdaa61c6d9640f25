// [libs/domain/models/src/api_log.rs]
/*!
 * APARATO: PROVIDER CALL LOG CONTRACT (ESTRATO L2)
 * RESPONSABILIDAD: FORMA CANÓNICA DE UNA LLAMADA SALIENTE REGISTRADA
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A qué adaptador de proveedor corresponde una entrada de log.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Search,
    ExactSearch,
    Enrichment,
    ReverseLookupPrimary,
    ReverseLookupFallback,
}

/// Registro de una llamada saliente a un proveedor externo (spec §4.3):
/// latencia, código de estado, éxito y créditos asociados.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiLogEntry {
    pub provider: ProviderKind,
    pub latency_ms: u64,
    pub status_code: Option<u16>,
    pub success: bool,
    pub credits_charged: Option<f64>,
    pub related_task_id: Option<uuid::Uuid>,
    pub created_at: DateTime<Utc>,
}
