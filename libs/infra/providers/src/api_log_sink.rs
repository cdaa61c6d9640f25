// [libs/infra/providers/src/api_log_sink.rs]
/*!
 * APARATO: API LOG SINK CONTRACT (ESTRATO L3)
 * RESPONSABILIDAD: RECEPTOR INYECTABLE DE TELEMETRÍA DE LLAMADAS SALIENTES
 */

use async_trait::async_trait;
use tracer_domain_models::ApiLogEntry;

/// Implementada por el adaptador de persistencia real; un doble de
/// prueba la implementa en memoria (`Vec<ApiLogEntry>` tras un Mutex).
/// El registro es de mejor esfuerzo: un fallo de escritura de telemetría
/// nunca debe abortar la llamada al proveedor que lo originó.
#[async_trait]
pub trait ApiLogRepository: Send + Sync {
    async fn record(&self, entry: ApiLogEntry);
}
