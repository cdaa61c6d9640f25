// [libs/domain/pipeline/src/errors.rs]
/*!
 * APARATO: ENGINE ERROR CATALOG (ESTRATO L2)
 * RESPONSABILIDAD: TAXONOMÍA DE FALLOS DEL ORQUESTADOR DE TAREAS
 */

use thiserror::Error;

use tracer_domain_credit::CreditLedgerError;
use tracer_infra_persistence::PersistenceError;

/// Catálogo de fallos de `PipelineDriver`. Las variantes transitorias
/// (`Transient`) nunca deberían escapar del ejecutor por cohortes — si
/// una llega aquí es un error de cableado, no de presión de upstream.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("[L2_VALIDATION] {0}")]
    Validation(String),

    #[error("[L2_NOT_FOUND] task not found")]
    NotFound,

    #[error("[L2_FORBIDDEN] caller does not own this task")]
    Forbidden,

    #[error("[L2_INSUFFICIENT_CREDITS] balance {balance} below required {required}")]
    InsufficientCredits { balance: i64, required: i64 },

    #[error("[L2_API_INSUFFICIENT_CREDITS] system provider account depleted")]
    ApiInsufficientCredits,

    #[error("[L2_TRANSIENT] {0}")]
    Transient(String),

    #[error("[L2_UNKNOWN] {0}")]
    Unknown(String),
}

impl From<PersistenceError> for EngineError {
    fn from(error: PersistenceError) -> Self {
        EngineError::Unknown(error.to_string())
    }
}

impl From<CreditLedgerError> for EngineError {
    fn from(error: CreditLedgerError) -> Self {
        match error {
            CreditLedgerError::InsufficientCredits { balance, required, .. } => {
                EngineError::InsufficientCredits { balance, required }
            }
            other => EngineError::Unknown(other.to_string()),
        }
    }
}
