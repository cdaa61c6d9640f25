// [apps/engine/src/errors.rs]
/*!
 * APARATO: FACADE ERROR CATALOG (ESTRATO L4 - APPLICATION)
 * RESPONSABILIDAD: TAXONOMÍA DE FALLOS DE LAS SEIS OPERACIONES EXTERNAS (spec §6/§7)
 */

use thiserror::Error;

use tracer_domain_pipeline::EngineError;

/// Superconjunto de `EngineError` con los dos fallos que sólo tienen
/// sentido en la frontera de la fachada: `UserNotFound` (spec §6's
/// `user-not-found` para `preview`) y `NotReady` (spec §6's `not-ready`
/// para `exportCsv` pedido antes de un estado terminal).
#[derive(Debug, Error)]
pub enum FacadeError {
    #[error("[L4_USER_NOT_FOUND] user does not exist")]
    UserNotFound,

    #[error("[L4_NOT_FOUND] task not found")]
    NotFound,

    #[error("[L4_FORBIDDEN] caller does not own this task")]
    Forbidden,

    #[error("[L4_NOT_READY] task has not reached a terminal state yet")]
    NotReady,

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl From<tracer_infra_persistence::PersistenceError> for FacadeError {
    fn from(error: tracer_infra_persistence::PersistenceError) -> Self {
        FacadeError::Engine(EngineError::Unknown(error.to_string()))
    }
}
