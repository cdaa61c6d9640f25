// [libs/domain/pipeline/src/status.rs]
/*!
 * APARATO: INTERNAL→PERSISTED STATUS MAP (ESTRATO L2)
 * RESPONSABILIDAD: ÚNICA AUTORIDAD DE MAPEO DE FASE A ESTADO PERSISTIDO (C8 §4.8)
 */

use tracer_domain_models::SearchTaskStatus;

/// Fase interna del driver, previa a cualquier persistencia de estado.
/// Nunca se escribe tal cual a la fila de la tarea — sólo su proyección
/// vía `to_persisted_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverPhase {
    Initializing,
    Searching,
    Processing,
    Verifying,
    Completed,
    Failed,
    Stopped,
    InsufficientCredits,
}

/// Única autoridad para el mapeo interno→persistido de spec §4.8:
/// `{initializing, searching, processing, verifying} → running`;
/// los estados terminales persisten como ellos mismos.
pub fn to_persisted_status(phase: DriverPhase) -> SearchTaskStatus {
    match phase {
        DriverPhase::Initializing | DriverPhase::Searching | DriverPhase::Processing | DriverPhase::Verifying => {
            SearchTaskStatus::Running
        }
        DriverPhase::Completed => SearchTaskStatus::Completed,
        DriverPhase::Failed => SearchTaskStatus::Failed,
        DriverPhase::Stopped => SearchTaskStatus::Stopped,
        DriverPhase::InsufficientCredits => SearchTaskStatus::InsufficientCredits,
    }
}
