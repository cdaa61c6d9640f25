// [libs/domain/models/src/progress.rs]
/*!
 * =================================================================
 * APARATO: PROGRESS & LOG ENVELOPE CONTRACT (V1.0 - PRODUCTION MASTER)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: FORMA CANÓNICA DE LA BITÁCORA ESTRUCTURADA (C7)
 *
 * VISION HIPER-HOLÍSTICA:
 * La bitácora es la única superficie de progreso expuesta a un poller;
 * se modela como un snapshot de valor persistido en transiciones, no
 * como un flujo de eventos push (Design Note 2 de la especificación).
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// El token sintético que marca la entrada final de estadísticas.
pub const STATS_SENTINEL_MESSAGE: &str = "__STATS__";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
    Debug,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogPhase {
    Init,
    Apify,
    Process,
    Verify,
    Complete,
}

/// Una entrada de la bitácora ordenada de una tarea.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub phase: LogPhase,
    pub step: Option<u32>,
    pub total: Option<u32>,
    pub message: String,
    pub details: Option<Value>,
}

/// Estadísticas acumuladas de una ejecución de tarea, embebidas en la
/// entrada final bajo `details` junto al mensaje sentinela.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_results: u32,
    pub results_verified: u32,
    pub results_received: u32,
    pub excluded_no_contact: u32,
    pub excluded_age: u32,
    pub excluded_error: u32,
    pub requests: u32,
    pub failed_requests: u32,
    pub retry_success: u32,
    pub retry_total: u32,
    pub total_batches: u32,
    pub stopped_due_to_credits: bool,
    pub stopped_due_to_cancel: bool,
}
