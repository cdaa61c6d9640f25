// [libs/domain/progress/src/lib.rs]
/*!
 * =================================================================
 * APARATO: PROGRESS & LOG ENVELOPE ENGINE (V1.0 - PRODUCTION MASTER)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: CÓMPUTO DE PORCENTAJE Y ACUMULACIÓN DE BITÁCORA
 *
 * # Mathematical Proof (Progress Monotonicity):
 * `totalSteps = requestedCount + FIXED_OVERHEAD_STEPS` es constante por
 * tarea; `progress = round(currentStep / totalSteps · 100)` es monótono
 * no decreciente mientras `currentStep` solo crezca, y se fija a 100 en
 * `finalize` independientemente del cociente, honrando spec §4.6.9.
 * =================================================================
 */

use chrono::Utc;

use tracer_domain_models::progress::{
    LogEntry, LogLevel, LogPhase, StatsSnapshot, STATS_SENTINEL_MESSAGE,
};

/// Pasos fijos de overhead (init + finalize) sumados al tamaño de cohorte
/// solicitado para derivar `totalSteps` (spec §4.7).
pub const FIXED_OVERHEAD_STEPS: u32 = 10;

/// Calcula el porcentaje de progreso para un paso dado, acotado a [0, 100].
pub fn compute_progress_percent(current_step: u32, requested_count: u32) -> u8 {
    let total_steps = requested_count + FIXED_OVERHEAD_STEPS;
    if total_steps == 0 {
        return 100;
    }
    let ratio = current_step as f64 / total_steps as f64 * 100.0;
    ratio.round().clamp(0.0, 100.0) as u8
}

/// Envelope acumulativo de bitácora: agrupa las entradas de una tarea y
/// decide cuándo el llamador debe persistir (cada 1–5 anexos, spec §4.7).
pub struct LogEnvelope {
    entries: Vec<LogEntry>,
    appends_since_flush: u32,
    flush_every: u32,
}

impl LogEnvelope {
    pub fn new(flush_every: u32) -> Self {
        Self { entries: Vec::new(), appends_since_flush: 0, flush_every: flush_every.max(1) }
    }

    /// Anexa una entrada y señala si corresponde persistir el envelope
    /// completo a la fila de la tarea en esta vuelta.
    pub fn append(&mut self, entry: LogEntry) -> bool {
        self.entries.push(entry);
        self.appends_since_flush += 1;
        if self.appends_since_flush >= self.flush_every {
            self.appends_since_flush = 0;
            true
        } else {
            false
        }
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<LogEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Construye una entrada de progreso regular (no la entrada sintética de stats).
pub fn log_entry(
    level: LogLevel,
    phase: LogPhase,
    message: impl Into<String>,
    step: Option<u32>,
    total: Option<u32>,
) -> LogEntry {
    LogEntry {
        timestamp: Utc::now(),
        level,
        phase,
        step,
        total,
        message: message.into(),
        details: None,
    }
}

/// Construye la entrada final sintética que lleva el snapshot de stats
/// completo bajo el token `"__STATS__"`, permitiendo que un UI lea stats
/// estructurados sin re-parsear la prosa de la bitácora.
pub fn stats_entry(stats: &StatsSnapshot) -> LogEntry {
    LogEntry {
        timestamp: Utc::now(),
        level: LogLevel::Info,
        phase: LogPhase::Complete,
        step: None,
        total: None,
        message: STATS_SENTINEL_MESSAGE.to_string(),
        details: serde_json::to_value(stats).ok(),
    }
}

/// Recupera el snapshot de stats de una bitácora ya persistida, invirtiendo
/// `stats_entry`. Usado por un poller (o la fachada del arnés de CLI) para
/// leer stats estructurados sin re-parsear los mensajes de prosa.
pub fn extract_stats(entries: &[LogEntry]) -> Option<StatsSnapshot> {
    entries
        .iter()
        .rev()
        .find(|entry| entry.message == STATS_SENTINEL_MESSAGE)
        .and_then(|entry| entry.details.clone())
        .and_then(|details| serde_json::from_value(details).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_at_first_step_is_small_but_nonzero() {
        let percent = compute_progress_percent(1, 50);
        assert_eq!(percent, 2); // round(1/60*100) = 1.666.. -> 2
    }

    #[test]
    fn progress_caps_at_one_hundred() {
        let percent = compute_progress_percent(1000, 50);
        assert_eq!(percent, 100);
    }

    #[test]
    fn progress_overhead_accounts_for_init_and_finalize() {
        // All requested records done, but 10 overhead steps remain unaccounted.
        let percent = compute_progress_percent(50, 50);
        assert_eq!(percent, 83); // round(50/60*100) = 83.33.. -> 83
    }

    #[test]
    fn envelope_signals_flush_at_configured_cadence() {
        let mut envelope = LogEnvelope::new(3);
        assert!(!envelope.append(log_entry(LogLevel::Info, LogPhase::Init, "a", None, None)));
        assert!(!envelope.append(log_entry(LogLevel::Info, LogPhase::Init, "b", None, None)));
        assert!(envelope.append(log_entry(LogLevel::Info, LogPhase::Init, "c", None, None)));
        assert_eq!(envelope.len(), 3);
    }

    #[test]
    fn stats_entry_carries_sentinel_message() {
        let stats = StatsSnapshot {
            total_results: 10,
            results_verified: 8,
            results_received: 2,
            excluded_no_contact: 0,
            excluded_age: 1,
            excluded_error: 0,
            requests: 10,
            failed_requests: 0,
            retry_success: 0,
            retry_total: 0,
            total_batches: 1,
            stopped_due_to_credits: false,
            stopped_due_to_cancel: false,
        };
        let entry = stats_entry(&stats);
        assert_eq!(entry.message, STATS_SENTINEL_MESSAGE);
        assert!(entry.details.is_some());
    }

    #[test]
    fn extract_stats_round_trips_through_a_log_envelope() {
        let stats = StatsSnapshot { total_results: 5, results_verified: 3, ..Default::default() };
        let entries = vec![
            log_entry(LogLevel::Info, LogPhase::Init, "opening", Some(1), Some(10)),
            stats_entry(&stats),
        ];
        let recovered = extract_stats(&entries).expect("stats entry must be recoverable");
        assert_eq!(recovered.total_results, 5);
        assert_eq!(recovered.results_verified, 3);
    }

    #[test]
    fn extract_stats_is_none_without_a_sentinel_entry() {
        let entries = vec![log_entry(LogLevel::Info, LogPhase::Init, "opening", Some(1), Some(10))];
        assert!(extract_stats(&entries).is_none());
    }
}
