// [libs/core/executor/src/config.rs]
/*!
 * APARATO: EXECUTOR TUNING CONTRACT (ESTRATO L1)
 * RESPONSABILIDAD: PARÁMETROS DE COHORTE Y REINTENTO, RESUELTOS UNA VEZ
 * EN LA CONSTRUCCIÓN DEL LLAMADOR — NUNCA COMO GLOBALES AMBIENTALES.
 */

/// Parámetros del motor de despacho por cohortes (spec §4.5).
#[derive(Debug, Clone, Copy)]
pub struct ExecutorConfig {
    /// Tamaño de cohorte del pase principal.
    pub batch_size: usize,
    /// Pausa obligatoria entre cohortes del pase principal (ms).
    pub batch_delay_ms: u64,
    /// Base del backoff exponencial para reintentos de 5xx (ms).
    pub retry_base_ms: u64,
    /// Espera previa al pase diferido (RETRY_DELAY_MS, ms).
    pub deferred_retry_delay_ms: u64,
    /// Tamaño de cohorte del pase diferido.
    pub deferred_batch_size: usize,
    /// Pausa entre cohortes del pase diferido (ms).
    pub deferred_batch_delay_ms: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            batch_size: 30,
            batch_delay_ms: 500,
            retry_base_ms: 2000,
            deferred_retry_delay_ms: 3000,
            deferred_batch_size: 8,
            deferred_batch_delay_ms: 800,
        }
    }
}
