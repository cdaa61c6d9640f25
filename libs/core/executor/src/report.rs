// [libs/core/executor/src/report.rs]
/*!
 * APARATO: EXECUTOR REPORT CONTRACT (ESTRATO L1)
 * RESPONSABILIDAD: FORMA CANÓNICA DE LA SALIDA DE UNA EJECUCIÓN POR COHORTES
 */

use crate::errors::UnitError;

/// Una unidad que no sobrevivió a su presupuesto de reintentos, junto al
/// insumo original para que el llamador pueda decidir (reembolso, log).
#[derive(Debug, Clone)]
pub struct ExecutionFailure<T> {
    pub unit: T,
    pub error: UnitError,
}

/// Estadísticas acumuladas de una ejecución (ambos pases incluidos).
#[derive(Debug, Clone, Default)]
pub struct ExecutorStats {
    pub requests: u32,
    pub failed_requests: u32,
    pub retry_success: u32,
    pub retry_total: u32,
    pub total_batches: u32,
    pub stopped_due_to_credits: bool,
    pub stopped_due_to_cancel: bool,
}

/// Resultado completo de `execute_batched`: spec §4.5's `{successes[],
/// failures[], stats}` triplet.
#[derive(Debug, Clone)]
pub struct ExecutionReport<T, O> {
    pub successes: Vec<(T, O)>,
    pub failures: Vec<ExecutionFailure<T>>,
    pub stats: ExecutorStats,
}

impl<T, O> ExecutionReport<T, O> {
    pub fn processed_count(&self) -> usize {
        self.successes.len() + self.failures.len()
    }
}
