// [libs/core/executor/src/dispatcher.rs]
/*!
 * =================================================================
 * APARATO: COHORT DISPATCH ENGINE (V1.0 - PRODUCTION MASTER)
 * CLASIFICACIÓN: CORE ENGINE (ESTRATO L1)
 * RESPONSABILIDAD: EJECUCIÓN POR COHORTES, REINTENTO ESCALONADO, PASE DIFERIDO
 *
 * # Mathematical Proof (Retry Bound):
 * Por unidad, el pase principal emite como máximo 3 intentos ante 5xx
 * (delays base, 2·base antes del segundo y tercer intento), 2 ante 429
 * (separados por 1000ms) y 2 ante fallos de transporte (separados por
 * 1000ms). Las unidades que agotan 429/5xx pasan a lo sumo una vez más
 * por el pase diferido, satisfaciendo la cota "immediate-retries + 1
 * deferred-retry" del invariante testable §8.6.
 * =================================================================
 */

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{join_all, BoxFuture};
use tracing::{debug, instrument, warn};

use crate::config::ExecutorConfig;
use crate::errors::UnitError;
use crate::report::{ExecutionFailure, ExecutionReport, ExecutorStats};

/// Predicado de gasto: consultado antes de cada cohorte con el tamaño de
/// la próxima ráfaga; si devuelve `false`, el ejecutor se detiene.
pub type CreditGate = Arc<dyn Fn(usize) -> BoxFuture<'static, bool> + Send + Sync>;

enum MainPassResolution<O> {
    Success { output: O, used_retry: bool },
    FinalFailure(UnitError),
    DeferToSecondPass(UnitError),
}

struct UnitRunOutcome<T, O> {
    unit: T,
    resolution: MainPassResolution<O>,
}

/// Ejecuta un único intento, reintentando según la clasificación del
/// error tal como la observa el llamador (spec §4.5's per-unit retry).
async fn run_unit_main_pass<T, O, F, Fut>(
    unit: T,
    executor_fn: Arc<F>,
    retry_base_ms: u64,
) -> UnitRunOutcome<T, O>
where
    T: Clone + Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, UnitError>> + Send,
{
    match executor_fn(unit.clone()).await {
        Ok(output) => {
            return UnitRunOutcome {
                unit,
                resolution: MainPassResolution::Success { output, used_retry: false },
            }
        }
        Err(UnitError::ClientError(message)) => {
            return UnitRunOutcome {
                unit,
                resolution: MainPassResolution::FinalFailure(UnitError::ClientError(message)),
            }
        }
        Err(UnitError::ServerError) => {
            // Hasta 3 intentos totales: el primero ya se consumió arriba.
            // Demora antes del 2º intento = base, antes del 3º = 2·base.
            for attempt_index in 1..=2u32 {
                let delay_ms = retry_base_ms * attempt_index as u64;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                match executor_fn(unit.clone()).await {
                    Ok(output) => {
                        return UnitRunOutcome {
                            unit,
                            resolution: MainPassResolution::Success { output, used_retry: true },
                        }
                    }
                    Err(UnitError::ServerError) => continue,
                    Err(other) => {
                        return UnitRunOutcome { unit, resolution: MainPassResolution::FinalFailure(other) }
                    }
                }
            }
            UnitRunOutcome { unit, resolution: MainPassResolution::DeferToSecondPass(UnitError::ServerError) }
        }
        Err(UnitError::RateLimitError) => {
            // Un único reintento inmediato, separado por 1000ms.
            tokio::time::sleep(Duration::from_millis(1000)).await;
            match executor_fn(unit.clone()).await {
                Ok(output) => UnitRunOutcome {
                    unit,
                    resolution: MainPassResolution::Success { output, used_retry: true },
                },
                Err(UnitError::RateLimitError) => {
                    UnitRunOutcome { unit, resolution: MainPassResolution::DeferToSecondPass(UnitError::RateLimitError) }
                }
                Err(other) => UnitRunOutcome { unit, resolution: MainPassResolution::FinalFailure(other) },
            }
        }
        Err(UnitError::TransportError) => {
            tokio::time::sleep(Duration::from_millis(1000)).await;
            match executor_fn(unit.clone()).await {
                Ok(output) => UnitRunOutcome {
                    unit,
                    resolution: MainPassResolution::Success { output, used_retry: true },
                },
                Err(other) => UnitRunOutcome { unit, resolution: MainPassResolution::FinalFailure(other) },
            }
        }
    }
}

/// Ejecuta `units` contra `executor_fn` honrando el contrato de cohortes,
/// reintento escalonado, pase diferido, cancelación y compuerta de crédito
/// descrito en spec §4.5.
#[instrument(skip_all, fields(unit_count = units.len(), batch_size = config.batch_size))]
pub async fn execute_batched<T, O, F, Fut>(
    units: Vec<T>,
    executor_fn: F,
    config: ExecutorConfig,
    cancel_signal: Arc<AtomicBool>,
    credit_gate: CreditGate,
) -> ExecutionReport<T, O>
where
    T: Clone + Send + 'static,
    O: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, UnitError>> + Send,
{
    let executor_fn = Arc::new(executor_fn);
    let mut stats = ExecutorStats {
        requests: units.len() as u32,
        ..Default::default()
    };

    let mut successes = Vec::new();
    let mut failures = Vec::new();
    let mut deferred_queue: Vec<(T, UnitError)> = Vec::new();

    let main_cohorts: Vec<Vec<T>> = units.chunks(config.batch_size.max(1)).map(|c| c.to_vec()).collect();
    let total_main_cohorts = main_cohorts.len();

    'main_pass: for (cohort_index, cohort) in main_cohorts.into_iter().enumerate() {
        if cancel_signal.load(Ordering::Relaxed) {
            debug!("🛑 [EXECUTOR]: Cancellation observed at cohort boundary, halting main pass.");
            stats.stopped_due_to_cancel = true;
            break 'main_pass;
        }

        if !credit_gate(cohort.len()).await {
            debug!("💳 [EXECUTOR]: Credit gate rejected next cohort of {} units.", cohort.len());
            stats.stopped_due_to_credits = true;
            break 'main_pass;
        }

        let tasks = cohort
            .into_iter()
            .map(|unit| run_unit_main_pass(unit, executor_fn.clone(), config.retry_base_ms));
        let outcomes = join_all(tasks).await;

        for outcome in outcomes {
            match outcome.resolution {
                MainPassResolution::Success { output, .. } => successes.push((outcome.unit, output)),
                MainPassResolution::FinalFailure(error) => {
                    failures.push(ExecutionFailure { unit: outcome.unit, error });
                }
                MainPassResolution::DeferToSecondPass(error) => {
                    deferred_queue.push((outcome.unit, error));
                }
            }
        }

        stats.total_batches += 1;

        if cohort_index + 1 < total_main_cohorts {
            tokio::time::sleep(Duration::from_millis(config.batch_delay_ms)).await;
        }
    }

    let main_pass_stopped_early = stats.stopped_due_to_cancel || stats.stopped_due_to_credits;

    if !deferred_queue.is_empty() && !main_pass_stopped_early {
        warn!(
            "⏳ [EXECUTOR]: {} units queued for deferred retry pass.",
            deferred_queue.len()
        );
        tokio::time::sleep(Duration::from_millis(config.deferred_retry_delay_ms)).await;

        let deferred_cohorts: Vec<Vec<(T, UnitError)>> = deferred_queue
            .chunks(config.deferred_batch_size.max(1))
            .map(|c| c.to_vec())
            .collect();
        let total_deferred_cohorts = deferred_cohorts.len();

        'deferred_pass: for (cohort_index, cohort) in deferred_cohorts.into_iter().enumerate() {
            if cancel_signal.load(Ordering::Relaxed) {
                stats.stopped_due_to_cancel = true;
                break 'deferred_pass;
            }
            if !credit_gate(cohort.len()).await {
                stats.stopped_due_to_credits = true;
                break 'deferred_pass;
            }

            let tasks = cohort.into_iter().map(|(unit, _original_error)| {
                let executor_fn = executor_fn.clone();
                async move {
                    let result = executor_fn(unit.clone()).await;
                    (unit, result)
                }
            });
            let outcomes = join_all(tasks).await;

            for (unit, result) in outcomes {
                stats.retry_total += 1;
                match result {
                    Ok(output) => {
                        stats.retry_success += 1;
                        successes.push((unit, output));
                    }
                    Err(error) => {
                        failures.push(ExecutionFailure { unit, error });
                    }
                }
            }

            stats.total_batches += 1;

            if cohort_index + 1 < total_deferred_cohorts {
                tokio::time::sleep(Duration::from_millis(config.deferred_batch_delay_ms)).await;
            }
        }
    } else if !deferred_queue.is_empty() {
        // El pase principal se detuvo por crédito o cancelación: las
        // unidades diferidas quedan como fallos, no se intenta recuperarlas.
        for (unit, error) in deferred_queue {
            failures.push(ExecutionFailure { unit, error });
        }
    }

    stats.failed_requests = failures.len() as u32;

    ExecutionReport { successes, failures, stats }
}

fn always_credit_gate() -> CreditGate {
    Arc::new(|_n: usize| Box::pin(async { true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn no_delay_config() -> ExecutorConfig {
        ExecutorConfig {
            batch_size: 5,
            batch_delay_ms: 0,
            retry_base_ms: 0,
            deferred_retry_delay_ms: 0,
            deferred_batch_size: 5,
            deferred_batch_delay_ms: 0,
        }
    }

    #[tokio::test]
    async fn all_units_succeed_on_first_attempt() {
        let units: Vec<u32> = (0..10).collect();
        let report = execute_batched(
            units,
            |n: u32| async move { Ok::<u32, UnitError>(n * 2) },
            no_delay_config(),
            Arc::new(AtomicBool::new(false)),
            always_credit_gate(),
        )
        .await;

        assert_eq!(report.successes.len(), 10);
        assert!(report.failures.is_empty());
        assert_eq!(report.stats.requests, 10);
        assert_eq!(report.stats.failed_requests, 0);
    }

    #[tokio::test]
    async fn rate_limited_unit_recovers_on_immediate_retry() {
        let attempts: Arc<Mutex<HashMap<u32, u32>>> = Arc::new(Mutex::new(HashMap::new()));
        let attempts_clone = attempts.clone();

        let report = execute_batched(
            vec![1u32],
            move |n: u32| {
                let attempts = attempts_clone.clone();
                async move {
                    let mut map = attempts.lock().unwrap();
                    let count = map.entry(n).or_insert(0);
                    *count += 1;
                    if *count == 1 {
                        Err(UnitError::RateLimitError)
                    } else {
                        Ok(n)
                    }
                }
            },
            no_delay_config(),
            Arc::new(AtomicBool::new(false)),
            always_credit_gate(),
        )
        .await;

        assert_eq!(report.successes.len(), 1);
        assert!(report.failures.is_empty());
        // La recuperación ocurrió en el pase principal, no en el diferido.
        assert_eq!(report.stats.retry_total, 0);
    }

    #[tokio::test]
    async fn unit_exhausting_rate_limit_recovers_in_deferred_pass() {
        let attempts: Arc<Mutex<HashMap<u32, u32>>> = Arc::new(Mutex::new(HashMap::new()));
        let attempts_clone = attempts.clone();

        let report = execute_batched(
            vec![7u32],
            move |n: u32| {
                let attempts = attempts_clone.clone();
                async move {
                    let mut map = attempts.lock().unwrap();
                    let count = map.entry(n).or_insert(0);
                    *count += 1;
                    if *count <= 2 {
                        Err(UnitError::RateLimitError)
                    } else {
                        Ok(n)
                    }
                }
            },
            no_delay_config(),
            Arc::new(AtomicBool::new(false)),
            always_credit_gate(),
        )
        .await;

        assert_eq!(report.successes.len(), 1);
        assert_eq!(report.stats.retry_total, 1);
        assert_eq!(report.stats.retry_success, 1);
    }

    #[tokio::test]
    async fn client_error_fails_without_retry() {
        let calls = Arc::new(std::sync::atomic::AtomicU32::new(0));
        let calls_clone = calls.clone();

        let report = execute_batched(
            vec![1u32],
            move |_n: u32| {
                let calls = calls_clone.clone();
                async move {
                    calls.fetch_add(1, Ordering::Relaxed);
                    Err::<u32, UnitError>(UnitError::ClientError("not found".into()))
                }
            },
            no_delay_config(),
            Arc::new(AtomicBool::new(false)),
            always_credit_gate(),
        )
        .await;

        assert_eq!(calls.load(Ordering::Relaxed), 1);
        assert_eq!(report.failures.len(), 1);
    }

    #[tokio::test]
    async fn cancellation_halts_before_next_cohort() {
        let cancel_signal = Arc::new(AtomicBool::new(false));
        let cancel_clone = cancel_signal.clone();
        cancel_clone.store(true, Ordering::Relaxed);

        let units: Vec<u32> = (0..20).collect();
        let report = execute_batched(
            units,
            |n: u32| async move { Ok::<u32, UnitError>(n) },
            no_delay_config(),
            cancel_signal,
            always_credit_gate(),
        )
        .await;

        assert!(report.stats.stopped_due_to_cancel);
        assert_eq!(report.processed_count(), 0);
    }

    #[tokio::test]
    async fn credit_gate_rejection_halts_remaining_cohorts() {
        let gate: CreditGate = Arc::new(|_n: usize| Box::pin(async { false }));

        let units: Vec<u32> = (0..10).collect();
        let report = execute_batched(
            units,
            |n: u32| async move { Ok::<u32, UnitError>(n) },
            no_delay_config(),
            Arc::new(AtomicBool::new(false)),
            gate,
        )
        .await;

        assert!(report.stats.stopped_due_to_credits);
        assert_eq!(report.processed_count(), 0);
    }
}
