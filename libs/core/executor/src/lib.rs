// [libs/core/executor/src/lib.rs]
/*!
 * =================================================================
 * APARATO: BATCHED CONCURRENCY EXECUTOR (V1.0 - PRODUCTION MASTER)
 * CLASIFICACIÓN: CORE ENGINE (ESTRATO L1)
 * RESPONSABILIDAD: DESPACHO POR COHORTES CON REINTENTO ESCALONADO
 *
 * VISION HIPER-HOLÍSTICA:
 * Generalización del despachador polimórfico del dominio original
 * (antes acoplado a motores de minería) a cualquier unidad de trabajo
 * asíncrona contra un upstream sensible a tasa. El contrato es simple:
 * el llamador entrega unidades y una función async; el ejecutor decide
 * cuándo, cuántas veces y con qué espaciado invocarla.
 * =================================================================
 */

pub mod config;
pub mod errors;
pub mod report;

mod dispatcher;

pub use config::ExecutorConfig;
pub use errors::UnitError;
pub use report::{ExecutionFailure, ExecutionReport, ExecutorStats};

pub use dispatcher::{execute_batched, CreditGate};
