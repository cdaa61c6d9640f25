// [libs/domain/pipeline/src/fees.rs]
/*!
 * APARATO: FEE SCHEDULE CONTRACT (ESTRATO L2)
 * RESPONSABILIDAD: COSTO DE CRÉDITOS RESUELTO UNA VEZ EN LA CONSTRUCCIÓN DEL DRIVER
 */

/// Tarifa de créditos del motor (spec §4.6, Design Note "globally-scoped
/// process configuration → explicit config object"): nunca un global
/// ambiental, siempre un valor inyectado al construir el driver.
#[derive(Debug, Clone, Copy)]
pub struct FeeSchedule {
    /// Costo fijo cobrado una vez por tarea enviada, antes de cualquier
    /// trabajo de cohorte (spec §4.6 step 2).
    pub base_fee: i64,
    /// Costo cobrado por cada registro que entra a la cohorte, sin
    /// importar si la verificación tiene éxito (spec glossary).
    pub per_record_fee: i64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self { base_fee: 1, per_record_fee: 2 }
    }
}

/// Mínimo fulfillment-ratio para aceptar un envelope de caché de búsqueda
/// sin refrescar contra el proveedor (spec §4.6 step 3).
pub const CACHE_FULFILLMENT_THRESHOLD: f64 = 0.80;

/// TTL de los envelopes de caché de búsqueda y de persona (spec §4.2).
pub const CACHE_TTL_DAYS: i64 = 180;
