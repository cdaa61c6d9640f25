// [apps/engine/src/lib.rs]
/*!
 * =================================================================
 * APARATO: SEARCH ENGINE LIBRARY KERNEL (ESTRATO L4 - APPLICATION)
 * RESPONSABILIDAD: EXPOSICIÓN SOBERANA DE LA FACHADA DEL MOTOR
 *
 * VISION HIPER-HOLÍSTICA:
 * El binario (`main.rs`) es un orquestador ligero de argumentos; toda la
 * lógica de composición y de las seis operaciones externas vive aquí,
 * auditable independientemente del arnés de CLI.
 * =================================================================
 */

pub mod bootstrap;
pub mod config;
pub mod csv_export;
pub mod dto;
pub mod errors;
pub mod facade;

pub use bootstrap::build_facade;
pub use config::{CacheBackend, EngineConfig};
pub use errors::FacadeError;
pub use facade::SearchEngineFacade;

/// Colección de tipos esenciales para consumir el motor desde un arnés externo.
pub mod prelude {
    pub use crate::config::{CacheBackend, EngineConfig};
    pub use crate::dto::*;
    pub use crate::errors::FacadeError;
    pub use crate::facade::SearchEngineFacade;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Certifica que la jerarquía de módulos pública es íntegra.
    #[test]
    fn certify_engine_kernel_visibility() {
        let _facade_id = std::any::TypeId::of::<SearchEngineFacade>();
        let _config_id = std::any::TypeId::of::<EngineConfig>();
        let _error_id = std::any::TypeId::of::<FacadeError>();
        println!("✅ ENGINE_LIB: Structural link and module parity certified.");
    }
}
