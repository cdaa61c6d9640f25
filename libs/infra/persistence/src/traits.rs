// [libs/infra/persistence/src/traits.rs]
/*!
 * APARATO: REPOSITORY TRAIT CONTRACTS (ESTRATO L3)
 * RESPONSABILIDAD: FRONTERA ABSTRACTA HACIA EL SUSTRATO DE PERSISTENCIA
 *
 * Cada trait es implementado una vez por `libsql` (producción) y, donde
 * tiene sentido para el arnés de CLI y las pruebas, por un doble en
 * memoria. El dominio y el driver sólo conocen estos contratos.
 */

use async_trait::async_trait;
use tracer_domain_models::{CacheEnvelope, SearchResult, SearchTask, User};

use crate::errors::PersistenceError;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<User>, PersistenceError>;
    /// Crea el usuario con el balance dado si todavía no existe; no-op si ya existe.
    async fn ensure_exists(&self, user_id: &str, initial_balance: i64) -> Result<(), PersistenceError>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create(&self, task: &SearchTask) -> Result<(), PersistenceError>;
    async fn get(&self, task_id: &str) -> Result<Option<SearchTask>, PersistenceError>;
    /// Resuelve por el token opaco público en lugar del id primario interno —
    /// la única llave que un llamador externo (fachada, futura capa RPC) conoce.
    async fn get_by_token(&self, token: &str) -> Result<Option<SearchTask>, PersistenceError>;
    async fn list(&self, submitter_id: &str) -> Result<Vec<SearchTask>, PersistenceError>;
    /// Persiste el estado mutable completo (progreso, bitácora, estadísticas).
    async fn save_progress(&self, task: &SearchTask) -> Result<(), PersistenceError>;
    /// Marca la tarea como `stopped` si todavía no alcanzó un estado terminal.
    /// Retorna `true` si la cancelación surtió efecto.
    async fn cancel(&self, task_id: &str) -> Result<bool, PersistenceError>;
}

#[async_trait]
pub trait ResultRepository: Send + Sync {
    async fn insert_many(&self, results: &[SearchResult]) -> Result<(), PersistenceError>;
    async fn list_for_task(&self, task_id: &str) -> Result<Vec<SearchResult>, PersistenceError>;
}

#[async_trait]
pub trait CacheRepository: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<CacheEnvelope>, PersistenceError>;
    async fn put(&self, envelope: CacheEnvelope) -> Result<(), PersistenceError>;
    async fn increment_hit(&self, key: &str) -> Result<(), PersistenceError>;
}
