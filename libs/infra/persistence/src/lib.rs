// [libs/infra/persistence/src/lib.rs]
/*!
 * =================================================================
 * APARATO: TRACER PERSISTENCE ADAPTER (V1.0 - PRODUCTION MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: FRONTERA DE PERSISTENCIA ACID HACIA `libsql`
 * =================================================================
 */

pub mod api_log_repository;
pub mod cache_repository;
pub mod client;
pub mod credit_repository;
pub mod errors;
pub mod memory_cache;
pub mod queries;
pub mod result_repository;
pub mod schema;
pub mod task_repository;
pub mod traits;
pub mod user_repository;

pub use api_log_repository::SqliteApiLogRepository;
pub use cache_repository::SqliteCacheRepository;
pub use client::DbClient;
pub use credit_repository::CreditJournalRepository;
pub use errors::PersistenceError;
pub use memory_cache::InMemoryCacheRepository;
pub use result_repository::SqliteResultRepository;
pub use task_repository::SqliteTaskRepository;
pub use traits::{CacheRepository, ResultRepository, TaskRepository, UserRepository};
pub use user_repository::SqliteUserRepository;
