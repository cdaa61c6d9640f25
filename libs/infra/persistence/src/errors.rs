// [libs/infra/persistence/src/errors.rs]
/*!
 * APARATO: PERSISTENCE ERROR CATALOG (ESTRATO L3)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DE ALMACENAMIENTO
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("[L3_DB_NET_FAULT]: DATABASE_UPLINK_SEVERED -> {0}")]
    ConnectionError(String),

    #[error("[L3_DB_CONFIG_FAULT]: STRATEGIC_ENV_VOID -> {0}")]
    ConfigurationError(String),

    #[error("[L3_DB_QUERY_FAULT]: SQL_QUERY_REJECTED -> {0}")]
    QueryError(#[from] libsql::Error),

    #[error("[L3_DB_MAPPING_FAULT]: DATA_MAPPING_VIOLATION -> {0}")]
    MappingError(String),

    #[error("[L3_DB_FAULT]: TRANSACTION_COLLAPSE")]
    TransactionError,

    #[error("[L3_USER_FAULT]: IDENTIFIER_NOT_FOUND")]
    UserNotFound,

    #[error("[L3_TASK_FAULT]: IDENTIFIER_NOT_FOUND")]
    TaskNotFound,
}
