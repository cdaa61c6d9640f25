// [libs/domain/credit/src/errors.rs]
/*!
 * APARATO: CREDIT LEDGER ERROR CATALOG (ESTRATO L2)
 * RESPONSABILIDAD: FALLOS SEMÁNTICOS DE LA GOBERNANZA FINANCIERA
 */

use uuid::Uuid;

/// Catálogo de fallos de `CreditLedger`. Cada variante corresponde a un
/// invariante de negocio, no a un detalle de transporte o almacenamiento.
#[derive(Debug, thiserror::Error)]
pub enum CreditLedgerError {
    #[error("[L2_INSUFFICIENT_CREDITS] user {user_id} has balance {balance}, required {required}")]
    InsufficientCredits { user_id: Uuid, balance: i64, required: i64 },

    #[error("[L2_USER_NOT_FOUND] user {0} does not exist")]
    UserNotFound(Uuid),

    #[error("[L2_JOURNAL_APPEND_FAILED] journal append failed for user {user_id}: {reason}")]
    JournalAppendFailed { user_id: Uuid, reason: String },

    #[error("[L2_SERIALIZATION_CONFLICT] concurrent write detected on user {0}, retry")]
    SerializationConflict(Uuid),

    /// Envuelve un fallo del adaptador de persistencia sin crear una
    /// dependencia hacia su tipo de error concreto.
    #[error("[L2_STORAGE_FAULT] ledger storage operation failed: {0}")]
    Storage(String),
}
