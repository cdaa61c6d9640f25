// [libs/domain/models/src/credit.rs]
/*!
 * =================================================================
 * APARATO: CREDIT LEDGER CONTRACT (V1.0 - PRODUCTION MASTER)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: FORMA CANÓNICA DEL BALANCE Y DEL DIARIO DE CRÉDITOS
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Suspended,
}

/// Snapshot del usuario relevante para el motor: sólo balance y estado.
/// Autenticación, sesión y RBAC son colaboradores externos fuera de alcance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub credit_balance: i64,
    pub status: UserStatus,
}

/// Naturaleza de un movimiento en el diario de créditos.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CreditJournalEntryKind {
    Recharge,
    SearchSpend,
    AdminAdjust,
    Refund,
    Bonus,
}

/// Entrada de sólo-append del diario de créditos. Nunca se actualiza.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditJournalEntry {
    pub id: String,
    pub user_id: String,
    /// Negativo para consumo, positivo para recarga/reembolso.
    pub delta: i64,
    pub balance_after: i64,
    pub kind: CreditJournalEntryKind,
    pub description: String,
    pub related_task_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
