// [libs/domain/credit/src/ledger.rs]
/*!
 * =================================================================
 * APARATO: CREDIT LEDGER CONTRACT (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: DÉBITO/CRÉDITO ATÓMICO CONTRA EL BALANCE DE UN USUARIO
 *
 * # Mathematical Proof (Ledger Conservation):
 * Para todo usuario, en cualquier instante, `balance = Σ deltas del
 * journal`. El trait no ofrece una operación de escritura directa sobre
 * `balance`; toda mutación pasa por `deduct`/`settle`, que además
 * anexan la entrada de journal correspondiente en la misma unidad
 * atómica. La serialización real (exclusión mutua por fila de usuario)
 * es responsabilidad del adaptador de persistencia.
 * =================================================================
 */

use async_trait::async_trait;
use tracer_domain_models::credit::CreditJournalEntryKind;
use uuid::Uuid;

use crate::errors::CreditLedgerError;

/// Resultado de un `deduct`: el post-image del balance tras anexar la
/// entrada de journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeductOutcome {
    pub new_balance: i64,
}

/// Resultado de un `preauthorize`: equivalente a un `deduct` por el monto
/// máximo, con el entendimiento de que `settle` reconciliará más tarde.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreauthorizeOutcome {
    pub frozen_amount: i64,
    pub new_balance: i64,
}

/// Resultado de un `settle`: el neto reembolsado (positivo) o el
/// sobregiro absorbido (negativo) y el balance resultante.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleOutcome {
    pub refunded: i64,
    pub new_balance: i64,
}

/// Calcula el delta de liquidación puro entre lo congelado y lo
/// efectivamente gastado. No toca I/O; `LedgerRepository::settle` la usa
/// para derivar la entrada de journal correcta.
///
/// Devuelve un delta positivo (crédito/reembolso) si `actual_spent <
/// frozen`, negativo (débito adicional) si lo excede, cero si coincide.
pub fn compute_settlement_delta(frozen: i64, actual_spent: i64) -> i64 {
    frozen - actual_spent
}

/// Contrato soberano de gobernanza financiera. Un adaptador de
/// persistencia lo implementa garantizando que las tres operaciones de
/// escritura sean serializables por fila de usuario (spec §4.1, §8.1).
#[async_trait]
pub trait CreditLedger: Send + Sync {
    /// Debita (o, con `amount` negativo, acredita) `amount` del balance
    /// del usuario y anexa una entrada de journal. Falla con
    /// `InsufficientCredits` si el pre-image es menor que `amount` y
    /// `amount` es positivo.
    async fn deduct(
        &self,
        user_id: Uuid,
        amount: i64,
        kind: CreditJournalEntryKind,
        description: &str,
        related_task_id: Option<Uuid>,
    ) -> Result<DeductOutcome, CreditLedgerError>;

    /// Congela `max_amount` por adelantado. Implementada en términos de
    /// `deduct`; el llamador reconcilia con `settle` una vez conocido el
    /// gasto real.
    async fn preauthorize(
        &self,
        user_id: Uuid,
        max_amount: i64,
        related_task_id: Uuid,
    ) -> Result<PreauthorizeOutcome, CreditLedgerError> {
        let outcome = self
            .deduct(
                user_id,
                max_amount,
                CreditJournalEntryKind::SearchSpend,
                "preauthorization hold",
                Some(related_task_id),
            )
            .await?;
        Ok(PreauthorizeOutcome { frozen_amount: max_amount, new_balance: outcome.new_balance })
    }

    /// Reconcilia una preautorización contra el gasto real. Reembolsa el
    /// excedente, o absorbe el faltante con un clamp suave (spec §4.1:
    /// "fails soft").
    async fn settle(
        &self,
        user_id: Uuid,
        frozen: i64,
        actual_spent: i64,
        related_task_id: Uuid,
    ) -> Result<SettleOutcome, CreditLedgerError>;

    /// Lee el balance actual del usuario.
    async fn balance(&self, user_id: Uuid) -> Result<i64, CreditLedgerError>;
}
