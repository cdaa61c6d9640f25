// [libs/infra/persistence/src/credit_repository.rs]
/*!
 * =================================================================
 * APARATO: CREDIT JOURNAL REPOSITORY (ESTRATO L3)
 * RESPONSABILIDAD: IMPLEMENTACIÓN SERIALIZABLE DEL LIBRO MAYOR DE CRÉDITOS
 *
 * # Mathematical Proof (Transactional Exclusivity):
 * Toda mutación de balance abre una transacción que relee la fila del
 * usuario, valida la operación contra ese pre-image, y escribe el nuevo
 * balance junto a la entrada de journal antes de comprometer — el mismo
 * semáforo ACID que protege la asignación de rangos de exploración,
 * generalizado a un balance de créditos en lugar de un rango U256.
 * =================================================================
 */

use async_trait::async_trait;
use chrono::Utc;
use libsql::params;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use tracer_domain_credit::{CreditLedger, CreditLedgerError, DeductOutcome, SettleOutcome, compute_settlement_delta};
use tracer_domain_models::credit::CreditJournalEntryKind;

use crate::client::DbClient;
use crate::queries;

pub struct CreditJournalRepository {
    database_client: DbClient,
}

impl CreditJournalRepository {
    pub fn new(client: DbClient) -> Self {
        Self { database_client: client }
    }

    fn journal_kind_tag(kind: CreditJournalEntryKind) -> &'static str {
        match kind {
            CreditJournalEntryKind::Recharge => "recharge",
            CreditJournalEntryKind::SearchSpend => "search-spend",
            CreditJournalEntryKind::AdminAdjust => "admin-adjust",
            CreditJournalEntryKind::Refund => "refund",
            CreditJournalEntryKind::Bonus => "bonus",
        }
    }

    async fn read_balance_in_tx(
        transaction: &libsql::Transaction,
        user_id: Uuid,
    ) -> Result<i64, CreditLedgerError> {
        let mut rows = transaction
            .query(queries::GET_USER, params![user_id.to_string()])
            .await
            .map_err(|e| CreditLedgerError::Storage(e.to_string()))?;

        match rows.next().await.map_err(|e| CreditLedgerError::Storage(e.to_string()))? {
            Some(row) => row
                .get::<i64>(1)
                .map_err(|e| CreditLedgerError::Storage(e.to_string())),
            None => Err(CreditLedgerError::UserNotFound(user_id)),
        }
    }

    #[instrument(skip(self, description))]
    async fn apply_delta(
        &self,
        user_id: Uuid,
        delta: i64,
        kind: CreditJournalEntryKind,
        description: &str,
        related_task_id: Option<Uuid>,
        reject_insufficient: bool,
    ) -> Result<(i64, i64), CreditLedgerError> {
        let user_id_text = user_id.to_string();
        let connection = self
            .database_client
            .get_connection()
            .map_err(|e| CreditLedgerError::Storage(e.to_string()))?;

        let transaction = connection
            .transaction()
            .await
            .map_err(|e| CreditLedgerError::Storage(e.to_string()))?;

        let pre_image_balance = Self::read_balance_in_tx(&transaction, user_id).await?;

        if reject_insufficient && delta > 0 && pre_image_balance < delta {
            return Err(CreditLedgerError::InsufficientCredits {
                user_id,
                balance: pre_image_balance,
                required: delta,
            });
        }

        let raw_balance = pre_image_balance - delta;
        let new_balance = if !reject_insufficient && raw_balance < 0 {
            warn!(
                "⚠️ [LEDGER]: user {} settlement would drive balance to {}, clamped to 0",
                user_id, raw_balance
            );
            0
        } else {
            raw_balance
        };

        transaction
            .execute(queries::UPDATE_USER_BALANCE, params![user_id_text.clone(), new_balance])
            .await
            .map_err(|e| CreditLedgerError::Storage(e.to_string()))?;

        let applied_delta = pre_image_balance - new_balance;
        transaction
            .execute(
                queries::INSERT_JOURNAL_ENTRY,
                params![
                    Uuid::new_v4().to_string(),
                    user_id_text.clone(),
                    -applied_delta,
                    new_balance,
                    Self::journal_kind_tag(kind).to_string(),
                    description.to_string(),
                    related_task_id.map(|id| id.to_string()),
                    Utc::now().to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| CreditLedgerError::Storage(e.to_string()))?;

        transaction
            .commit()
            .await
            .map_err(|e| CreditLedgerError::JournalAppendFailed { user_id, reason: e.to_string() })?;

        info!("💳 [LEDGER]: user {} delta {} -> balance {}", user_id, -applied_delta, new_balance);
        Ok((new_balance, applied_delta))
    }
}

#[async_trait]
impl CreditLedger for CreditJournalRepository {
    async fn deduct(
        &self,
        user_id: Uuid,
        amount: i64,
        kind: CreditJournalEntryKind,
        description: &str,
        related_task_id: Option<Uuid>,
    ) -> Result<DeductOutcome, CreditLedgerError> {
        let (new_balance, _) = self
            .apply_delta(user_id, amount, kind, description, related_task_id, true)
            .await?;
        Ok(DeductOutcome { new_balance })
    }

    async fn settle(
        &self,
        user_id: Uuid,
        frozen: i64,
        actual_spent: i64,
        related_task_id: Uuid,
    ) -> Result<SettleOutcome, CreditLedgerError> {
        let refund_delta = compute_settlement_delta(frozen, actual_spent);
        if refund_delta == 0 {
            let new_balance = self.balance(user_id).await?;
            return Ok(SettleOutcome { refunded: 0, new_balance });
        }

        // Un `refund_delta` positivo acredita (delta negativo en apply_delta);
        // uno negativo absorbe el sobregiro como débito adicional. El delta
        // realmente aplicado puede diferir del solicitado si `apply_delta`
        // tuvo que recortar a 0 para no llevar el balance a negativo.
        let (new_balance, applied_delta) = self
            .apply_delta(
                user_id,
                -refund_delta,
                CreditJournalEntryKind::Refund,
                "preauthorization settlement",
                Some(related_task_id),
                false,
            )
            .await?;
        let actual_refunded = -applied_delta;

        if refund_delta < 0 {
            warn!("⚠️ [LEDGER]: settlement overspend absorbed for user {} (delta {})", user_id, refund_delta);
        }

        Ok(SettleOutcome { refunded: actual_refunded, new_balance })
    }

    async fn balance(&self, user_id: Uuid) -> Result<i64, CreditLedgerError> {
        let connection = self
            .database_client
            .get_connection()
            .map_err(|e| CreditLedgerError::Storage(e.to_string()))?;
        let mut rows = connection
            .query(queries::GET_USER, params![user_id.to_string()])
            .await
            .map_err(|e| CreditLedgerError::Storage(e.to_string()))?;

        match rows.next().await.map_err(|e| CreditLedgerError::Storage(e.to_string()))? {
            Some(row) => row.get::<i64>(1).map_err(|e| CreditLedgerError::Storage(e.to_string())),
            None => Err(CreditLedgerError::UserNotFound(user_id)),
        }
    }
}
