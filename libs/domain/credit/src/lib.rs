// [libs/domain/credit/src/lib.rs]
/*!
 * =================================================================
 * APARATO: CREDIT GOVERNANCE ENGINE (V1.0 - PRODUCTION MASTER)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: GOBERNANZA FINANCIERA DE CRÉDITOS DE USUARIO
 *
 * VISION HIPER-HOLÍSTICA:
 * Sucesor directo del motor de facturación de cuotas de cómputo, ahora
 * generalizado de "energía de minería" a "crédito de búsqueda". El
 * contrato central es `CreditLedger`: debitar, preautorizar, liquidar,
 * consultar — siempre con journal de auditoría append-only.
 * =================================================================
 */

pub mod errors;
pub mod ledger;

pub use errors::CreditLedgerError;
pub use ledger::{
    compute_settlement_delta, CreditLedger, DeductOutcome, PreauthorizeOutcome, SettleOutcome,
};
