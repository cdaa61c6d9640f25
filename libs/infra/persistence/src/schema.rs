// [libs/infra/persistence/src/schema.rs]
/*!
 * =================================================================
 * APARATO: SOVEREIGN DATABASE SCHEMA (ESTRATO L3)
 * RESPONSABILIDAD: GOBERNANZA ESTRUCTURAL E IDEMPOTENCIA TOTAL
 * =================================================================
 */

use anyhow::{Context, Result};
use libsql::Connection;
use tracing::{debug, info, instrument};

const TACTICAL_TABLES: &[(&str, &str)] = &[
    ("TABLE_USERS", r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            credit_balance INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'active'
        );
    "#),
    ("TABLE_CREDIT_JOURNAL", r#"
        CREATE TABLE IF NOT EXISTS credit_journal (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            delta INTEGER NOT NULL,
            balance_after INTEGER NOT NULL,
            kind TEXT NOT NULL,
            description TEXT NOT NULL,
            related_task_id TEXT,
            created_at TEXT NOT NULL
        );
    "#),
    ("TABLE_SEARCH_TASKS", r#"
        CREATE TABLE IF NOT EXISTS search_tasks (
            id TEXT PRIMARY KEY,
            token TEXT NOT NULL,
            submitter_id TEXT NOT NULL,
            query_fingerprint TEXT NOT NULL,
            query_params_json TEXT NOT NULL,
            requested_count INTEGER NOT NULL,
            actual_kept_count INTEGER NOT NULL DEFAULT 0,
            credits_spent INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'pending',
            progress_percent INTEGER NOT NULL DEFAULT 0,
            logs_json TEXT NOT NULL DEFAULT '[]',
            error_message TEXT,
            created_at TEXT NOT NULL,
            completed_at TEXT
        );
    "#),
    ("TABLE_SEARCH_RESULTS", r#"
        CREATE TABLE IF NOT EXISTS search_results (
            id TEXT PRIMARY KEY,
            task_id TEXT NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            title TEXT,
            company TEXT,
            city TEXT,
            state TEXT,
            country TEXT,
            email TEXT,
            phone TEXT,
            phone_type TEXT,
            phone_status TEXT NOT NULL,
            linkedin_url TEXT,
            age INTEGER,
            carrier TEXT,
            verified INTEGER NOT NULL DEFAULT 0,
            verification_score INTEGER NOT NULL DEFAULT 0,
            verification_source TEXT NOT NULL,
            data_source TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
    "#),
    ("TABLE_CACHE_ENVELOPES", r#"
        CREATE TABLE IF NOT EXISTS cache_envelopes (
            key TEXT PRIMARY KEY,
            kind TEXT NOT NULL,
            payload_json TEXT NOT NULL,
            hit_count INTEGER NOT NULL DEFAULT 0,
            expires_at TEXT NOT NULL
        );
    "#),
    ("TABLE_API_LOG_ENTRIES", r#"
        CREATE TABLE IF NOT EXISTS api_log_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            provider TEXT NOT NULL,
            latency_ms INTEGER NOT NULL,
            status_code INTEGER,
            success INTEGER NOT NULL,
            credits_charged REAL,
            related_task_id TEXT,
            created_at TEXT NOT NULL
        );
    "#),
];

const ACCELERATION_INDEXES: &[(&str, &str)] = &[
    ("IDX_CREDIT_JOURNAL_USER", "CREATE INDEX IF NOT EXISTS idx_credit_journal_user ON credit_journal(user_id);"),
    ("IDX_SEARCH_TASKS_SUBMITTER", "CREATE INDEX IF NOT EXISTS idx_search_tasks_submitter ON search_tasks(submitter_id);"),
    ("IDX_SEARCH_RESULTS_TASK", "CREATE INDEX IF NOT EXISTS idx_search_results_task ON search_results(task_id);"),
    ("IDX_CACHE_EXPIRES", "CREATE INDEX IF NOT EXISTS idx_cache_expires ON cache_envelopes(expires_at);"),
    ("IDX_API_LOG_TASK", "CREATE INDEX IF NOT EXISTS idx_api_log_task ON api_log_entries(related_task_id);"),
];

#[instrument(skip(database_connection))]
pub async fn apply_full_sovereign_schema(database_connection: &Connection) -> Result<()> {
    info!("🏗️ [SCHEMA_ENGINE]: Initiating structural synchronization...");

    for (identifier, sql) in TACTICAL_TABLES {
        debug!("  ↳ Solidifying: {}", identifier);
        database_connection
            .execute(*sql, ())
            .await
            .with_context(|| format!("CRITICAL_SOLIDIFICATION_FAULT: {}", identifier))?;
    }

    for (identifier, sql) in ACCELERATION_INDEXES {
        debug!("  ↳ Hardening: {}", identifier);
        database_connection
            .execute(*sql, ())
            .await
            .with_context(|| format!("CRITICAL_HARDENING_FAULT: {}", identifier))?;
    }

    info!("✅ [SCHEMA_ENGINE]: Tactical ledger level and certified.");
    Ok(())
}
