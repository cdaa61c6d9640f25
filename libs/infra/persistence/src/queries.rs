// [libs/infra/persistence/src/queries.rs]
/*!
 * APARATO: SQL STATEMENT REGISTRY (ESTRATO L3)
 * RESPONSABILIDAD: TEXTO SQL CENTRALIZADO POR FAMILIA DE TABLA
 */

// --- USUARIOS ---

pub const GET_USER: &str = "SELECT id, credit_balance, status FROM users WHERE id = ?1";

pub const INSERT_USER_IF_ABSENT: &str = r#"
    INSERT INTO users (id, credit_balance, status)
    VALUES (?1, ?2, 'active')
    ON CONFLICT(id) DO NOTHING
"#;

pub const UPDATE_USER_BALANCE: &str = "UPDATE users SET credit_balance = ?2 WHERE id = ?1";

// --- DIARIO DE CRÉDITOS ---

pub const INSERT_JOURNAL_ENTRY: &str = r#"
    INSERT INTO credit_journal (
        id, user_id, delta, balance_after, kind, description, related_task_id, created_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
"#;

// --- TAREAS DE BÚSQUEDA ---

pub const INSERT_SEARCH_TASK: &str = r#"
    INSERT INTO search_tasks (
        id, token, submitter_id, query_fingerprint, query_params_json,
        requested_count, actual_kept_count, credits_spent, status,
        progress_percent, logs_json, error_message, created_at, completed_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
"#;

pub const GET_SEARCH_TASK: &str = r#"
    SELECT id, token, submitter_id, query_fingerprint, query_params_json,
           requested_count, actual_kept_count, credits_spent, status,
           progress_percent, logs_json, error_message, created_at, completed_at
    FROM search_tasks WHERE id = ?1
"#;

pub const GET_SEARCH_TASK_BY_TOKEN: &str = r#"
    SELECT id, token, submitter_id, query_fingerprint, query_params_json,
           requested_count, actual_kept_count, credits_spent, status,
           progress_percent, logs_json, error_message, created_at, completed_at
    FROM search_tasks WHERE token = ?1
"#;

pub const LIST_SEARCH_TASKS_FOR_SUBMITTER: &str = r#"
    SELECT id, token, submitter_id, query_fingerprint, query_params_json,
           requested_count, actual_kept_count, credits_spent, status,
           progress_percent, logs_json, error_message, created_at, completed_at
    FROM search_tasks WHERE submitter_id = ?1 ORDER BY created_at DESC
"#;

pub const UPDATE_SEARCH_TASK_PROGRESS: &str = r#"
    UPDATE search_tasks
    SET status = ?2, progress_percent = ?3, actual_kept_count = ?4,
        credits_spent = ?5, logs_json = ?6, error_message = ?7, completed_at = ?8
    WHERE id = ?1
"#;

pub const APPEND_SEARCH_TASK_LOG: &str = "UPDATE search_tasks SET logs_json = ?2 WHERE id = ?1";

pub const CANCEL_SEARCH_TASK: &str = r#"
    UPDATE search_tasks
    SET status = 'stopped', completed_at = ?2
    WHERE id = ?1 AND status IN ('pending', 'running')
"#;

// --- RESULTADOS DE BÚSQUEDA ---

pub const INSERT_SEARCH_RESULT: &str = r#"
    INSERT INTO search_results (
        id, task_id, first_name, last_name, title, company, city, state, country,
        email, phone, phone_type, phone_status, linkedin_url, age, carrier,
        verified, verification_score, verification_source, data_source, created_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)
"#;

pub const LIST_SEARCH_RESULTS_FOR_TASK: &str = r#"
    SELECT id, task_id, first_name, last_name, title, company, city, state, country,
           email, phone, phone_type, phone_status, linkedin_url, age, carrier,
           verified, verification_score, verification_source, data_source, created_at
    FROM search_results WHERE task_id = ?1 ORDER BY created_at ASC
"#;

// --- CACHÉ ---

pub const GET_CACHE_ENVELOPE: &str = r#"
    SELECT key, kind, payload_json, hit_count, expires_at FROM cache_envelopes WHERE key = ?1
"#;

pub const UPSERT_CACHE_ENVELOPE: &str = r#"
    INSERT INTO cache_envelopes (key, kind, payload_json, hit_count, expires_at)
    VALUES (?1, ?2, ?3, ?4, ?5)
    ON CONFLICT(key) DO UPDATE SET
        kind = excluded.kind,
        payload_json = excluded.payload_json,
        hit_count = excluded.hit_count,
        expires_at = excluded.expires_at
"#;

pub const INCREMENT_CACHE_HIT: &str = "UPDATE cache_envelopes SET hit_count = hit_count + 1 WHERE key = ?1";

// --- BITÁCORA DE LLAMADAS A PROVEEDORES ---

pub const INSERT_API_LOG_ENTRY: &str = r#"
    INSERT INTO api_log_entries (
        provider, latency_ms, status_code, success, credits_charged, related_task_id, created_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#;
