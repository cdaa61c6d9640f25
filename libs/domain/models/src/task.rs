// [libs/domain/models/src/task.rs]
/*!
 * =================================================================
 * APARATO: SEARCH TASK CONTRACT (V1.0 - PRODUCTION MASTER)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: FORMA CANÓNICA DEL CICLO DE VIDA DE UNA TAREA
 *
 * VISION HIPER-HOLÍSTICA:
 * `SearchTaskStatus` distingue los estados internos de fase (que nunca
 * se persisten tal cual) de los estados terminales persistidos; la
 * función `to_persisted_status` en `tracer-domain-progress` es la única
 * autoridad para ese mapeo (C8 §4.8).
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::progress::LogEntry;
use crate::query::SearchQueryParams;

/// Estado persistido de una Search Task (spec §3: Search Task).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SearchTaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Stopped,
    InsufficientCredits,
}

impl SearchTaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SearchTaskStatus::Completed
                | SearchTaskStatus::Failed
                | SearchTaskStatus::Stopped
                | SearchTaskStatus::InsufficientCredits
        )
    }
}

/// Entidad de tarea de búsqueda, dueña de sus resultados y de su bitácora.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchTask {
    pub id: String,
    pub token: String,
    pub submitter_id: String,
    pub query_fingerprint: String,
    pub query_params: SearchQueryParams,
    pub requested_count: u32,
    pub actual_kept_count: u32,
    pub credits_spent: i64,
    pub status: SearchTaskStatus,
    pub progress_percent: u8,
    pub logs: Vec<LogEntry>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl SearchTask {
    /// Escribe el estado terminal exactamente una vez (spec invariant 3:
    /// write-once terminal status). Llamadas subsiguientes son no-ops.
    pub fn try_finalize(&mut self, status: SearchTaskStatus, completed_at: DateTime<Utc>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = status;
        self.completed_at = Some(completed_at);
        self.progress_percent = 100;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SearchMode;

    fn sample_task() -> SearchTask {
        SearchTask {
            id: "t1".into(),
            token: "tok1".into(),
            submitter_id: "u1".into(),
            query_fingerprint: "f1".into(),
            query_params: SearchQueryParams {
                name: "Jane".into(),
                title: None,
                state: None,
                city: None,
                requested_count: 10,
                age_min: None,
                age_max: None,
                mode: SearchMode::Fuzzy,
            },
            requested_count: 10,
            actual_kept_count: 0,
            credits_spent: 0,
            status: SearchTaskStatus::Running,
            progress_percent: 10,
            logs: vec![],
            error_message: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    #[test]
    fn terminal_status_is_write_once() {
        let mut task = sample_task();
        assert!(task.try_finalize(SearchTaskStatus::Completed, Utc::now()));
        assert_eq!(task.status, SearchTaskStatus::Completed);

        let changed = task.try_finalize(SearchTaskStatus::Failed, Utc::now());
        assert!(!changed);
        assert_eq!(task.status, SearchTaskStatus::Completed);
    }
}
