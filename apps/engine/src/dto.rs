// [apps/engine/src/dto.rs]
/*!
 * APARATO: FACADE DATA TRANSFER CONTRACTS (ESTRATO L4 - APPLICATION)
 * RESPONSABILIDAD: FORMA DE ENTRADA/SALIDA DE CADA OPERACIÓN EXTERNA (spec §6)
 *
 * Ninguno de estos tipos conoce HTTP/RPC — son los mismos campos que spec
 * §6 nombra, sin framing de transporte (SPEC_FULL.md §6).
 */

use chrono::{DateTime, Utc};
use uuid::Uuid;

use tracer_domain_models::{SearchMode, SearchResult, StatsSnapshot};

#[derive(Debug, Clone)]
pub struct PreviewRequest {
    pub user_id: Uuid,
    pub name: String,
    pub title: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub requested_count: u32,
    pub age_min: Option<u32>,
    pub age_max: Option<u32>,
    pub mode: SearchMode,
}

#[derive(Debug, Clone)]
pub struct PreviewResponse {
    pub total_available: u32,
    pub estimated_credits: i64,
    pub search_credits: i64,
    pub per_record_credits: i64,
    pub can_afford: bool,
    pub user_credits: i64,
    pub max_affordable: u32,
    pub cache_hit: bool,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub preview: PreviewRequest,
    pub enable_verification: bool,
}

#[derive(Debug, Clone)]
pub struct SubmitResponse {
    pub task_token: String,
}

#[derive(Debug, Clone)]
pub struct TaskStatusResponse {
    pub status: tracer_domain_models::SearchTaskStatus,
    pub progress: u8,
    pub stats: StatsSnapshot,
    pub logs: Vec<tracer_domain_models::LogEntry>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TaskResultsRequest {
    pub task_token: String,
    pub requester_id: Uuid,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone)]
pub struct TaskResultsResponse {
    pub rows: Vec<SearchResult>,
    pub total: u32,
    pub page: u32,
    pub total_pages: u32,
}

#[derive(Debug, Clone)]
pub struct ExportCsvResponse {
    pub csv_bytes: Vec<u8>,
    pub filename: String,
}
