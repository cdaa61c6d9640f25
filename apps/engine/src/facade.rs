// [apps/engine/src/facade.rs]
/*!
 * =================================================================
 * APARATO: SEARCH ENGINE FACADE (ESTRATO L4 - APPLICATION)
 * RESPONSABILIDAD: LAS SEIS OPERACIONES EXTERNAS DE spec §6, SIN FRAMING
 * DE TRANSPORTE
 *
 * VISION HIPER-HOLÍSTICA:
 * `preview`/`submit`/`taskStatus`/`taskResults`/`exportCsv`/`cancel` viven
 * aquí como métodos async planos sobre un único objeto compuesto — nunca
 * como rutas HTTP o métodos RPC (SPEC_FULL.md §6 es explícito: el
 * protocolo de transporte es deliberadamente un Non-goal). `submit`
 * dispara la corrida del driver en una tarea de Tokio independiente y
 * devuelve el `taskToken` de inmediato; el resto de las operaciones
 * consultan el estado que esa tarea va dejando en la base.
 * =================================================================
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::warn;
use uuid::Uuid;

use tracer_domain_credit::CreditLedger;
use tracer_domain_models::{SearchQueryParams, SearchTask};
use tracer_domain_pipeline::{EngineError, FeeSchedule, PipelineDriver, SubmitParams};
use tracer_domain_progress::extract_stats;
use tracer_infra_persistence::{CacheRepository, ResultRepository, TaskRepository, UserRepository};

use crate::csv_export::render_results_csv;
use crate::dto::{
    ExportCsvResponse, PreviewRequest, PreviewResponse, SubmitRequest, SubmitResponse,
    TaskResultsRequest, TaskResultsResponse, TaskStatusResponse,
};
use crate::errors::FacadeError;

/// Composición de todo lo que las seis operaciones necesitan. El driver
/// vive detrás de un `Arc` porque `submit` lo clona dentro de una tarea
/// de Tokio separada de la que devuelve la respuesta al llamador.
pub struct SearchEngineFacade {
    user_repo: Arc<dyn UserRepository>,
    task_repo: Arc<dyn TaskRepository>,
    result_repo: Arc<dyn ResultRepository>,
    cache_repo: Arc<dyn CacheRepository>,
    ledger: Arc<dyn CreditLedger>,
    driver: Arc<PipelineDriver>,
    fees: FeeSchedule,
    /// Banderas de cancelación por tarea en curso, indexadas por el id
    /// interno. Sólo contiene entradas para tareas aún no terminales —
    /// `submit` la crea, `cancel` la levanta, nadie más la consulta.
    cancel_flags: Arc<DashMap<String, Arc<AtomicBool>>>,
}

impl SearchEngineFacade {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        task_repo: Arc<dyn TaskRepository>,
        result_repo: Arc<dyn ResultRepository>,
        cache_repo: Arc<dyn CacheRepository>,
        ledger: Arc<dyn CreditLedger>,
        driver: Arc<PipelineDriver>,
        fees: FeeSchedule,
    ) -> Self {
        Self {
            user_repo,
            task_repo,
            result_repo,
            cache_repo,
            ledger,
            driver,
            fees,
            cancel_flags: Arc::new(DashMap::new()),
        }
    }

    /// Garantiza que el usuario exista con el balance dado si todavía no
    /// tiene fila — usado por el arnés de CLI para sembrar un usuario de
    /// demostración antes de llamar a `submit`. No es una de las seis
    /// operaciones externas de spec §6.
    pub async fn ensure_user(&self, user_id: Uuid, initial_balance: i64) -> Result<(), FacadeError> {
        self.user_repo.ensure_exists(&user_id.to_string(), initial_balance).await?;
        Ok(())
    }

    /// spec §6 `preview`: nunca llama a un proveedor pagado. `totalAvailable`
    /// viene de la caché si el fingerprint de la consulta ya tiene un
    /// envelope vigente; si no, se reporta `requestedCount` como estimado
    /// conservador y `cacheHit=false`.
    pub async fn preview(&self, request: PreviewRequest) -> Result<PreviewResponse, FacadeError> {
        let user = self
            .user_repo
            .get(&request.user_id.to_string())
            .await?
            .ok_or(FacadeError::UserNotFound)?;

        let query = SearchQueryParams {
            name: request.name.clone(),
            title: request.title.clone(),
            state: request.state.clone(),
            city: request.city.clone(),
            requested_count: request.requested_count,
            age_min: request.age_min,
            age_max: request.age_max,
            mode: request.mode,
        };
        query.validate().map_err(EngineError::Validation)?;

        let search_credits = self.fees.base_fee;
        let per_record_credits = self.fees.per_record_fee;
        let estimated_credits = search_credits + request.requested_count as i64 * per_record_credits;

        let (total_available, cache_hit) = self.lookup_cached_total(&query).await;

        let can_afford = user.credit_balance >= estimated_credits;
        let max_affordable = if per_record_credits > 0 {
            ((user.credit_balance - search_credits).max(0) / per_record_credits) as u32
        } else {
            request.requested_count
        };

        let message = if can_afford {
            "sufficient balance for the full requested cohort".to_string()
        } else {
            format!(
                "balance covers at most {} of the {} requested records",
                max_affordable, request.requested_count
            )
        };

        Ok(PreviewResponse {
            total_available,
            estimated_credits,
            search_credits,
            per_record_credits,
            can_afford,
            user_credits: user.credit_balance,
            max_affordable,
            cache_hit,
            message,
        })
    }

    async fn lookup_cached_total(&self, query: &SearchQueryParams) -> (u32, bool) {
        let cache_key = format!("apify:{}", query.fingerprint());
        match self.cache_repo.get(&cache_key).await {
            Ok(Some(envelope)) if !envelope.is_expired(chrono::Utc::now()) => {
                match serde_json::from_str::<tracer_domain_models::SearchCacheData>(&envelope.payload_json) {
                    Ok(cached) => (cached.total_available, true),
                    Err(_) => (query.requested_count, false),
                }
            }
            _ => (query.requested_count, false),
        }
    }

    /// spec §6 `submit`: un rechazo rápido y síncrono por saldo insuficiente
    /// en la base fee evita crear una fila de tarea que nunca arrancaría; a
    /// partir de ahí la corrida entera vive en una tarea de fondo y esta
    /// llamada sólo devuelve el token.
    pub async fn submit(&self, request: SubmitRequest) -> Result<SubmitResponse, FacadeError> {
        let preview = &request.preview;
        let user = self
            .user_repo
            .get(&preview.user_id.to_string())
            .await?
            .ok_or(FacadeError::UserNotFound)?;

        if user.credit_balance < self.fees.base_fee {
            return Err(FacadeError::Engine(EngineError::InsufficientCredits {
                balance: user.credit_balance,
                required: self.fees.base_fee,
            }));
        }

        let query = SearchQueryParams {
            name: preview.name.clone(),
            title: preview.title.clone(),
            state: preview.state.clone(),
            city: preview.city.clone(),
            requested_count: preview.requested_count,
            age_min: preview.age_min,
            age_max: preview.age_max,
            mode: preview.mode,
        };
        query.validate().map_err(EngineError::Validation)?;

        let task_id = Uuid::new_v4();
        let task_token = Uuid::new_v4().to_string();
        let cancel_signal = Arc::new(AtomicBool::new(false));
        self.cancel_flags.insert(task_id.to_string(), cancel_signal.clone());

        let params = SubmitParams {
            user_id: preview.user_id,
            query,
            enable_verification: request.enable_verification,
            task_id,
            task_token: task_token.clone(),
        };

        let driver = self.driver.clone();
        let cancel_flags = self.cancel_flags.clone();
        let tracked_id = task_id.to_string();
        tokio::spawn(async move {
            if let Err(error) = driver.run_task(params, cancel_signal).await {
                warn!("task {} ended in error: {}", tracked_id, error);
            }
            cancel_flags.remove(&tracked_id);
        });

        Ok(SubmitResponse { task_token })
    }

    /// spec §6 `taskStatus`.
    pub async fn task_status(&self, task_token: &str, requester_id: Uuid) -> Result<TaskStatusResponse, FacadeError> {
        let task = self.resolve_owned_task(task_token, requester_id).await?;
        let stats = extract_stats(&task.logs).unwrap_or_default();
        Ok(TaskStatusResponse {
            status: task.status,
            progress: task.progress_percent,
            stats,
            logs: task.logs,
            created_at: task.created_at,
            completed_at: task.completed_at,
            error_message: task.error_message,
        })
    }

    /// spec §6 `taskResults`, paginado en memoria sobre la fila completa de
    /// resultados persistidos (sin límite superior de página en el
    /// repositorio — la paginación es un recorte de presentación, spec §6).
    pub async fn task_results(&self, request: TaskResultsRequest) -> Result<TaskResultsResponse, FacadeError> {
        let task = self.resolve_owned_task(&request.task_token, request.requester_id).await?;
        let all = self.result_repo.list_for_task(&task.id).await?;

        let page_size = request.page_size.max(1);
        let page = request.page.max(1);
        let total = all.len() as u32;
        let total_pages = total.div_ceil(page_size).max(1);

        let start = ((page - 1) * page_size) as usize;
        let rows = all.into_iter().skip(start).take(page_size as usize).collect();

        Ok(TaskResultsResponse { rows, total, page, total_pages })
    }

    /// spec §6 `exportCsv`: sólo disponible una vez que la tarea alcanzó un
    /// estado terminal (`NotReady` en caso contrario, spec §7).
    pub async fn export_csv(&self, task_token: &str, requester_id: Uuid) -> Result<ExportCsvResponse, FacadeError> {
        let task = self.resolve_owned_task(task_token, requester_id).await?;
        if !task.status.is_terminal() {
            return Err(FacadeError::NotReady);
        }

        let results = self.result_repo.list_for_task(&task.id).await?;
        let filename = format!("search-{}.csv", task.token);
        let csv_bytes = render_results_csv(&task, &results);

        Ok(ExportCsvResponse { csv_bytes, filename })
    }

    /// spec §6 `cancel`: marca la fila como `stopped` y, si la tarea sigue
    /// corriendo en su tarea de fondo, levanta la bandera que el driver y
    /// el ejecutor (C5) observan entre cohortes.
    pub async fn cancel(&self, task_token: &str, requester_id: Uuid) -> Result<(), FacadeError> {
        let task = self.resolve_owned_task(task_token, requester_id).await?;
        self.task_repo.cancel(&task.id).await?;
        if let Some(flag) = self.cancel_flags.get(&task.id) {
            flag.store(true, Ordering::Relaxed);
        }
        Ok(())
    }

    async fn resolve_owned_task(&self, task_token: &str, requester_id: Uuid) -> Result<SearchTask, FacadeError> {
        let task = self.task_repo.get_by_token(task_token).await?.ok_or(FacadeError::NotFound)?;
        if task.submitter_id != requester_id.to_string() {
            return Err(FacadeError::Forbidden);
        }
        Ok(task)
    }

    /// Saldo actual, expuesto para el arnés de CLI (no es una de las seis
    /// operaciones de spec §6, pero `ledger.balance` ya es parte pública
    /// de C1 y conviene no duplicar la lectura directa del repositorio).
    pub async fn balance(&self, user_id: Uuid) -> Result<i64, FacadeError> {
        Ok(self.ledger.balance(user_id).await.map_err(|error| FacadeError::Engine(error.into()))?)
    }
}
