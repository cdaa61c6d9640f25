// [apps/engine/src/main.rs]
/*!
 * =================================================================
 * APARATO: ENGINE SHELL (ESTRATO L4 - APPLICATION ENTRY POINT)
 * RESPONSABILIDAD: ORQUESTACIÓN DE ARGUMENTOS Y DISPARO DEL MOTOR
 *
 * Arnés de CLI de extremo a extremo: siembra (o reutiliza) un usuario,
 * envía una búsqueda, sondea el estado hasta un resultado terminal y
 * exporta el CSV resultante a disco. No hay framing HTTP/RPC — las
 * mismas seis operaciones de `SearchEngineFacade` que usaría cualquier
 * llamador en proceso.
 * =================================================================
 */

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;
use tracing::info;
use uuid::Uuid;

use tracer_domain_models::SearchMode;
use tracer_engine_lib::dto::{PreviewRequest, SubmitRequest};
use tracer_engine_lib::{build_facade, EngineConfig};

/// Argumentos de una corrida de búsqueda de principio a fin.
#[derive(Parser, Debug)]
#[command(
    author = "Raz Podesta <metaShark Tech>",
    version = "1.0",
    about = "Arnés de CLI del motor de búsqueda de contactos: submit -> poll -> export."
)]
struct CommandArguments {
    /// Identificador del usuario solicitante. Se genera uno nuevo si se omite.
    #[arg(long)]
    user_id: Option<Uuid>,

    /// Balance inicial de crédito a sembrar si el usuario es nuevo.
    #[arg(long, default_value_t = 1000)]
    seed_balance: i64,

    /// Nombre completo a buscar.
    #[arg(short, long)]
    name: String,

    /// Cargo esperado.
    #[arg(long)]
    title: Option<String>,

    /// Estado (US) esperado.
    #[arg(long)]
    state: Option<String>,

    /// Ciudad esperada.
    #[arg(long)]
    city: Option<String>,

    /// Cantidad de registros solicitados.
    #[arg(short = 'c', long, default_value_t = 25)]
    requested_count: u32,

    /// Edad mínima aceptable.
    #[arg(long)]
    age_min: Option<u32>,

    /// Edad máxima aceptable.
    #[arg(long)]
    age_max: Option<u32>,

    /// Invoca el adaptador de búsqueda exacta en lugar del masivo con caché.
    #[arg(long, default_value_t = false)]
    exact: bool,

    /// Habilita la etapa de verificación reversa de teléfonos (C4).
    #[arg(long, default_value_t = true)]
    verify: bool,

    /// Directorio de destino del CSV exportado al completar la tarea.
    #[arg(short, long, default_value = "dist")]
    output_directory: PathBuf,
}

fn main() -> Result<()> {
    dotenv().ok();

    let config = EngineConfig::from_env();
    tracer_shared_telemetry::init_tracing(&config.service_name);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_stack_size(4 * 1024 * 1024)
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    let cli_configuration = CommandArguments::parse();
    let config = EngineConfig::from_env();

    info!("🧭 [ENGINE]: Building composition root...");
    let facade = build_facade(&config).await?;

    let user_id = cli_configuration.user_id.unwrap_or_else(Uuid::new_v4);
    facade.ensure_user(user_id, cli_configuration.seed_balance).await?;

    let mode = if cli_configuration.exact { SearchMode::Exact } else { SearchMode::Fuzzy };
    let preview = PreviewRequest {
        user_id,
        name: cli_configuration.name.clone(),
        title: cli_configuration.title.clone(),
        state: cli_configuration.state.clone(),
        city: cli_configuration.city.clone(),
        requested_count: cli_configuration.requested_count,
        age_min: cli_configuration.age_min,
        age_max: cli_configuration.age_max,
        mode,
    };

    let preview_response = facade.preview(preview.clone()).await?;
    info!(
        "🔎 [PREVIEW]: estimatedCredits={} canAfford={} cacheHit={}",
        preview_response.estimated_credits, preview_response.can_afford, preview_response.cache_hit
    );

    let submit_response = facade
        .submit(SubmitRequest { preview, enable_verification: cli_configuration.verify })
        .await?;
    info!("🚀 [SUBMIT]: taskToken={}", submit_response.task_token);

    loop {
        let status = facade.task_status(&submit_response.task_token, user_id).await?;
        info!("📈 [STATUS]: {:?} progress={}%", status.status, status.progress);
        if status.status.is_terminal() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    let export = facade.export_csv(&submit_response.task_token, user_id).await?;
    std::fs::create_dir_all(&cli_configuration.output_directory)?;
    let destination = cli_configuration.output_directory.join(&export.filename);
    std::fs::write(&destination, &export.csv_bytes)?;
    info!("📦 [EXPORT]: wrote {} bytes to {}", export.csv_bytes.len(), destination.display());

    Ok(())
}
