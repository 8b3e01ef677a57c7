use actix_web::{web, App, HttpServer};
use clap::Parser;
use dotenv::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::sync::Arc;

use crate::config::app_config::AppConfig;
use crate::config::cli::Cli;
use crate::logger::init_logger;
use crate::services::activity_service::ActivityService;
use crate::services::ai_service::build_generator;
use crate::services::automation_service::{AutomationController, DriverDeps};
use crate::services::campaign_service::CampaignService;
use crate::services::draft_service::DraftService;
use crate::services::email_service::{CollateralFiles, SmtpMailer};
use crate::services::outreach_service::DriverSettings;
use crate::services::outreach_store::SqliteOutreachStore;
use crate::services::scenario_service::ScenarioService;
use crate::services::stats_service::StatsService;
use crate::services::template_service::TemplateService;

mod app;
mod config;
mod errors;
mod handlers;
mod logger;
mod models;
mod services;
#[cfg(test)]
mod tests;

async fn setup_database(database_url: &str) -> anyhow::Result<Pool<Sqlite>> {
    // La carpeta del fichero tiene que existir antes de conectar
    if let Some(path) = database_url.strip_prefix("sqlite:") {
        let path = std::path::Path::new(path.trim_start_matches("//"));
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
    }

    log::info!("Conectando a SQLite en {}", database_url);
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let db_pool = SqlitePoolOptions::new().connect_with(options).await?;

    sqlx::migrate!("./migrations").run(&db_pool).await?;
    Ok(db_pool)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    // Un --port inválido termina acá con el error de clap
    let cli = Cli::parse();
    init_logger();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Configuración inválida: {:#}", e);
            std::process::exit(1);
        }
    };
    if config.smtp.is_complete() {
        log::info!(
            "SMTP {}:{} (IMAP {})",
            config.smtp.smtp_server.as_deref().unwrap_or_default(),
            config.smtp.smtp_port,
            config.smtp.imap_server
        );
    } else {
        log::warn!("Faltan credenciales SMTP; las campañas se marcarán como failed");
    }

    let db_pool = match setup_database(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("No se pudo preparar la base de datos: {:#}", e);
            std::process::exit(1);
        }
    };

    let template_service = TemplateService::new(db_pool.clone());
    let campaign_service = CampaignService::new(db_pool.clone());
    let activity_service = ActivityService::new(db_pool.clone());
    let stats_service = StatsService::new(db_pool.clone());

    let generator = match build_generator(&config.ai) {
        Ok(generator) => generator,
        Err(e) => {
            log::error!("No se pudo crear el cliente de IA: {}", e);
            std::process::exit(1);
        }
    };

    let store = SqliteOutreachStore::new(
        campaign_service.clone(),
        template_service.clone(),
        activity_service.clone(),
        stats_service.clone(),
    );
    let deps = DriverDeps {
        store: Arc::new(store),
        generator: generator.clone(),
        mailer: Arc::new(SmtpMailer::new(config.smtp.clone())),
        collateral: CollateralFiles::new(
            config.capabilities_pdf_path.clone(),
            config.logo_path.clone(),
        ),
        settings: DriverSettings::from_config(&config),
    };
    // Un solo controlador compartido por todos los workers
    let controller = web::Data::new(AutomationController::new(
        deps,
        config.rate_limit.poll_interval,
    ));

    let draft_service = DraftService::new(
        generator.clone(),
        campaign_service.clone(),
        template_service.clone(),
        config.sender.clone(),
    );
    let scenario_service = web::Data::new(ScenarioService::new(db_pool.clone(), generator));

    let shutdown_controller = controller.clone();

    let port = cli.port_or(config.port);
    log::info!("Levantando servidor en 0.0.0.0:{}", port);
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(template_service.clone()))
            .app_data(web::Data::new(campaign_service.clone()))
            .app_data(web::Data::new(activity_service.clone()))
            .app_data(web::Data::new(stats_service.clone()))
            .app_data(web::Data::new(draft_service.clone()))
            .app_data(scenario_service.clone())
            .app_data(controller.clone())
            .configure(app::init_app)
    })
    .bind(("0.0.0.0", port))?
    .run();

    let result = server.await;

    // Parar el driver antes de salir para que el estado quede en stopped
    if shutdown_controller.is_running().await {
        if let Err(e) = shutdown_controller.stop().await {
            log::error!("Error deteniendo la automatización: {:#}", e);
        }
    }
    result
}
