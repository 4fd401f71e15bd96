use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use careerpath::config::Settings;
use careerpath::core::{FallbackScorer, RoleSkillMap};
use careerpath::error::handle_json_payload_error;
use careerpath::routes::{self, AppState};
use careerpath::services::{
    AccountService, EnvironmentResolver, InMemoryUserStore, PlatformCandidates, PostgresUserStore,
    ProcessProbe, ProcessRunner, Recommender, RunLimits, UserStore, INTERPRETER_OVERRIDE_VAR,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration; logging defaults come from it when it parses
    let settings = Settings::load();
    let logging = settings
        .as_ref()
        .map(|s| s.logging.clone())
        .unwrap_or_default();

    // Initialize logging
    let log_level = std::env::var("LOG_LEVEL").unwrap_or(logging.level);
    let log_format = std::env::var("LOG_FORMAT").unwrap_or(logging.format);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting CareerPath API...");

    let settings = settings.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    info!("Configuration loaded successfully");

    // User store: PostgreSQL when configured, in-memory otherwise
    let store: Arc<dyn UserStore> = match &settings.database.url {
        Some(url) => {
            let db_max_conn = settings.database.max_connections.unwrap_or(10);
            let postgres = PostgresUserStore::from_settings(
                url,
                Some(db_max_conn),
                settings.database.min_connections,
                settings.database.acquire_timeout_secs,
                settings.database.idle_timeout_secs,
            )
            .await
            .map_err(|e| {
                error!("Failed to connect to PostgreSQL: {}", e);
                std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
            })?;

            info!("PostgreSQL user store initialized (max: {} connections)", db_max_conn);
            Arc::new(postgres)
        }
        None => {
            warn!("No database configured, using in-memory user store");
            Arc::new(InMemoryUserStore::new())
        }
    };

    // Role table is built once and shared read-only
    let roles = Arc::new(RoleSkillMap::builtin());
    info!("Fallback role table loaded with {} roles", roles.len());

    let scorer = &settings.scorer;
    let interpreter_override = std::env::var_os(INTERPRETER_OVERRIDE_VAR).map(PathBuf::from);
    let resolver = EnvironmentResolver::new(
        Arc::new(ProcessProbe::new(scorer.probe_timeout())),
        PlatformCandidates::for_host(),
        scorer.app_root.clone(),
    )
    .with_override(interpreter_override);

    let recommender = Recommender::new(
        resolver,
        Arc::new(ProcessRunner),
        FallbackScorer::new(roles),
        RunLimits {
            timeout: scorer.timeout(),
            memory_limit_mb: scorer.memory_limit_mb,
        },
        scorer.max_results,
    );

    info!(
        "Recommender initialized (app root: {}, timeout: {:?}, memory: {} MB)",
        scorer.app_root.display(),
        scorer.timeout(),
        scorer.memory_limit_mb
    );

    // Build application state
    let app_state = AppState {
        recommender: Arc::new(recommender),
        accounts: AccountService::new(store),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
