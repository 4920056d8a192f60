use std::sync::Arc;
use std::time::Duration;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

use hrm_leave::collab::audit::{AuditLog, MemoryAuditLog, MySqlAuditLog};
use hrm_leave::collab::notification_sink::{MySqlNotificationSink, NotificationSink, RecordingSink};
use hrm_leave::collab::roster::{EmployeeRoster, MemoryRoster, MySqlRoster};
use hrm_leave::config::{Config, StorageBackend};
use hrm_leave::db::init_db;
use hrm_leave::docs::ApiDoc;
use hrm_leave::leave::LeaveEngine;
use hrm_leave::routes;
use hrm_leave::store::{LeaveStore, MemoryLeaveStore, MySqlLeaveStore};

#[get("/")]
async fn index() -> impl Responder {
    "HRM leave service"
}

struct Backends {
    store: Arc<dyn LeaveStore>,
    roster: Arc<dyn EmployeeRoster>,
    sink: Arc<dyn NotificationSink>,
    audit: Arc<dyn AuditLog>,
}

async fn build_backends(config: &Config) -> anyhow::Result<Backends> {
    match config.storage_backend {
        StorageBackend::Mysql => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;
            let pool = init_db(url).await?;
            let ttl = Duration::from_secs(config.roster_cache_ttl_secs);

            Ok(Backends {
                store: Arc::new(MySqlLeaveStore::new(pool.clone())),
                roster: Arc::new(MySqlRoster::new(pool.clone(), ttl)),
                sink: Arc::new(MySqlNotificationSink::new(pool.clone())),
                audit: Arc::new(MySqlAuditLog::new(pool)),
            })
        }
        StorageBackend::Memory => {
            tracing::warn!(
                seeded = config.seed_employee_ids.len(),
                "Using in-memory storage; nothing survives a restart"
            );
            Ok(Backends {
                store: Arc::new(MemoryLeaveStore::new()),
                roster: Arc::new(MemoryRoster::new(config.seed_employee_ids.iter().copied())),
                sink: Arc::new(RecordingSink::new()),
                audit: Arc::new(MemoryAuditLog::new()),
            })
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(backend = %config.storage_backend, "Server starting...");

    let backends = build_backends(&config).await?;
    let engine = LeaveEngine::new(backends.store, backends.roster, backends.sink);
    let engine = Data::new(engine);
    let audit: Data<dyn AuditLog> = Data::from(backends.audit);

    let server_addr = config.server_addr.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(engine.clone())
            .app_data(audit.clone())
            .app_data(Data::new(config.clone()))
            .service(index)
            .configure(|cfg| routes::configure(cfg, config.clone()))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
