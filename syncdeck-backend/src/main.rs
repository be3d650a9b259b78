use actix_cors::Cors;
use actix_files::{Files, NamedFile};
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;

mod config;
mod controllers;
mod external;
mod middleware;
mod models;
mod session;
mod store;
mod sync;

use config::Config;
use external::WorkspaceClient;
use middleware::rate_limit::RateLimiter;
use session::SessionState;
use store::{MemStore, SyncStore};
use sync::SyncRunner;

pub struct AppState {
    pub store: Arc<dyn SyncStore>,
    pub config: Config,
    pub session: Arc<SessionState>,
    pub limiter: Arc<RateLimiter>,
    pub runner: Arc<SyncRunner>,
    pub workspace: Arc<WorkspaceClient>,
}

/// SPA fallback handler - serves index.html for client-side routing
async fn spa_fallback() -> actix_web::Result<NamedFile> {
    if std::path::Path::new("./client/dist/index.html").exists() {
        Ok(NamedFile::open("./client/dist/index.html")?)
    } else {
        Ok(NamedFile::open("../client/dist/index.html")?)
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let port = config.port;

    let store: Arc<dyn SyncStore> = Arc::new(MemStore::new());
    if config.seed_demo_data {
        log::info!("Seeding demo data");
        if let Err(e) = store::seed_demo_data(store.as_ref()) {
            log::error!("Failed to seed demo data: {}", e);
        }
    }

    let runner = Arc::new(SyncRunner::new(Arc::clone(&store)));
    let limiter = Arc::new(RateLimiter::new());
    let session = Arc::new(SessionState::new());
    let workspace = Arc::new(WorkspaceClient::new(&config));
    if !workspace.is_configured() {
        log::warn!("Workspace OAuth not configured - connect routes will answer 503");
    }

    // Determine frontend dist path (check both locations)
    // Set DISABLE_FRONTEND=1 to disable static file serving (for separate dev server)
    let frontend_dist = if std::env::var("DISABLE_FRONTEND")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false)
    {
        log::info!("Frontend serving disabled via DISABLE_FRONTEND env var");
        ""
    } else if std::path::Path::new("./client/dist").exists() {
        "./client/dist"
    } else if std::path::Path::new("../client/dist").exists() {
        "../client/dist"
    } else {
        log::warn!("Frontend dist not found in ./client/dist or ../client/dist - static file serving disabled");
        ""
    };

    log::info!("Starting SyncDeck server on port {}", port);
    if !frontend_dist.is_empty() {
        log::info!("Serving frontend from: {}", frontend_dist);
    }

    let frontend_dist = frontend_dist.to_string();

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        let mut app = App::new()
            .app_data(web::Data::new(AppState {
                store: Arc::clone(&store),
                config: config.clone(),
                session: Arc::clone(&session),
                limiter: Arc::clone(&limiter),
                runner: Arc::clone(&runner),
                workspace: Arc::clone(&workspace),
            }))
            .wrap(Logger::default())
            .wrap(cors)
            .configure(controllers::health::config)
            .configure(controllers::auth::config)
            .configure(controllers::databases::config)
            .configure(controllers::operations::config)
            .configure(controllers::changes::config)
            .configure(controllers::settings::config)
            .configure(controllers::stats::config);

        // Serve static files only if frontend dist exists
        if !frontend_dist.is_empty() {
            app = app.service(
                Files::new("/", frontend_dist.clone())
                    .index_file("index.html")
                    .default_handler(actix_web::web::to(spa_fallback)),
            );
        }

        app
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
