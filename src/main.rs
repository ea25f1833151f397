//! Scooter Fleet Service
//!
//! REST API for tracking and reserving scooters.
//! Reads configuration from TOML file (~/.config/scooter-service/config.toml).

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use scooter_fleet::config::{AppConfig, LoggingSection};
use scooter_fleet::domain::RepositoryProvider;
use scooter_fleet::infrastructure::crypto::password::hash_password;
use scooter_fleet::infrastructure::database::{seed_database, FleetSeed};
use scooter_fleet::interfaces::http::modules::metrics::install_recorder;
use scooter_fleet::shared::shutdown::ShutdownCoordinator;
use scooter_fleet::{
    create_api_router, default_config_path, init_database, prepare_schema,
    SeaOrmRepositoryProvider,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = std::env::var("SCOOTER_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());
    let app_cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            init_tracing(&cfg.logging);
            if config_path.exists() {
                info!("Configuration loaded from {}", config_path.display());
            } else {
                info!(
                    "No configuration at {}, using defaults",
                    config_path.display()
                );
            }
            cfg
        }
        Err(e) => {
            init_tracing(&LoggingSection::default());
            error!("Failed to load config: {}. Using defaults.", e);
            AppConfig::default()
        }
    };

    info!("Starting Scooter Fleet Service...");

    // ── Prometheus metrics recorder (before any metrics calls) ──
    let prometheus_handle = match install_recorder() {
        Ok(handle) => {
            info!("📊 Prometheus metrics recorder installed");
            Some(handle)
        }
        Err(e) => {
            warn!("Metrics disabled, recorder install failed: {}", e);
            None
        }
    };

    let db_config = app_cfg.database_config();
    info!("Database: {}", db_config.url);

    let jwt_config = app_cfg.jwt_config();
    info!(
        "JWT configured with {}h token expiration",
        jwt_config.expiration_hours
    );

    // ── Database ───────────────────────────────────────────────
    let db = match init_database(&db_config).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    info!(
        reset = db_config.reset_on_start,
        "Running database migrations..."
    );
    if let Err(e) = prepare_schema(&db, db_config.reset_on_start).await {
        error!("Failed to run migrations: {}", e);
        return Err(e.into());
    }
    info!("Migrations completed");

    if app_cfg.seed.enabled {
        let hash = hash_password(&app_cfg.seed.password, app_cfg.security.bcrypt_cost)?;
        if let Err(e) = seed_database(&db, &FleetSeed::demo(&hash)).await {
            error!("Failed to seed database: {}", e);
            return Err(e.into());
        }
    }

    let repos: Arc<dyn RepositoryProvider> = Arc::new(SeaOrmRepositoryProvider::new(db.clone()));

    // Shutdown coordinator listens for SIGTERM / SIGINT
    let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
    let shutdown_signal = shutdown.signal();
    shutdown.start_signal_listener();

    let api_router = create_api_router(repos, jwt_config, prometheus_handle);

    let api_addr = app_cfg.server.address();
    let listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("REST API server listening on http://{}", api_addr);
    info!("Swagger UI available at http://{}/docs/", api_addr);

    let result = axum::serve(listener, api_router)
        .with_graceful_shutdown(async move {
            shutdown_signal.wait().await;
            info!("🛑 REST API server received shutdown signal");
        })
        .await;

    if let Err(e) = &result {
        error!("REST API server error: {}", e);
    }

    info!("🧹 Performing final cleanup...");
    shutdown
        .cleanup_with_timeout(async {
            if let Err(e) = db.close().await {
                warn!("Error closing database connection: {}", e);
            } else {
                info!("✅ Database connection closed");
            }
        })
        .await;

    info!("👋 Scooter Fleet Service shutdown complete");
    result.map_err(Into::into)
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingSection) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
