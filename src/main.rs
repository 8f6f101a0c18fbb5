use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use mailtrace::api;
use mailtrace::beacon;
use mailtrace::config::{Config, DatabaseBackend};
use mailtrace::enrich::GeoIpService;
use mailtrace::storage::{EventStore, PostgresStore, SqliteStore};
use mailtrace::tracking::TrackingEngine;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");

    // Initialize the event store
    let store: Arc<dyn EventStore> = match config.database.backend {
        DatabaseBackend::Sqlite => {
            info!("Using SQLite event store: {}", config.database.url);
            Arc::new(SqliteStore::new(&config.database.url, 5).await?)
        }
        DatabaseBackend::Postgres => {
            info!("Using PostgreSQL event store: {}", config.database.url);
            Arc::new(PostgresStore::new(&config.database.url).await?)
        }
    };

    info!("Initializing event store...");
    store.init().await?;
    info!("Event store initialized successfully");

    // GeoIP enrichment is optional; without a database opens are stored
    // without location.
    let geoip = GeoIpService::new(config.tracking.geoip_city_db.as_deref())?;
    match config.tracking.geoip_city_db.as_ref() {
        Some(path) => info!("GeoIP enrichment enabled (city database: {})", path),
        None => info!("GeoIP enrichment disabled - no GEOIP_CITY_DB configured"),
    }

    let engine = Arc::new(TrackingEngine::new(store, geoip));

    // Create routers
    let api_router = api::create_api_router(Arc::clone(&engine));
    let beacon_router = beacon::create_beacon_router(Arc::clone(&engine), config.tracking.clone());

    // Start API server
    let api_addr = format!("{}:{}", config.api_server.host, config.api_server.port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("API server listening on http://{}", api_addr);

    // Start beacon server
    let beacon_addr = format!(
        "{}:{}",
        config.beacon_server.host, config.beacon_server.port
    );
    let beacon_listener = tokio::net::TcpListener::bind(&beacon_addr).await?;
    info!("Beacon server listening on http://{}", beacon_addr);

    // Run both servers concurrently
    tokio::try_join!(
        axum::serve(api_listener, api_router),
        axum::serve(
            beacon_listener,
            beacon_router.into_make_service_with_connect_info::<SocketAddr>(),
        ),
    )?;

    Ok(())
}
