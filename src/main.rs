use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vakt::{create_router, AppState, Config};
use vakt_core::{ConsentProvider, StorageArea};
use vakt_db::{init_database, RedbRecordStore};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!("Optional: VAKT_LISTEN_ADDR (default: 0.0.0.0:3000)");
            eprintln!("Optional: VAKT_DB_PATH (default: ./vakt.redb)");
            eprintln!("Optional: VAKT_CONSENT (default: pending)");
            std::process::exit(1);
        }
    };

    tracing::info!("Starting Vakt server");
    tracing::info!("Listen address: {}", config.listen_addr);
    tracing::info!("Database path: {}", config.db_path.display());
    tracing::info!("Startup consent: {}", config.consent);

    // Initialize database
    let db = match init_database(&config.db_path) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Database error: {}", e);
            std::process::exit(1);
        }
    };

    let provisional = Arc::new(RedbRecordStore::new(db.clone(), StorageArea::Provisional));
    let authorized = Arc::new(RedbRecordStore::new(db, StorageArea::Authorized));
    let consent = Arc::new(ConsentProvider::new(config.consent));

    // Starting the writer reconciles data left over from the previous run
    let state = match AppState::new(consent, provisional, authorized) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("Writer error: {}", e);
            std::process::exit(1);
        }
    };

    let app = create_router(state);

    // Start server
    let listener = match tokio::net::TcpListener::bind(&config.listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", config.listen_addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server running at http://{}", config.listen_addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}
