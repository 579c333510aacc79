//! park-keeper - parking timer and location history daemon
//!
//! This is the main entry point for the park-keeper application.

use std::sync::Arc;
use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use park_keeper::{
    api::create_router,
    clock::SystemClock,
    config::Config,
    state::AppState,
    store::{FileStore, MemoryStore, PersistentStore},
    tasks::{countdown_task, expiry_notifier_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("park_keeper={},tower_http=info", config.log_level()))
        .init();

    info!("Starting park-keeper v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn PersistentStore> = if config.in_memory {
        info!("Using in-memory storage, nothing will be persisted");
        Arc::new(MemoryStore::new())
    } else {
        let dir = config.resolved_data_dir();
        let store = FileStore::open(&dir)
            .await
            .with_context(|| format!("Failed to open data directory {}", dir.display()))?;
        info!("Using data directory {}", store.dir().display());
        Arc::new(store)
    };

    info!("Configuration: host={}, port={}, tick={}ms",
          config.host, config.port, config.tick_ms);

    // Create application state and restore any persisted timer
    let state = Arc::new(AppState::new(
        store,
        Arc::new(SystemClock),
        config.tick_interval(),
        config.port,
        config.host.clone(),
    ));
    if let Some(timer) = state.init().await {
        info!("Resuming parking timer '{}'", timer.title);
    }

    // Start background tasks
    let notifier_state = Arc::clone(&state);
    tokio::spawn(async move {
        expiry_notifier_task(notifier_state).await;
    });
    let countdown_state = Arc::clone(&state);
    tokio::spawn(async move {
        countdown_task(countdown_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET    /timer                       - Timer state");
    info!("  GET    /timer/presets               - Quick-start durations");
    info!("  POST   /timer/start                 - Start timer {{\"minutes\": n}}");
    info!("  POST   /timer/pause|resume|stop     - Control the timer");
    info!("  GET    /locations                   - Parking history");
    info!("  POST   /locations                   - Save parking location");
    info!("  GET    /locations/latest[/distance] - Car location and distance");
    info!("  DELETE /locations[/:id]             - Clear history or delete entry");
    info!("  GET    /settings, PATCH /settings   - App settings");
    info!("  POST   /reset                       - Clear all data");
    info!("  GET    /health                      - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
