//! Smart Attendance - A mock student attendance session served over HTTP
//!
//! This is the main entry point for the smart-attendance application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use smart_attendance::{
    api::create_router,
    config::Config,
    services::StdRandom,
    state::AppState,
    tasks::spawn_session_tasks,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("smart_attendance={},tower_http=info", config.log_level()))
        .init();

    info!("Starting smart-attendance server v{}", env!("CARGO_PKG_VERSION"));
    match config.seed {
        Some(seed) => info!("Configuration: host={}, port={}, seed={}", config.host, config.port, seed),
        None => info!("Configuration: host={}, port={}, seed=random", config.host, config.port),
    }

    // Create application state
    let state = Arc::new(
        AppState::new(config.port, config.host.clone(), config.student())
            .with_random(Box::new(StdRandom::from_seed_option(config.seed))),
    );

    // Start the timer drivers and the screen observer
    let _tasks = spawn_session_tasks(Arc::clone(&state));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /credential/focus - Open the keypad and start typing");
    info!("  POST /credential/blur  - Close the keypad");
    info!("  POST /login            - Log in with the typed credential");
    info!("  POST /check-in         - Start the entry face scan");
    info!("  POST /check-out        - Start the exit face scan");
    info!("  POST /unlock           - Professor lifts the ban");
    info!("  POST /reset            - Log out");
    info!("  GET  /status           - Current session and last action");
    info!("  GET  /screen           - Rendered current screen");
    info!("  GET  /health           - Health check");

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
