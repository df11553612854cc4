//! D2Timers - A multi-timer countdown service
//! 
//! This is the main entry point for the d2timers application.

use std::sync::Arc;
use anyhow::Context;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use d2timers::{
    config::Config,
    state::{load_definitions, AppState},
    api::create_router,
    services::{check_player_available, AlertSink, CommandAlertSink, LogAlertSink},
    tasks::{command_loop_task, ticker_task},
    utils::signals::cancel_on_shutdown,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("d2timers={},tower_http=info", config.log_level()))
        .init();

    info!("Starting d2timers server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, timers={}",
          config.host, config.port, config.timers.display());

    // Timer definitions are the only thing we cannot run without
    let definitions = load_definitions(&config.timers)
        .with_context(|| format!("Failed to load timer definitions from {}", config.timers.display()))?;

    let alerts: Arc<dyn AlertSink> = match &config.player {
        Some(player) => match check_player_available(player).await {
            Ok(()) => Arc::new(CommandAlertSink::new(player.clone(), config.sounds_dir.clone())),
            Err(e) => {
                warn!("{}, alerts will only be logged", e);
                Arc::new(LogAlertSink)
            }
        },
        None => Arc::new(LogAlertSink),
    };

    // Create application state
    let (state, commands) = AppState::new(definitions, config.queue_settings(), alerts);
    let state = Arc::new(state);
    info!("Timers: {:?}", state.list_all());

    let cancel = CancellationToken::new();

    // Start the command loop and ticker background tasks
    let command_loop = tokio::spawn(command_loop_task(Arc::clone(&state), commands, cancel.clone()));
    let ticker = tokio::spawn(ticker_task(Arc::clone(&state), cancel.clone()));

    if config.turbo {
        state.toggle_turbo(true).await.context("Failed to enable turbo mode")?;
    }

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /timers                 - List timer snapshots");
    info!("  POST /timers/:name/start     - Start a timer ({{\"mode\": \"auto\"|\"manual\"}})");
    info!("  POST /timers/:name/pause     - Pause a timer");
    info!("  POST /timers/:name/resume    - Resume a timer");
    info!("  POST /timers/:name/reset     - Reset a timer");
    info!("  POST /timers/:name/tap       - Pause, resume or start a timer");
    info!("  POST /timers/:name/duration  - Set the custom timer duration");
    info!("  POST /turbo                  - Toggle turbo durations");
    info!("  POST /auto | /stop | /start | /reset - Bulk controls");
    info!("  GET  /events                 - Server-sent timer events");
    info!("  GET  /status                 - Current status");
    info!("  GET  /health                 - Health check");

    // Setup graceful shutdown
    tokio::spawn(cancel_on_shutdown(cancel.clone()));
    let shutdown = cancel.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    if let Err(e) = tokio::try_join!(command_loop, ticker) {
        warn!("Background task failed: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
