use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use backend_lib::{
    config::Settings,
    ratelimit,
    router,
    storage::FlatFileDirectory,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Initialize configuration
    let settings = Settings::load().or_else(|_| {
        tracing::info!("falling back to config/default.toml");
        Settings::load_from("config/default.toml")
    })?;

    // Create the user directory
    let directory = FlatFileDirectory::new(&settings.data_dir)?;

    let bind_addr = settings.bind_addr;
    let sweep_interval = Duration::from_secs(settings.rate_limit.sweep_interval_secs);

    // Create application state
    let state = Arc::new(AppState::new(directory, settings));

    // Background sweep keeps rate-limiter memory bounded to active clients
    let sweeper = ratelimit::start_sweeper(state.rate_limiter.clone(), sweep_interval);

    let app = router::create_router(state)
        .into_make_service_with_connect_info::<SocketAddr>();

    // Start the server
    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("listening on {bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    // Stop the sweep before exiting so no background activity remains
    sweeper.stop().await;

    Ok(())
}
