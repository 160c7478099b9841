use stall::{
    config::AppConfig,
    event::EventBus,
    message::{repository::SqliteMessageRepository, service::MessageService},
    room::service::OccupancyService,
    routes,
    session::SessionService,
    shared::AppState,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stall=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting stall server");

    if let Err(e) = run().await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    info!(
        database_url = %config.database_url,
        session_window_secs = config.occupancy.session_window.as_secs(),
        poll_interval_ms = config.occupancy.poll_interval.as_millis() as u64,
        "Configuration loaded"
    );

    // Messages outlive the process, occupancy does not
    let message_repository = Arc::new(SqliteMessageRepository::connect(&config.database_url).await?);
    let event_bus = EventBus::new();
    let occupancy = OccupancyService::new(event_bus.clone(), config.occupancy.clone());
    let session_service = Arc::new(SessionService::new(
        occupancy,
        MessageService::new(message_repository.clone()),
        event_bus,
    ));

    let app = routes::router(AppState::new(Arc::clone(&session_service)));

    let listener = tokio::net::TcpListener::bind(config.listen_address()).await?;
    info!(address = %config.listen_address(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    session_service.shutdown();
    message_repository.close().await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
