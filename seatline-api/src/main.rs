use seatline_api::{app, state::AppState, worker};
use seatline_store::app_config::Config;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seatline_api=debug,seatline_order=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!("Starting Seatline API on port {}", config.server.port);

    let store = config.storage.open()?;
    tracing::info!("Using {:?} storage", config.storage.backend);

    let catalog = config.catalog()?;
    tracing::info!("Serving {} routes on {} buses", catalog.list_destinations().len(), catalog.list_buses().len());

    let app_state = AppState::new(store, catalog, config.booking.clone(), config.layout)?;
    tokio::spawn(worker::log_booking_events(app_state.events_tx.subscribe()));

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
