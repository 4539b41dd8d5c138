//! Tally API Server
//!
//! Main entry point for the Tally backend service.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tally_api::events::{AuditLogSubscriber, EventDispatcher};
use tally_api::{AppState, create_router};
use tally_core::events::EventBus;
use tally_db::connect;
use tally_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tally=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    let db = connect(&config.database).await?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    let jwt_service = JwtService::new(JwtConfig::from(&config.jwt));

    // Outbound event queue, drained after each committed request
    let (events, receiver) = EventBus::channel();
    let mut dispatcher = EventDispatcher::new();
    if config.events.audit_log {
        dispatcher = dispatcher.with_subscriber(Arc::new(AuditLogSubscriber));
    }
    info!(subscribers = dispatcher.len(), "Event dispatcher started");
    let _dispatcher = dispatcher.spawn(receiver);

    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        events,
    };

    let app = create_router(state).layer(TimeoutLayer::new(Duration::from_secs(
        config.server.request_timeout_secs,
    )));

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
