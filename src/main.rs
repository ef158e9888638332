use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod app_state;
mod config;
mod db;
mod error;
mod meetings;
mod middleware;
mod modules;
mod scheduling;

use app_state::AppState;
use meetings::{HttpMeetingProvider, MeetingProvider, NullMeetingProvider};
use scheduling::{BookingCoordinator, BookingStore, CancellationHandler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenv().ok();

    let env = config::init().context("Failed to load configuration")?;
    let pool = db::init_pool()
        .await
        .context("Failed to initialize database pool")?;

    let store: Arc<dyn BookingStore> = Arc::new(db::PgBookingStore::new(pool.clone()));
    let provider: Arc<dyn MeetingProvider> = match &env.meetings {
        Some(meetings) => Arc::new(HttpMeetingProvider::new(meetings)),
        None => {
            warn!("MEETING_PROVIDER_URL is not set; bookings will be created without join links");
            Arc::new(NullMeetingProvider)
        }
    };

    let scheduler = Arc::new(BookingCoordinator::new(
        Arc::clone(&store),
        Arc::clone(&provider),
    ));
    let cancellations = Arc::new(CancellationHandler::new(Arc::clone(&store)));

    let state = AppState::new(pool, env.clone(), store, scheduler, cancellations);
    let app = app::create_router(state);

    let addr = env.server_addr();
    info!("{} Listening on {}", env.app.name, addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .await
        .context("Failed to serve application")?;

    Ok(())
}
