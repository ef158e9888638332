use std::sync::Arc;

use sqlx::PgPool;

use crate::config;
use crate::scheduling::{BookingCoordinator, BookingStore, CancellationHandler};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub env: config::Config,
    pub store: Arc<dyn BookingStore>,
    pub scheduler: Arc<BookingCoordinator>,
    pub cancellations: Arc<CancellationHandler>,
}

impl AppState {
    pub fn new(
        db: PgPool,
        env: config::Config,
        store: Arc<dyn BookingStore>,
        scheduler: Arc<BookingCoordinator>,
        cancellations: Arc<CancellationHandler>,
    ) -> Self {
        Self {
            db,
            env,
            store,
            scheduler,
            cancellations,
        }
    }
}
