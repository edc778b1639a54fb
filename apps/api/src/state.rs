use std::sync::Arc;

use crate::config::Config;
use crate::history::store::EventLogStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Event log backend. `PgEventLogStore` in production.
    pub store: Arc<dyn EventLogStore>,
    pub config: Config,
}
