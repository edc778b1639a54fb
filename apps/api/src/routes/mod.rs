pub mod health;

use axum::{routing::get, Router};

use crate::history::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Kanban history
        .route("/api/v1/boards", get(handlers::handle_list_boards))
        .route(
            "/api/v1/boards/:board_id/history",
            get(handlers::handle_board_history),
        )
        .with_state(state)
}
