use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::features::spots::handlers;
use crate::features::spots::services::SpotService;

/// Create routes for the spots feature
///
/// Page fetching is internal to extraction; no route returns fetched page
/// content to the caller.
pub fn routes(service: Arc<SpotService>) -> Router {
    Router::new()
        .route(
            "/api/spots",
            get(handlers::list_spots).post(handlers::save_spot),
        )
        .route("/api/spots/extract", post(handlers::extract_spot))
        .route("/api/spots/{id}", delete(handlers::delete_spot))
        .with_state(service)
}
