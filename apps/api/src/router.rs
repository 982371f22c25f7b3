use std::sync::Arc;

use axum::{routing::get, Router};

use availability_cell::router::availability_routes;
use catalog_cell::router::catalog_routes;
use notification_cell::router::notification_routes;
use reservation_cell::router::reservation_routes;
use shared_database::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "CareConnect API is running!" }))
        .nest("/availability", availability_routes(state.clone()))
        .nest("/reservations", reservation_routes(state.clone()))
        .nest("/notifications", notification_routes(state.clone()))
        .nest("/services", catalog_routes(state.clone()))
}
