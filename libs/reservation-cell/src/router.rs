// libs/reservation-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_database::state::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn reservation_routes(state: Arc<AppState>) -> Router {
    let protected_routes = Router::new()
        .route("/", post(handlers::reserve_slot).get(handlers::all_reservations))
        .route("/mine", get(handlers::my_reservations))
        .route("/provider", get(handlers::provider_reservations))
        .route("/{reservation_id}/cancel", post(handlers::cancel_reservation))
        .route("/{reservation_id}/complete", post(handlers::complete_reservation))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
