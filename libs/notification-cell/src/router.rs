// libs/notification-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use shared_database::state::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn notification_routes(state: Arc<AppState>) -> Router {
    let protected_routes = Router::new()
        .route("/", get(handlers::my_notifications))
        .route("/{notification_id}/read", put(handlers::mark_notification_read))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
