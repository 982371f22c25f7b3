// libs/catalog-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_database::state::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn catalog_routes(state: Arc<AppState>) -> Router {
    let protected_routes = Router::new()
        .route("/", post(handlers::create_service).get(handlers::list_services))
        .route(
            "/{service_id}",
            get(handlers::get_service).delete(handlers::delete_service),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
