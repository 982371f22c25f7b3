// libs/catalog-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::state::AppState;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::user_uuid;

use crate::models::{CatalogError, CreateServiceRequest};
use crate::services::catalog::CatalogService;

fn map_catalog_error(e: CatalogError) -> AppError {
    match e {
        CatalogError::NotFound => AppError::NotFound("Service not found".to_string()),
        CatalogError::Forbidden => {
            AppError::Forbidden("Not authorized to manage this service".to_string())
        }
        CatalogError::Validation(msg) => AppError::ValidationError(msg),
    }
}

/// Publish a new service offering (provider only).
#[axum::debug_handler]
pub async fn create_service(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateServiceRequest>,
) -> Result<Json<Value>, AppError> {
    if !user.is_doctor() {
        return Err(AppError::Forbidden(
            "Only doctors can publish services".to_string(),
        ));
    }
    let provider_id = user_uuid(&user)?;

    let catalog = CatalogService::new(Arc::clone(&state.store));
    let offering = catalog
        .create(provider_id, request)
        .map_err(map_catalog_error)?;

    Ok(Json(json!({
        "success": true,
        "service": offering
    })))
}

/// Browse the full service catalog. Any authenticated user.
#[axum::debug_handler]
pub async fn list_services(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let catalog = CatalogService::new(Arc::clone(&state.store));
    let services = catalog.list();

    Ok(Json(json!({
        "success": true,
        "services": services
    })))
}

#[axum::debug_handler]
pub async fn get_service(
    State(state): State<Arc<AppState>>,
    Path(service_id): Path<Uuid>,
    Extension(_user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let catalog = CatalogService::new(Arc::clone(&state.store));
    let offering = catalog.get(service_id).map_err(map_catalog_error)?;

    Ok(Json(json!({
        "success": true,
        "service": offering
    })))
}

/// Remove a service offering (owning provider or admin).
#[axum::debug_handler]
pub async fn delete_service(
    State(state): State<Arc<AppState>>,
    Path(service_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let caller_id = user_uuid(&user)?;

    let catalog = CatalogService::new(Arc::clone(&state.store));
    catalog
        .delete(service_id, &user, caller_id)
        .map_err(map_catalog_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Service removed"
    })))
}
