// libs/availability-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::state::AppState;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::user_uuid;

use crate::models::{PublishSlotRequest, SlotError, SlotQueryParams};
use crate::services::slots::SlotService;

fn map_slot_error(e: SlotError) -> AppError {
    match e {
        SlotError::NotFound => AppError::NotFound("Slot not found".to_string()),
        SlotError::ServiceNotFound => AppError::NotFound("Service not found".to_string()),
        SlotError::InvalidRange(msg) => AppError::BadRequest(msg),
        SlotError::Overlap => {
            AppError::Conflict("Slot overlaps an existing availability window".to_string())
        }
        SlotError::Conflict => {
            AppError::Conflict("Cannot retract a held or booked slot".to_string())
        }
        SlotError::Forbidden => {
            AppError::Forbidden("Not authorized to manage this slot".to_string())
        }
    }
}

/// Publish a new availability window (provider only).
#[axum::debug_handler]
pub async fn publish_slot(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<PublishSlotRequest>,
) -> Result<Json<Value>, AppError> {
    if !user.is_doctor() {
        return Err(AppError::Forbidden(
            "Only doctors can publish availability".to_string(),
        ));
    }
    let provider_id = user_uuid(&user)?;

    let service = SlotService::new(Arc::clone(&state.store));
    let slot = service.publish(provider_id, request).map_err(map_slot_error)?;

    Ok(Json(json!({
        "success": true,
        "slot": slot
    })))
}

/// The calling provider's own slots, any status, optionally filtered by date.
#[axum::debug_handler]
pub async fn my_slots(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Query(params): Query<SlotQueryParams>,
) -> Result<Json<Value>, AppError> {
    if !user.is_doctor() {
        return Err(AppError::Forbidden(
            "Only doctors have an availability schedule".to_string(),
        ));
    }
    let provider_id = user_uuid(&user)?;

    let service = SlotService::new(Arc::clone(&state.store));
    let slots = service.list_for_provider(provider_id, params.date);

    Ok(Json(json!({
        "success": true,
        "slots": slots
    })))
}

/// Retract an unbooked slot (owning provider only).
#[axum::debug_handler]
pub async fn retract_slot(
    State(state): State<Arc<AppState>>,
    Path(slot_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    if !user.is_doctor() {
        return Err(AppError::Forbidden(
            "Only doctors can retract availability".to_string(),
        ));
    }
    let provider_id = user_uuid(&user)?;

    let service = SlotService::new(Arc::clone(&state.store));
    service.retract(slot_id, provider_id).map_err(map_slot_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Slot retracted"
    })))
}

/// Free slots bookable for a service (patient only): the publishing
/// provider's free windows, today onward unless a date is given.
#[axum::debug_handler]
pub async fn service_slots(
    State(state): State<Arc<AppState>>,
    Path(service_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Query(params): Query<SlotQueryParams>,
) -> Result<Json<Value>, AppError> {
    if !user.is_patient() {
        return Err(AppError::Forbidden(
            "Only patients can browse bookable slots".to_string(),
        ));
    }

    let service = SlotService::new(Arc::clone(&state.store));
    let slots = service
        .list_free_for_service(service_id, params.date, Utc::now().date_naive())
        .map_err(map_slot_error)?;

    Ok(Json(json!({
        "success": true,
        "slots": slots
    })))
}
