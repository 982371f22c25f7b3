// libs/reservation-cell/src/handlers.rs
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

use crate::models::{CompleteRequest, ReservationError, ReserveRequest};
use crate::services::booking::ReservationService;

fn map_reservation_error(e: ReservationError) -> AppError {
    match e {
        ReservationError::NotFound => AppError::NotFound("Reservation not found".to_string()),
        ReservationError::SlotNotFound => AppError::NotFound("Slot not found".to_string()),
        ReservationError::SlotUnavailable => {
            AppError::SlotUnavailable("Slot is no longer available".to_string())
        }
        ReservationError::Forbidden => {
            AppError::Forbidden("Not authorized to modify this reservation".to_string())
        }
        ReservationError::InvalidState(status) => AppError::BadRequest(format!(
            "Reservation is {} and cannot be modified",
            status
        )),
        // A storage invariant clash is an internal fault, not a client error.
        ReservationError::Conflict(msg) => AppError::Internal(msg),
    }
}

/// Book a free slot (patient only). Exactly one of any set of racing
/// requests for the same slot succeeds; the rest receive the
/// `slot_unavailable` conflict body.
#[axum::debug_handler]
pub async fn reserve_slot(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<ReserveRequest>,
) -> Result<Json<Value>, AppError> {
    if !user.is_patient() {
        return Err(AppError::Forbidden(
            "Only patients can book appointments".to_string(),
        ));
    }
    let requester_id = user_uuid(&user)?;

    let service = ReservationService::new(Arc::clone(&state.store));
    let reservation = service
        .reserve(requester_id, request)
        .map_err(map_reservation_error)?;

    Ok(Json(json!({
        "success": true,
        "reservation": reservation
    })))
}

/// The calling patient's own reservations, all statuses.
#[axum::debug_handler]
pub async fn my_reservations(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let requester_id = user_uuid(&user)?;

    let service = ReservationService::new(Arc::clone(&state.store));
    let reservations = service.list_for_requester(requester_id);

    Ok(Json(json!({
        "success": true,
        "reservations": reservations
    })))
}

/// Reservations booked against the calling provider's slots.
#[axum::debug_handler]
pub async fn provider_reservations(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    if !user.is_doctor() {
        return Err(AppError::Forbidden(
            "Only doctors have a provider schedule".to_string(),
        ));
    }
    let provider_id = user_uuid(&user)?;

    let service = ReservationService::new(Arc::clone(&state.store));
    let reservations = service.list_for_provider(provider_id);

    Ok(Json(json!({
        "success": true,
        "reservations": reservations
    })))
}

/// Every reservation in the system (admin only).
#[axum::debug_handler]
pub async fn all_reservations(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    if !user.is_admin() {
        return Err(AppError::Forbidden(
            "Admin access required".to_string(),
        ));
    }

    let service = ReservationService::new(Arc::clone(&state.store));
    let reservations = service.list_all();

    Ok(Json(json!({
        "success": true,
        "reservations": reservations
    })))
}

/// Cancel an active reservation and free its slot. Allowed for the
/// booking patient or an admin.
#[axum::debug_handler]
pub async fn cancel_reservation(
    State(state): State<Arc<AppState>>,
    Path(reservation_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let caller_id = user_uuid(&user)?;

    let service = ReservationService::new(Arc::clone(&state.store));
    let reservation = service
        .cancel(reservation_id, &user, caller_id)
        .map_err(map_reservation_error)?;

    Ok(Json(json!({
        "success": true,
        "reservation": reservation
    })))
}

/// Mark an active reservation completed (owning provider only). The slot
/// stays booked; a delivered appointment is not re-offered.
#[axum::debug_handler]
pub async fn complete_reservation(
    State(state): State<Arc<AppState>>,
    Path(reservation_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<CompleteRequest>,
) -> Result<Json<Value>, AppError> {
    if !user.is_doctor() {
        return Err(AppError::Forbidden(
            "Only doctors can complete appointments".to_string(),
        ));
    }
    let provider_id = user_uuid(&user)?;

    let service = ReservationService::new(Arc::clone(&state.store));
    let reservation = service
        .complete(reservation_id, provider_id, request.notes)
        .map_err(map_reservation_error)?;

    Ok(Json(json!({
        "success": true,
        "reservation": reservation
    })))
}
