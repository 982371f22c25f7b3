// libs/reservation-cell/src/models.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_database::records::ReservationStatus;

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveRequest {
    pub slot_id: Uuid,
    pub service_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteRequest {
    pub notes: Option<String>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum ReservationError {
    #[error("Reservation not found")]
    NotFound,

    #[error("Slot not found")]
    SlotNotFound,

    /// Expected under contention: another requester won the slot first.
    /// Callers re-query the free list and pick again; no automatic retry.
    #[error("Slot is no longer available")]
    SlotUnavailable,

    #[error("Not authorized to modify this reservation")]
    Forbidden,

    #[error("Reservation cannot be modified in current status: {0}")]
    InvalidState(ReservationStatus),

    /// Storage-level invariant clash. Unreachable while the CAS discipline
    /// holds; seeing one means mutual exclusion is broken.
    #[error("Reservation invariant violated: {0}")]
    Conflict(String),
}
