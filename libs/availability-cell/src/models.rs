// libs/availability-cell/src/models.rs
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishSlotRequest {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Deserialize)]
pub struct SlotQueryParams {
    pub date: Option<NaiveDate>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum SlotError {
    #[error("Slot not found")]
    NotFound,

    #[error("Service not found")]
    ServiceNotFound,

    #[error("Invalid time range: {0}")]
    InvalidRange(String),

    #[error("Slot overlaps an existing window for this provider")]
    Overlap,

    #[error("Slot is held or booked and cannot be retracted")]
    Conflict,

    #[error("Not authorized to manage this slot")]
    Forbidden,
}
