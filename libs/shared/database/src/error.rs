use thiserror::Error;

/// Errors surfaced by the storage layer. Conditional writes report their
/// precondition failures here; the cells map these onto their own error
/// taxonomies at the service boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("slot overlaps an existing window for this provider")]
    Overlap,

    #[error("slot is not free")]
    SlotNotFree,

    #[error("an active reservation already references this slot")]
    ActiveReservationExists,

    #[error("reservation is not active")]
    ReservationNotActive,
}
