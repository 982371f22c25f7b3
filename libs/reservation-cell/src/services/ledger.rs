// libs/reservation-cell/src/services/ledger.rs
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use shared_database::error::StoreError;
use shared_database::memory::MemoryStore;
use shared_database::records::{Reservation, ReservationStatus, Slot};

use crate::models::ReservationError;

/// Reservation Ledger: the persistent record of confirmed bookings, one
/// active reservation per slot. Status moves active -> canceled or
/// active -> completed; both end states are terminal and a canceled
/// reservation is never re-activated.
pub struct ReservationLedger {
    store: Arc<MemoryStore>,
}

impl ReservationLedger {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// Invariant-checked insert of a new active reservation. A `Conflict`
    /// here means two callers both won the slot, which the CAS discipline
    /// in the booking service makes impossible.
    pub fn record_active(
        &self,
        slot: &Slot,
        requester_id: Uuid,
        service_id: Uuid,
    ) -> Result<Reservation, ReservationError> {
        let reservation = Reservation::new(slot, requester_id, service_id);
        self.store
            .insert_active_reservation(reservation)
            .map_err(|e| match e {
                StoreError::ActiveReservationExists => ReservationError::Conflict(format!(
                    "slot {} already has an active reservation",
                    slot.id
                )),
                other => ReservationError::Conflict(other.to_string()),
            })
    }

    pub fn cancel(&self, reservation_id: Uuid) -> Result<Reservation, ReservationError> {
        debug!("Ledger cancel for reservation {}", reservation_id);
        self.transition(reservation_id, ReservationStatus::Canceled, None)
    }

    pub fn complete(
        &self,
        reservation_id: Uuid,
        notes: Option<String>,
    ) -> Result<Reservation, ReservationError> {
        debug!("Ledger complete for reservation {}", reservation_id);
        self.transition(reservation_id, ReservationStatus::Completed, notes)
    }

    pub fn get(&self, reservation_id: Uuid) -> Result<Reservation, ReservationError> {
        self.store
            .get_reservation(reservation_id)
            .map_err(|_| ReservationError::NotFound)
    }

    pub fn find_active_by_slot(&self, slot_id: Uuid) -> Option<Reservation> {
        self.store.find_active_by_slot(slot_id)
    }

    fn transition(
        &self,
        reservation_id: Uuid,
        next: ReservationStatus,
        notes: Option<String>,
    ) -> Result<Reservation, ReservationError> {
        self.store
            .transition_reservation(reservation_id, next, notes)
            .map_err(|e| match e {
                StoreError::NotFound => ReservationError::NotFound,
                StoreError::ReservationNotActive => {
                    // Refetch for the actual terminal status in the error.
                    let status = self
                        .store
                        .get_reservation(reservation_id)
                        .map(|r| r.status)
                        .unwrap_or(ReservationStatus::Canceled);
                    ReservationError::InvalidState(status)
                }
                other => ReservationError::Conflict(other.to_string()),
            })
    }
}
