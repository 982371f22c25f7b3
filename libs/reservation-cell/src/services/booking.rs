// libs/reservation-cell/src/services/booking.rs
//
// Reservation Service: the transactional core of the booking flow. This is
// the only component allowed to move a slot's status, and it owns the joint
// transition of (slot status, reservation existence). Mutual exclusion is
// per-slot via compare-and-swap on the slot status, never a global lock:
// racing reservations for unrelated slots do not serialize, and there is no
// lock object to leak across a crash.
use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use notification_cell::services::notify::NotificationService;
use shared_database::memory::MemoryStore;
use shared_database::records::{NotificationKind, Reservation, SlotStatus};
use shared_models::auth::User;

use crate::models::{ReservationError, ReserveRequest};
use crate::services::ledger::ReservationLedger;

pub struct ReservationService {
    store: Arc<MemoryStore>,
    ledger: ReservationLedger,
    notifier: NotificationService,
}

impl ReservationService {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        let ledger = ReservationLedger::new(Arc::clone(&store));
        let notifier = NotificationService::new(Arc::clone(&store));
        Self {
            store,
            ledger,
            notifier,
        }
    }

    /// Atomically convert a free slot into a booked slot plus a ledger
    /// entry. Under N racing calls for one slot exactly one caller returns
    /// a reservation; the rest get `SlotUnavailable` and must re-query the
    /// free list themselves.
    pub fn reserve(
        &self,
        requester_id: Uuid,
        request: ReserveRequest,
    ) -> Result<Reservation, ReservationError> {
        debug!(
            "Reserve attempt by {} for slot {}",
            requester_id, request.slot_id
        );

        // Step 1: Acquire the slot. The free->held CAS is the per-slot
        // mutual exclusion: one winner, everyone else observes not-free.
        let won = self
            .store
            .compare_and_set_slot_status(request.slot_id, SlotStatus::Free, SlotStatus::Held)
            .map_err(|_| ReservationError::SlotNotFound)?;
        if !won {
            info!("Slot {} already taken, rejecting reserve", request.slot_id);
            return Err(ReservationError::SlotUnavailable);
        }

        let slot = self
            .store
            .get_slot(request.slot_id)
            .map_err(|_| ReservationError::SlotNotFound)?;

        // Step 2: Record the reservation while holding the slot. A failure
        // here compensates the hold; slot and ledger change together or not
        // at all.
        let reservation = match self.ledger.record_active(&slot, requester_id, request.service_id) {
            Ok(reservation) => reservation,
            Err(e) => {
                error!(
                    "Ledger insert failed for held slot {}: {} - releasing hold",
                    slot.id, e
                );
                self.release_hold(slot.id);
                return Err(e);
            }
        };

        // Step 3: Commit held->booked. The hold is exclusively ours, so this
        // CAS cannot be contended; losing it means mutual exclusion is
        // broken somewhere.
        let committed = self
            .store
            .compare_and_set_slot_status(slot.id, SlotStatus::Held, SlotStatus::Booked)
            .unwrap_or(false);
        if !committed {
            error!(
                "Invariant breach: held slot {} changed status during booking commit",
                slot.id
            );
            return Err(ReservationError::Conflict(format!(
                "slot {} escaped its hold during commit",
                slot.id
            )));
        }

        // Step 4: Notification fan-out. Best-effort: nothing past this point
        // may undo the committed reservation.
        let when = reservation.scheduled_at.format("%Y-%m-%d %H:%M");
        self.notifier.notify(
            requester_id,
            reservation.id,
            NotificationKind::Booked,
            &format!("You booked an appointment on {}", when),
        );
        self.notifier.notify(
            slot.provider_id,
            reservation.id,
            NotificationKind::Booked,
            &format!("New appointment booked on {}", when),
        );

        info!(
            "Reservation {} created for slot {} by {}",
            reservation.id, slot.id, requester_id
        );
        Ok(reservation)
    }

    /// Cancel an active reservation and return its slot to the free pool.
    /// Permitted callers: the original requester, or an admin override.
    /// Both produce the same state transition.
    pub fn cancel(
        &self,
        reservation_id: Uuid,
        caller: &User,
        caller_id: Uuid,
    ) -> Result<Reservation, ReservationError> {
        let reservation = self.ledger.get(reservation_id)?;

        if reservation.requester_id != caller_id && !caller.is_admin() {
            return Err(ReservationError::Forbidden);
        }

        let slot = self
            .store
            .get_slot(reservation.slot_id)
            .map_err(|_| ReservationError::SlotNotFound)?;

        // Ledger first: once the reservation leaves the active state no
        // competing cancel can pass the transition check, so the slot CAS
        // below runs at most once per reservation.
        let canceled = self.ledger.cancel(reservation_id)?;

        let freed = self
            .store
            .compare_and_set_slot_status(slot.id, SlotStatus::Booked, SlotStatus::Free)
            .unwrap_or(false);
        if !freed {
            // The reservation was active, therefore its slot must have been
            // booked. Anything else is a broken bijection.
            error!(
                "Invariant breach: slot {} was not booked while reservation {} was active",
                slot.id, reservation_id
            );
            return Err(ReservationError::Conflict(format!(
                "slot {} state diverged from its reservation",
                slot.id
            )));
        }

        let when = canceled.scheduled_at.format("%Y-%m-%d %H:%M");
        self.notifier.notify(
            canceled.requester_id,
            canceled.id,
            NotificationKind::Canceled,
            &format!("Your appointment on {} was canceled", when),
        );
        self.notifier.notify(
            slot.provider_id,
            canceled.id,
            NotificationKind::Canceled,
            &format!("The appointment on {} was canceled", when),
        );

        info!("Reservation {} canceled, slot {} freed", reservation_id, slot.id);
        Ok(canceled)
    }

    /// Mark an active reservation completed. Provider-only; the slot stays
    /// booked permanently, a completed window is consumed, not re-offered.
    pub fn complete(
        &self,
        reservation_id: Uuid,
        provider_id: Uuid,
        notes: Option<String>,
    ) -> Result<Reservation, ReservationError> {
        let reservation = self.ledger.get(reservation_id)?;

        let slot = self
            .store
            .get_slot(reservation.slot_id)
            .map_err(|_| ReservationError::SlotNotFound)?;
        if slot.provider_id != provider_id {
            return Err(ReservationError::Forbidden);
        }

        let completed = self.ledger.complete(reservation_id, notes)?;

        self.notifier.notify(
            completed.requester_id,
            completed.id,
            NotificationKind::Completed,
            &format!(
                "Your appointment on {} was marked completed",
                completed.scheduled_at.format("%Y-%m-%d %H:%M")
            ),
        );

        info!("Reservation {} completed by provider {}", reservation_id, provider_id);
        Ok(completed)
    }

    pub fn get(&self, reservation_id: Uuid) -> Result<Reservation, ReservationError> {
        self.ledger.get(reservation_id)
    }

    /// A requester's reservations ordered by appointment time.
    pub fn list_for_requester(&self, requester_id: Uuid) -> Vec<Reservation> {
        self.store
            .list_reservations()
            .into_iter()
            .filter(|r| r.requester_id == requester_id)
            .collect()
    }

    /// Reservations held against a provider's slots.
    pub fn list_for_provider(&self, provider_id: Uuid) -> Vec<Reservation> {
        let slot_ids: HashSet<Uuid> = self
            .store
            .list_slots(provider_id, None)
            .into_iter()
            .map(|s| s.id)
            .collect();

        self.store
            .list_reservations()
            .into_iter()
            .filter(|r| slot_ids.contains(&r.slot_id))
            .collect()
    }

    /// Every reservation in the system (admin view).
    pub fn list_all(&self) -> Vec<Reservation> {
        self.store.list_reservations()
    }

    /// Compensating transition for a hold whose ledger insert failed. The
    /// hold is ours, so a failed release is itself an invariant breach; it
    /// is logged and otherwise ignored because the caller is already on an
    /// error path.
    fn release_hold(&self, slot_id: Uuid) {
        match self
            .store
            .compare_and_set_slot_status(slot_id, SlotStatus::Held, SlotStatus::Free)
        {
            Ok(true) => debug!("Hold on slot {} released", slot_id),
            Ok(false) => error!("Invariant breach: hold on slot {} already gone", slot_id),
            Err(_) => warn!("Slot {} vanished while releasing hold", slot_id),
        }
    }
}
