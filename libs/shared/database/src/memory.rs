// libs/shared/database/src/memory.rs
//
// In-process document store. Every conditional operation (overlap-checked
// insert, compare-and-set, delete-if-free, invariant-checked reservation
// insert) runs under the owning table's write lock, so exactly one of any
// set of racing callers observes the precondition as satisfied. A
// multi-process deployment would move the same conditional-write contract
// into the database; the method surface is shaped so that swap does not
// change service semantics.
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{NaiveDate, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreError;
use crate::records::{
    Notification, Reservation, ReservationStatus, ServiceOffering, Slot, SlotStatus,
};

#[derive(Default)]
struct ReservationTable {
    rows: HashMap<Uuid, Reservation>,
    /// slot_id -> reservation_id for reservations with status = active.
    /// Maintained under the same lock as `rows`, so the one-active-per-slot
    /// invariant check and the insert are a single atomic step.
    active_by_slot: HashMap<Uuid, Uuid>,
}

#[derive(Default)]
pub struct MemoryStore {
    slots: RwLock<HashMap<Uuid, Slot>>,
    reservations: RwLock<ReservationTable>,
    notifications: RwLock<HashMap<Uuid, Notification>>,
    services: RwLock<HashMap<Uuid, ServiceOffering>>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Slots
    // ------------------------------------------------------------------

    /// Insert a slot, rejecting any window that overlaps an existing slot
    /// for the same provider and date, regardless of that slot's status.
    pub fn insert_slot(&self, slot: Slot) -> Result<Slot, StoreError> {
        let mut slots = write(&self.slots);

        let overlapping = slots.values().any(|existing| {
            existing.provider_id == slot.provider_id
                && existing.date == slot.date
                && existing.overlaps(slot.start_time, slot.end_time)
        });
        if overlapping {
            return Err(StoreError::Overlap);
        }

        slots.insert(slot.id, slot.clone());
        debug!("Slot {} inserted for provider {}", slot.id, slot.provider_id);
        Ok(slot)
    }

    pub fn get_slot(&self, slot_id: Uuid) -> Result<Slot, StoreError> {
        read(&self.slots)
            .get(&slot_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    /// Atomic conditional update of a slot's status: succeeds only if the
    /// current status equals `expected`. Exactly one of any set of racing
    /// callers can win a given transition.
    pub fn compare_and_set_slot_status(
        &self,
        slot_id: Uuid,
        expected: SlotStatus,
        next: SlotStatus,
    ) -> Result<bool, StoreError> {
        let mut slots = write(&self.slots);
        let slot = slots.get_mut(&slot_id).ok_or(StoreError::NotFound)?;

        if slot.status != expected {
            debug!(
                "CAS on slot {} lost: expected {}, found {}",
                slot_id, expected, slot.status
            );
            return Ok(false);
        }

        slot.status = next;
        slot.updated_at = Utc::now();
        Ok(true)
    }

    /// Delete a slot only while it is free. Held and booked slots are
    /// referenced (or about to be referenced) by a reservation and must not
    /// disappear underneath it.
    pub fn delete_slot_if_free(&self, slot_id: Uuid) -> Result<Slot, StoreError> {
        let mut slots = write(&self.slots);
        let slot = slots.get(&slot_id).ok_or(StoreError::NotFound)?;

        if slot.status != SlotStatus::Free {
            return Err(StoreError::SlotNotFree);
        }

        slots.remove(&slot_id).ok_or(StoreError::NotFound)
    }

    /// All slots for a provider, optionally restricted to one date, ordered
    /// by (date, start_time).
    pub fn list_slots(&self, provider_id: Uuid, date: Option<NaiveDate>) -> Vec<Slot> {
        let mut result: Vec<Slot> = read(&self.slots)
            .values()
            .filter(|s| s.provider_id == provider_id)
            .filter(|s| date.map_or(true, |d| s.date == d))
            .cloned()
            .collect();
        result.sort_by_key(|s| (s.date, s.start_time));
        result
    }

    // ------------------------------------------------------------------
    // Reservations
    // ------------------------------------------------------------------

    /// Invariant-checked insert: fails if an active reservation already
    /// references the same slot.
    pub fn insert_active_reservation(
        &self,
        reservation: Reservation,
    ) -> Result<Reservation, StoreError> {
        let mut table = write(&self.reservations);

        if table.active_by_slot.contains_key(&reservation.slot_id) {
            return Err(StoreError::ActiveReservationExists);
        }

        table
            .active_by_slot
            .insert(reservation.slot_id, reservation.id);
        table.rows.insert(reservation.id, reservation.clone());
        debug!(
            "Reservation {} recorded for slot {}",
            reservation.id, reservation.slot_id
        );
        Ok(reservation)
    }

    pub fn get_reservation(&self, reservation_id: Uuid) -> Result<Reservation, StoreError> {
        read(&self.reservations)
            .rows
            .get(&reservation_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    pub fn find_active_by_slot(&self, slot_id: Uuid) -> Option<Reservation> {
        let table = read(&self.reservations);
        let id = table.active_by_slot.get(&slot_id)?;
        table.rows.get(id).cloned()
    }

    /// Move a reservation out of the active state. Active is the only legal
    /// source state; canceled and completed are terminal.
    pub fn transition_reservation(
        &self,
        reservation_id: Uuid,
        next: ReservationStatus,
        notes: Option<String>,
    ) -> Result<Reservation, StoreError> {
        let mut table = write(&self.reservations);
        let reservation = table
            .rows
            .get_mut(&reservation_id)
            .ok_or(StoreError::NotFound)?;

        if reservation.status != ReservationStatus::Active {
            return Err(StoreError::ReservationNotActive);
        }

        reservation.status = next;
        if notes.is_some() {
            reservation.notes = notes;
        }
        reservation.updated_at = Utc::now();
        let updated = reservation.clone();

        table.active_by_slot.remove(&updated.slot_id);
        Ok(updated)
    }

    /// Every reservation in the store, ordered by appointment time. Callers
    /// filter by requester or provider as needed.
    pub fn list_reservations(&self) -> Vec<Reservation> {
        let mut result: Vec<Reservation> =
            read(&self.reservations).rows.values().cloned().collect();
        result.sort_by_key(|r| r.scheduled_at);
        result
    }

    // ------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------

    pub fn insert_notification(&self, notification: Notification) -> Notification {
        write(&self.notifications).insert(notification.id, notification.clone());
        notification
    }

    /// A user's notifications, newest first.
    pub fn list_notifications_for_user(&self, user_id: Uuid) -> Vec<Notification> {
        let mut result: Vec<Notification> = read(&self.notifications)
            .values()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        result
    }

    pub fn mark_notification_read(&self, notification_id: Uuid) -> Result<Notification, StoreError> {
        let mut notifications = write(&self.notifications);
        let notification = notifications
            .get_mut(&notification_id)
            .ok_or(StoreError::NotFound)?;
        notification.is_read = true;
        Ok(notification.clone())
    }

    // ------------------------------------------------------------------
    // Service catalog
    // ------------------------------------------------------------------

    pub fn insert_service(&self, service: ServiceOffering) -> ServiceOffering {
        write(&self.services).insert(service.id, service.clone());
        service
    }

    pub fn get_service(&self, service_id: Uuid) -> Result<ServiceOffering, StoreError> {
        read(&self.services)
            .get(&service_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    pub fn list_services(&self) -> Vec<ServiceOffering> {
        let mut result: Vec<ServiceOffering> = read(&self.services).values().cloned().collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        result
    }

    pub fn delete_service(&self, service_id: Uuid) -> Result<ServiceOffering, StoreError> {
        write(&self.services)
            .remove(&service_id)
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn slot(provider: Uuid, start: (u32, u32), end: (u32, u32)) -> Slot {
        Slot::new(
            provider,
            NaiveDate::from_ymd_opt(2026, 9, 14).unwrap(),
            NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        )
    }

    #[test]
    fn cas_wins_once_per_transition() {
        let store = MemoryStore::new();
        let s = store.insert_slot(slot(Uuid::new_v4(), (9, 0), (9, 30))).unwrap();

        assert!(store
            .compare_and_set_slot_status(s.id, SlotStatus::Free, SlotStatus::Held)
            .unwrap());
        // Second caller with the same expectation loses.
        assert!(!store
            .compare_and_set_slot_status(s.id, SlotStatus::Free, SlotStatus::Held)
            .unwrap());
        assert_eq!(store.get_slot(s.id).unwrap().status, SlotStatus::Held);
    }

    #[test]
    fn cas_on_unknown_slot_is_not_found() {
        let store = MemoryStore::new();
        assert_eq!(
            store.compare_and_set_slot_status(Uuid::new_v4(), SlotStatus::Free, SlotStatus::Held),
            Err(StoreError::NotFound)
        );
    }

    #[test]
    fn overlapping_insert_rejected() {
        let store = MemoryStore::new();
        let provider = Uuid::new_v4();
        store.insert_slot(slot(provider, (9, 0), (9, 30))).unwrap();

        assert_eq!(
            store.insert_slot(slot(provider, (9, 15), (9, 45))).unwrap_err(),
            StoreError::Overlap
        );
        // Adjacent window is fine.
        store.insert_slot(slot(provider, (9, 30), (10, 0))).unwrap();
        // Same window for another provider is fine.
        store.insert_slot(slot(Uuid::new_v4(), (9, 0), (9, 30))).unwrap();
    }

    #[test]
    fn delete_requires_free_status() {
        let store = MemoryStore::new();
        let s = store.insert_slot(slot(Uuid::new_v4(), (9, 0), (9, 30))).unwrap();
        store
            .compare_and_set_slot_status(s.id, SlotStatus::Free, SlotStatus::Booked)
            .unwrap();

        assert_eq!(store.delete_slot_if_free(s.id).unwrap_err(), StoreError::SlotNotFree);
        store
            .compare_and_set_slot_status(s.id, SlotStatus::Booked, SlotStatus::Free)
            .unwrap();
        store.delete_slot_if_free(s.id).unwrap();
        assert_eq!(store.get_slot(s.id).unwrap_err(), StoreError::NotFound);
    }

    #[test]
    fn second_active_reservation_per_slot_rejected() {
        let store = MemoryStore::new();
        let s = store.insert_slot(slot(Uuid::new_v4(), (9, 0), (9, 30))).unwrap();

        let first = Reservation::new(&s, Uuid::new_v4(), Uuid::new_v4());
        store.insert_active_reservation(first.clone()).unwrap();

        let second = Reservation::new(&s, Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(
            store.insert_active_reservation(second).unwrap_err(),
            StoreError::ActiveReservationExists
        );

        // Leaving the active state releases the slot index.
        store
            .transition_reservation(first.id, ReservationStatus::Canceled, None)
            .unwrap();
        assert!(store.find_active_by_slot(s.id).is_none());
        let third = Reservation::new(&s, Uuid::new_v4(), Uuid::new_v4());
        store.insert_active_reservation(third).unwrap();
    }

    #[test]
    fn transition_only_from_active() {
        let store = MemoryStore::new();
        let s = store.insert_slot(slot(Uuid::new_v4(), (9, 0), (9, 30))).unwrap();
        let r = store
            .insert_active_reservation(Reservation::new(&s, Uuid::new_v4(), Uuid::new_v4()))
            .unwrap();

        store
            .transition_reservation(r.id, ReservationStatus::Completed, Some("seen".into()))
            .unwrap();
        assert_eq!(
            store
                .transition_reservation(r.id, ReservationStatus::Canceled, None)
                .unwrap_err(),
            StoreError::ReservationNotActive
        );
    }
}
