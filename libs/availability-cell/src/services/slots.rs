// libs/availability-cell/src/services/slots.rs
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::error::StoreError;
use shared_database::memory::MemoryStore;
use shared_database::records::{Slot, SlotStatus};

use crate::models::{PublishSlotRequest, SlotError};

/// Slot Store service: publishing, listing and retracting bookable windows.
/// Status transitions on published slots belong exclusively to the
/// reservation service; nothing here mutates a slot's status.
pub struct SlotService {
    store: Arc<MemoryStore>,
}

impl SlotService {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// Publish a new availability window for a provider.
    pub fn publish(&self, provider_id: Uuid, request: PublishSlotRequest) -> Result<Slot, SlotError> {
        debug!(
            "Publishing slot for provider {} on {} {}-{}",
            provider_id, request.date, request.start_time, request.end_time
        );

        if request.start_time >= request.end_time {
            return Err(SlotError::InvalidRange(
                "Start time must be before end time".to_string(),
            ));
        }

        let slot = Slot::new(provider_id, request.date, request.start_time, request.end_time);
        let slot = self.store.insert_slot(slot).map_err(|e| match e {
            StoreError::Overlap => SlotError::Overlap,
            other => SlotError::InvalidRange(other.to_string()),
        })?;

        info!("Slot {} published for provider {}", slot.id, provider_id);
        Ok(slot)
    }

    /// Free slots for a provider, ordered by (date, start_time), optionally
    /// restricted to one date.
    pub fn list_free(&self, provider_id: Uuid, date: Option<NaiveDate>) -> Vec<Slot> {
        self.store
            .list_slots(provider_id, date)
            .into_iter()
            .filter(|s| s.status == SlotStatus::Free)
            .collect()
    }

    /// Free slots for a provider from a given date onward. Used for the
    /// patient-facing listing when no explicit date is requested.
    pub fn list_free_from(&self, provider_id: Uuid, from: NaiveDate) -> Vec<Slot> {
        self.store
            .list_slots(provider_id, None)
            .into_iter()
            .filter(|s| s.status == SlotStatus::Free && s.date >= from)
            .collect()
    }

    /// All of a provider's slots regardless of status, for the provider's
    /// own schedule view.
    pub fn list_for_provider(&self, provider_id: Uuid, date: Option<NaiveDate>) -> Vec<Slot> {
        self.store.list_slots(provider_id, date)
    }

    /// Free slots bookable for a given service: the publishing provider's
    /// free windows, on the requested date or upcoming from `today`.
    pub fn list_free_for_service(
        &self,
        service_id: Uuid,
        date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Vec<Slot>, SlotError> {
        let service = self
            .store
            .get_service(service_id)
            .map_err(|_| SlotError::ServiceNotFound)?;

        Ok(match date {
            Some(d) => self.list_free(service.provider_id, Some(d)),
            None => self.list_free_from(service.provider_id, today),
        })
    }

    /// Retract an unbooked slot. Held and booked slots cannot be retracted;
    /// the delete-if-free check is atomic in the store, so a retract racing
    /// a reservation cannot strand a winner's slot.
    pub fn retract(&self, slot_id: Uuid, provider_id: Uuid) -> Result<(), SlotError> {
        let slot = self.store.get_slot(slot_id).map_err(|_| SlotError::NotFound)?;

        if slot.provider_id != provider_id {
            return Err(SlotError::Forbidden);
        }

        self.store.delete_slot_if_free(slot_id).map_err(|e| match e {
            StoreError::NotFound => SlotError::NotFound,
            _ => SlotError::Conflict,
        })?;

        info!("Slot {} retracted by provider {}", slot_id, provider_id);
        Ok(())
    }
}
