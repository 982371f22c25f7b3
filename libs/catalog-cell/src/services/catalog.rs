// libs/catalog-cell/src/services/catalog.rs
use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use shared_database::memory::MemoryStore;
use shared_database::records::ServiceOffering;
use shared_models::auth::User;

use crate::models::{CatalogError, CreateServiceRequest};

/// Service catalog: the offerings patients pick from when browsing
/// bookable slots. Offerings are metadata only; deleting one does not
/// touch existing slots or reservations that reference it.
pub struct CatalogService {
    store: Arc<MemoryStore>,
}

impl CatalogService {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    pub fn create(
        &self,
        provider_id: Uuid,
        request: CreateServiceRequest,
    ) -> Result<ServiceOffering, CatalogError> {
        request.validate()?;

        let now = Utc::now();
        let offering = ServiceOffering {
            id: Uuid::new_v4(),
            provider_id,
            name: request.name.trim().to_string(),
            description: request.description,
            duration_minutes: request.duration_minutes,
            price: request.price,
            created_at: now,
            updated_at: now,
        };

        let offering = self.store.insert_service(offering);
        info!(
            "Service '{}' ({}) published by provider {}",
            offering.name, offering.id, provider_id
        );
        Ok(offering)
    }

    pub fn get(&self, service_id: Uuid) -> Result<ServiceOffering, CatalogError> {
        self.store
            .get_service(service_id)
            .map_err(|_| CatalogError::NotFound)
    }

    /// All offerings, sorted by name.
    pub fn list(&self) -> Vec<ServiceOffering> {
        self.store.list_services()
    }

    /// Remove an offering. Owning provider or admin only.
    pub fn delete(&self, service_id: Uuid, caller: &User, caller_id: Uuid) -> Result<(), CatalogError> {
        let offering = self
            .store
            .get_service(service_id)
            .map_err(|_| CatalogError::NotFound)?;

        if offering.provider_id != caller_id && !caller.is_admin() {
            return Err(CatalogError::Forbidden);
        }

        self.store
            .delete_service(service_id)
            .map_err(|_| CatalogError::NotFound)?;
        info!("Service {} removed by {}", service_id, caller_id);
        Ok(())
    }
}
