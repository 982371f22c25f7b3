// libs/catalog-cell/src/models.rs
use serde::{Deserialize, Serialize};

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: i32,
    pub price: f64,
}

impl CreateServiceRequest {
    /// Field-level validation before anything touches the store.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::Validation(
                "Service name cannot be empty".to_string(),
            ));
        }
        if self.duration_minutes < 5 || self.duration_minutes > 240 {
            return Err(CatalogError::Validation(
                "Duration must be between 5 and 240 minutes".to_string(),
            ));
        }
        if self.price < 0.0 {
            return Err(CatalogError::Validation(
                "Price cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error("Service not found")]
    NotFound,

    #[error("Not authorized to manage this service")]
    Forbidden,

    #[error("Invalid service definition: {0}")]
    Validation(String),
}
