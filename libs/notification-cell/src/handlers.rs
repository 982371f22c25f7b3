// libs/notification-cell/src/handlers.rs
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

use crate::models::NotificationError;
use crate::services::notify::NotificationService;

/// The caller's notifications, newest first.
#[axum::debug_handler]
pub async fn my_notifications(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let user_id = user_uuid(&user)?;

    let service = NotificationService::new(Arc::clone(&state.store));
    let notifications = service.list_for_user(user_id);

    Ok(Json(json!({
        "success": true,
        "notifications": notifications
    })))
}

/// Mark one of the caller's notifications as read.
#[axum::debug_handler]
pub async fn mark_notification_read(
    State(state): State<Arc<AppState>>,
    Path(notification_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let user_id = user_uuid(&user)?;

    let service = NotificationService::new(Arc::clone(&state.store));
    let notification = service
        .mark_read(notification_id, user_id)
        .map_err(|e| match e {
            NotificationError::NotFound => {
                AppError::NotFound("Notification not found".to_string())
            }
        })?;

    Ok(Json(json!({
        "success": true,
        "notification": notification
    })))
}
