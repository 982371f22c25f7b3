// libs/notification-cell/src/services/notify.rs
use std::sync::Arc;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use shared_database::memory::MemoryStore;
use shared_database::records::{Notification, NotificationKind};

use crate::models::NotificationError;

/// Best-effort notification collaborator. Records booking events per user;
/// delivery channels (push/email) are out of scope. Callers treat this as
/// fire-and-forget: a failure here never affects the reservation that
/// triggered it.
pub struct NotificationService {
    store: Arc<MemoryStore>,
}

impl NotificationService {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    pub fn notify(
        &self,
        user_id: Uuid,
        reservation_id: Uuid,
        kind: NotificationKind,
        message: &str,
    ) -> Notification {
        debug!("Notifying user {} of {} reservation {}", user_id, kind, reservation_id);

        self.store.insert_notification(Notification {
            id: Uuid::new_v4(),
            user_id,
            reservation_id,
            kind,
            message: message.to_string(),
            is_read: false,
            created_at: Utc::now(),
        })
    }

    /// A user's notifications, newest first.
    pub fn list_for_user(&self, user_id: Uuid) -> Vec<Notification> {
        self.store.list_notifications_for_user(user_id)
    }

    /// Mark one of the caller's own notifications as read.
    pub fn mark_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> Result<Notification, NotificationError> {
        let owned = self
            .store
            .list_notifications_for_user(user_id)
            .iter()
            .any(|n| n.id == notification_id);
        if !owned {
            // Distinguishing absent from foreign would leak existence.
            return Err(NotificationError::NotFound);
        }

        self.store
            .mark_notification_read(notification_id)
            .map_err(|_| NotificationError::NotFound)
    }
}
