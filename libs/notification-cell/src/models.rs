// libs/notification-cell/src/models.rs

#[derive(Debug, Clone, thiserror::Error)]
pub enum NotificationError {
    /// Absent or owned by someone else; the two cases are indistinguishable
    /// on purpose so foreign ids do not leak existence.
    #[error("Notification not found")]
    NotFound,
}
