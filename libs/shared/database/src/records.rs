// libs/shared/database/src/records.rs
//
// Persistent record types shared by the cells. Slot and Reservation are
// deliberately one-directional: only the Reservation stores a reference to
// its Slot. The reverse link exists solely as the bijection invariant the
// reservation service enforces (a booked slot has exactly one active
// reservation pointing at it).
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A discrete bookable time window published by a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: SlotStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Slot {
    pub fn new(provider_id: Uuid, date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            provider_id,
            date,
            start_time,
            end_time,
            status: SlotStatus::Free,
            created_at: now,
            updated_at: now,
        }
    }

    /// Appointment timestamp: calendar date combined with the start time.
    /// Wall-clock local time, no timezone conversion is performed.
    pub fn scheduled_at(&self) -> DateTime<Utc> {
        self.date.and_time(self.start_time).and_utc()
    }

    pub fn overlaps(&self, start: NaiveTime, end: NaiveTime) -> bool {
        self.start_time < end && self.end_time > start
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Free,
    /// Transient state between winning the free slot and committing the
    /// matching ledger entry. Never visible as a steady state.
    Held,
    Booked,
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotStatus::Free => write!(f, "free"),
            SlotStatus::Held => write!(f, "held"),
            SlotStatus::Booked => write!(f, "booked"),
        }
    }
}

/// A confirmed binding of one requester to one slot for one service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub slot_id: Uuid,
    pub requester_id: Uuid,
    pub service_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub status: ReservationStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    pub fn new(slot: &Slot, requester_id: Uuid, service_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            slot_id: slot.id,
            requester_id,
            service_id,
            scheduled_at: slot.scheduled_at(),
            status: ReservationStatus::Active,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Active,
    Canceled,
    Completed,
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservationStatus::Active => write!(f, "active"),
            ReservationStatus::Canceled => write!(f, "canceled"),
            ReservationStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Recorded booking event for a user. Delivery (push/email) is out of scope;
/// the record itself is the notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub reservation_id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Booked,
    Canceled,
    Completed,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::Booked => write!(f, "booked"),
            NotificationKind::Canceled => write!(f, "canceled"),
            NotificationKind::Completed => write!(f, "completed"),
        }
    }
}

/// Bookable service metadata published by a provider. Referenced by
/// reservations by identifier only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceOffering {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: i32,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
