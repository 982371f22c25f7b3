use std::sync::Arc;
use std::thread;

use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use notification_cell::services::notify::NotificationService;
use reservation_cell::models::{ReservationError, ReserveRequest};
use reservation_cell::services::booking::ReservationService;
use shared_database::memory::MemoryStore;
use shared_database::records::{
    NotificationKind, ReservationStatus, ServiceOffering, Slot, SlotStatus,
};
use shared_models::auth::User;
use shared_utils::test_utils::TestUser;

fn store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

fn publish_slot(store: &MemoryStore, provider_id: Uuid, start: (u32, u32), end: (u32, u32)) -> Slot {
    let slot = Slot::new(
        provider_id,
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
        NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
        NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
    );
    store.insert_slot(slot).unwrap()
}

fn publish_service(store: &MemoryStore, provider_id: Uuid) -> ServiceOffering {
    let now = Utc::now();
    store.insert_service(ServiceOffering {
        id: Uuid::new_v4(),
        provider_id,
        name: "Consultation".to_string(),
        description: None,
        duration_minutes: 30,
        price: 25.0,
        created_at: now,
        updated_at: now,
    })
}

fn as_user(test_user: &TestUser) -> User {
    test_user.to_user()
}

#[test]
fn concurrent_reserves_have_exactly_one_winner() {
    let store = store();
    let provider = Uuid::new_v4();
    let slot = publish_slot(&store, provider, (9, 0), (9, 30));
    let offering = publish_service(&store, provider);

    let mut handles = Vec::new();
    for _ in 0..16 {
        let store = Arc::clone(&store);
        let slot_id = slot.id;
        let service_id = offering.id;
        handles.push(thread::spawn(move || {
            let service = ReservationService::new(store);
            service.reserve(
                Uuid::new_v4(),
                ReserveRequest {
                    slot_id,
                    service_id,
                },
            )
        }));
    }

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners: Vec<_> = results.iter().filter(|r| r.is_ok()).collect();
    assert_eq!(winners.len(), 1, "exactly one reserve call may win the slot");

    for result in &results {
        if let Err(e) = result {
            assert_matches!(e, ReservationError::SlotUnavailable);
        }
    }

    // The slot ended up booked with a single active reservation against it.
    assert_eq!(store.get_slot(slot.id).unwrap().status, SlotStatus::Booked);
    let active: Vec<_> = store
        .list_reservations()
        .into_iter()
        .filter(|r| r.slot_id == slot.id && r.status == ReservationStatus::Active)
        .collect();
    assert_eq!(active.len(), 1);
}

#[test]
fn reserve_unknown_slot_is_not_found() {
    let store = store();
    let service = ReservationService::new(Arc::clone(&store));

    let result = service.reserve(
        Uuid::new_v4(),
        ReserveRequest {
            slot_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
        },
    );
    assert_matches!(result, Err(ReservationError::SlotNotFound));
}

#[test]
fn cancel_frees_the_slot_for_rebooking() {
    let store = store();
    let provider = Uuid::new_v4();
    let slot = publish_slot(&store, provider, (10, 0), (10, 30));
    let offering = publish_service(&store, provider);
    let patient = TestUser::patient("first@example.com");

    let service = ReservationService::new(Arc::clone(&store));
    let reservation = service
        .reserve(
            patient.uuid(),
            ReserveRequest {
                slot_id: slot.id,
                service_id: offering.id,
            },
        )
        .unwrap();

    let canceled = service
        .cancel(reservation.id, &as_user(&patient), patient.uuid())
        .unwrap();
    assert_eq!(canceled.status, ReservationStatus::Canceled);
    assert_eq!(store.get_slot(slot.id).unwrap().status, SlotStatus::Free);

    // The freed window is bookable again by someone else; the canceled
    // reservation stays canceled.
    let second = service
        .reserve(
            Uuid::new_v4(),
            ReserveRequest {
                slot_id: slot.id,
                service_id: offering.id,
            },
        )
        .unwrap();
    assert_ne!(second.id, reservation.id);
    assert_eq!(
        store.get_reservation(reservation.id).unwrap().status,
        ReservationStatus::Canceled
    );
    assert_eq!(store.get_slot(slot.id).unwrap().status, SlotStatus::Booked);
}

#[test]
fn cancel_is_limited_to_requester_or_admin() {
    let store = store();
    let provider = Uuid::new_v4();
    let slot = publish_slot(&store, provider, (11, 0), (11, 30));
    let offering = publish_service(&store, provider);
    let patient = TestUser::patient("owner@example.com");
    let stranger = TestUser::patient("stranger@example.com");
    let admin = TestUser::admin("admin@example.com");

    let service = ReservationService::new(Arc::clone(&store));
    let reservation = service
        .reserve(
            patient.uuid(),
            ReserveRequest {
                slot_id: slot.id,
                service_id: offering.id,
            },
        )
        .unwrap();

    assert_matches!(
        service.cancel(reservation.id, &as_user(&stranger), stranger.uuid()),
        Err(ReservationError::Forbidden)
    );

    // Admin override cancels on the patient's behalf.
    let canceled = service
        .cancel(reservation.id, &as_user(&admin), admin.uuid())
        .unwrap();
    assert_eq!(canceled.status, ReservationStatus::Canceled);
}

#[test]
fn terminal_reservations_reject_further_transitions() {
    let store = store();
    let provider = Uuid::new_v4();
    let slot = publish_slot(&store, provider, (12, 0), (12, 30));
    let offering = publish_service(&store, provider);
    let patient = TestUser::patient("patient@example.com");

    let service = ReservationService::new(Arc::clone(&store));
    let reservation = service
        .reserve(
            patient.uuid(),
            ReserveRequest {
                slot_id: slot.id,
                service_id: offering.id,
            },
        )
        .unwrap();

    service
        .cancel(reservation.id, &as_user(&patient), patient.uuid())
        .unwrap();

    assert_matches!(
        service.cancel(reservation.id, &as_user(&patient), patient.uuid()),
        Err(ReservationError::InvalidState(ReservationStatus::Canceled))
    );
    assert_matches!(
        service.complete(reservation.id, provider, None),
        Err(ReservationError::InvalidState(ReservationStatus::Canceled))
    );
}

#[test]
fn complete_keeps_the_slot_booked() {
    let store = store();
    let provider = Uuid::new_v4();
    let slot = publish_slot(&store, provider, (13, 0), (13, 30));
    let offering = publish_service(&store, provider);
    let patient = TestUser::patient("patient@example.com");

    let service = ReservationService::new(Arc::clone(&store));
    let reservation = service
        .reserve(
            patient.uuid(),
            ReserveRequest {
                slot_id: slot.id,
                service_id: offering.id,
            },
        )
        .unwrap();

    let completed = service
        .complete(reservation.id, provider, Some("Follow up in 3 months".to_string()))
        .unwrap();
    assert_eq!(completed.status, ReservationStatus::Completed);
    assert_eq!(completed.notes.as_deref(), Some("Follow up in 3 months"));

    // A delivered appointment's window is consumed, never re-offered.
    assert_eq!(store.get_slot(slot.id).unwrap().status, SlotStatus::Booked);

    assert_matches!(
        service.complete(reservation.id, provider, None),
        Err(ReservationError::InvalidState(ReservationStatus::Completed))
    );
}

#[test]
fn complete_requires_the_owning_provider() {
    let store = store();
    let provider = Uuid::new_v4();
    let other_provider = Uuid::new_v4();
    let slot = publish_slot(&store, provider, (14, 0), (14, 30));
    let offering = publish_service(&store, provider);

    let service = ReservationService::new(Arc::clone(&store));
    let reservation = service
        .reserve(
            Uuid::new_v4(),
            ReserveRequest {
                slot_id: slot.id,
                service_id: offering.id,
            },
        )
        .unwrap();

    assert_matches!(
        service.complete(reservation.id, other_provider, None),
        Err(ReservationError::Forbidden)
    );
    assert_eq!(
        store.get_reservation(reservation.id).unwrap().status,
        ReservationStatus::Active
    );
}

#[test]
fn booking_lifecycle_notifies_both_parties() {
    let store = store();
    let provider = Uuid::new_v4();
    let slot = publish_slot(&store, provider, (15, 0), (15, 30));
    let offering = publish_service(&store, provider);
    let patient = TestUser::patient("patient@example.com");

    let service = ReservationService::new(Arc::clone(&store));
    let notifier = NotificationService::new(Arc::clone(&store));

    let reservation = service
        .reserve(
            patient.uuid(),
            ReserveRequest {
                slot_id: slot.id,
                service_id: offering.id,
            },
        )
        .unwrap();

    let patient_kinds = |notifier: &NotificationService| -> Vec<NotificationKind> {
        notifier
            .list_for_user(patient.uuid())
            .into_iter()
            .map(|n| n.kind)
            .collect()
    };

    assert_eq!(patient_kinds(&notifier), vec![NotificationKind::Booked]);
    assert_eq!(notifier.list_for_user(provider).len(), 1);

    service
        .cancel(reservation.id, &as_user(&patient), patient.uuid())
        .unwrap();

    // Newest first.
    assert_eq!(
        patient_kinds(&notifier),
        vec![NotificationKind::Canceled, NotificationKind::Booked]
    );
    assert_eq!(notifier.list_for_user(provider).len(), 2);
}

#[test]
fn completion_notifies_the_requester_exactly_once() {
    let store = store();
    let provider = Uuid::new_v4();
    let slot = publish_slot(&store, provider, (16, 0), (16, 30));
    let offering = publish_service(&store, provider);
    let patient = TestUser::patient("patient@example.com");

    let service = ReservationService::new(Arc::clone(&store));
    let notifier = NotificationService::new(Arc::clone(&store));

    let reservation = service
        .reserve(
            patient.uuid(),
            ReserveRequest {
                slot_id: slot.id,
                service_id: offering.id,
            },
        )
        .unwrap();

    service.complete(reservation.id, provider, None).unwrap();

    let completed_count = |user: Uuid| {
        notifier
            .list_for_user(user)
            .iter()
            .filter(|n| n.kind == NotificationKind::Completed)
            .count()
    };
    assert_eq!(completed_count(patient.uuid()), 1);
    // Completion is reported to the requester only.
    assert_eq!(completed_count(provider), 0);

    // A rejected second complete must not fire again.
    assert_matches!(
        service.complete(reservation.id, provider, None),
        Err(ReservationError::InvalidState(ReservationStatus::Completed))
    );
    assert_eq!(completed_count(patient.uuid()), 1);
    assert_eq!(notifier.list_for_user(patient.uuid()).len(), 2);
}

#[test]
fn booked_slots_and_active_reservations_stay_in_bijection() {
    let store = store();
    let provider = Uuid::new_v4();
    let offering = publish_service(&store, provider);
    let service = ReservationService::new(Arc::clone(&store));

    // Mixed lifecycle across several slots: booked, canceled, completed.
    let mut reservations = Vec::new();
    for hour in 9..15 {
        let slot = publish_slot(&store, provider, (hour, 0), (hour, 30));
        let patient = TestUser::patient(&format!("p{}@example.com", hour));
        let reservation = service
            .reserve(
                patient.uuid(),
                ReserveRequest {
                    slot_id: slot.id,
                    service_id: offering.id,
                },
            )
            .unwrap();
        reservations.push((reservation, patient));
    }
    let (first, first_patient) = &reservations[0];
    service
        .cancel(first.id, &as_user(first_patient), first_patient.uuid())
        .unwrap();
    service.complete(reservations[1].0.id, provider, None).unwrap();

    let slots = store.list_slots(provider, None);
    let all = store.list_reservations();
    for slot in slots {
        let active: Vec<_> = all
            .iter()
            .filter(|r| r.slot_id == slot.id && r.status == ReservationStatus::Active)
            .collect();
        match slot.status {
            // Completed reservations also leave their slot booked, so a
            // booked slot has at most one active reservation, never more.
            SlotStatus::Booked => assert!(active.len() <= 1),
            SlotStatus::Free | SlotStatus::Held => assert!(active.is_empty()),
        }
    }
    for reservation in all.iter().filter(|r| r.status == ReservationStatus::Active) {
        assert_eq!(
            store.get_slot(reservation.slot_id).unwrap().status,
            SlotStatus::Booked
        );
    }
}
