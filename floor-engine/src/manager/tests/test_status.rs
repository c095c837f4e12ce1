use super::*;
use crate::presence::SharedPresence;
use shared::error::{AppError, ErrorCode};


fn waiting(name: &str, persons: u32) -> Reservation {
    lunch_reservation(name, persons, 1, (12, 0), (13, 30)).with_type(ReservationType::WaitingList)
}


#[test]
fn test_showed_up_keeps_tables() {
    let manager = create_test_manager();
    let id = seat(&manager, lunch_reservation("A", 2, 1, (12, 0), (13, 30)));

    let updated = manager.update_status(id, ReservationStatus::ShowedUp).unwrap();

    assert_eq!(updated.status, ReservationStatus::ShowedUp);
    assert_eq!(updated.table_ids(), vec![1]);
    assert!(manager.is_table_locked(1, at(1, 12, 0), at(1, 13, 30)));
}


#[test]
fn test_cancel_releases_tables() {
    let manager = create_test_manager();
    let id = seat(&manager, lunch_reservation("A", 2, 1, (12, 0), (13, 30)));

    let updated = manager.update_status(id, ReservationStatus::Canceled).unwrap();

    assert!(updated.tables.is_empty());
    assert!(!manager.is_table_locked(1, at(1, 12, 0), at(1, 13, 30)));
    assert_eq!(manager.lock_stats().silent_unlocks, 0);

    // The table is free for the next guest
    let tables = manager
        .assign(
            lunch_reservation("B", 2, 1, (12, 0), (13, 30)),
            AssignmentMode::Automatic,
        )
        .unwrap();
    assert_eq!(ids(&tables), vec![1]);
}


#[test]
fn test_no_show_unlocks_but_keeps_record() {
    let manager = create_test_manager();
    let id = seat(&manager, lunch_reservation("A", 2, 1, (12, 0), (13, 30)));

    manager.update_status(id, ReservationStatus::Late).unwrap();
    let updated = manager.update_status(id, ReservationStatus::NoShow).unwrap();

    assert_eq!(updated.table_ids(), vec![1]);
    assert!(!manager.is_table_locked(1, at(1, 12, 0), at(1, 13, 30)));

    let tables = manager
        .assign(
            lunch_reservation("B", 2, 1, (12, 0), (13, 30)),
            AssignmentMode::Manual(1),
        )
        .unwrap();
    assert_eq!(ids(&tables), vec![1]);

    // Deleting the no-show later must not unlock B's table
    manager.update_status(id, ReservationStatus::Deleted).unwrap();
    assert!(manager.is_table_locked(1, at(1, 12, 0), at(1, 13, 30)));
}


#[test]
fn test_invalid_transitions() {
    let manager = create_test_manager();
    let id = seat(&manager, lunch_reservation("A", 2, 1, (12, 0), (13, 30)));

    let result = manager.update_status(id, ReservationStatus::NoShow);
    assert!(matches!(
        result,
        Err(AllocationError::InvalidTransition {
            from: ReservationStatus::Pending,
            to: ReservationStatus::NoShow
        })
    ));

    manager.update_status(id, ReservationStatus::Canceled).unwrap();
    let result = manager.update_status(id, ReservationStatus::Pending);
    assert!(matches!(result, Err(AllocationError::InvalidTransition { .. })));

    let result = manager.update_status(Uuid::new_v4(), ReservationStatus::ShowedUp);
    assert!(matches!(result, Err(AllocationError::ReservationNotFound(_))));
}


// ========================================================================
// Unassigned reservations
// ========================================================================

#[test]
fn test_store_unassigned_requires_release_state() {
    let manager = create_test_manager();
    let pending = lunch_reservation("A", 2, 1, (12, 0), (13, 30));
    let id = pending.id;

    let result = manager.store_unassigned(pending);
    assert!(matches!(result, Err(AllocationError::TablesRequired(rid)) if rid == id));
    assert!(manager.reservation(id).is_none());

    let stored = manager.store_unassigned(waiting("W", 2)).unwrap();
    assert!(stored.tables.is_empty());
    assert!(manager.reservation(stored.id).is_some());
}


#[test]
fn test_assign_waiting_list_stores_without_tables() {
    let manager = create_test_manager();
    let reservation = waiting("W", 2);
    let id = reservation.id;
    let locks_before = manager.lock_stats().locks;

    let result = manager.assign(reservation, AssignmentMode::Automatic);

    assert_eq!(result, Err(AssignmentError::Unknown));
    let stored = manager.reservation(id).unwrap();
    assert!(stored.tables.is_empty());
    assert!(stored.is_waiting_list());
    assert_eq!(manager.lock_stats().locks, locks_before);
    assert!(!manager.is_table_locked(1, at(1, 12, 0), at(1, 13, 30)));
}


#[test]
fn test_assign_terminal_status_stores_without_tables() {
    let manager = create_test_manager();

    for status in [
        ReservationStatus::Canceled,
        ReservationStatus::ToHandle,
        ReservationStatus::Deleted,
    ] {
        let reservation = lunch_reservation("A", 2, 1, (12, 0), (13, 30)).with_status(status);
        let id = reservation.id;

        let result = manager.assign(reservation, AssignmentMode::Manual(1));

        assert_eq!(result, Err(AssignmentError::Unknown));
        let stored = manager.reservation(id).unwrap();
        assert_eq!(stored.status, status);
        assert!(stored.tables.is_empty());
    }
    assert_eq!(manager.lock_stats().locks, 0);

    // Table 1 is still free for a regular booking
    let tables = manager
        .assign(
            lunch_reservation("B", 2, 1, (12, 0), (13, 30)),
            AssignmentMode::Manual(1),
        )
        .unwrap();
    assert_eq!(ids(&tables), vec![1]);
}


#[test]
fn test_reassign_as_canceled_releases_previous_tables() {
    let manager = create_test_manager();
    let reservation = lunch_reservation("A", 2, 1, (12, 0), (13, 30));
    let id = seat(&manager, reservation);
    assert!(manager.is_table_locked(1, at(1, 12, 0), at(1, 13, 30)));

    let edited = manager
        .reservation(id)
        .unwrap()
        .with_status(ReservationStatus::Canceled);
    let result = manager.assign(edited, AssignmentMode::Automatic);

    assert_eq!(result, Err(AssignmentError::Unknown));
    assert!(manager.reservation(id).unwrap().tables.is_empty());
    assert!(!manager.is_table_locked(1, at(1, 12, 0), at(1, 13, 30)));
    assert_eq!(manager.lock_stats().silent_unlocks, 0);
}


// ========================================================================
// Waiting list confirmation
// ========================================================================

#[test]
fn test_confirm_waiting_list() {
    let manager = create_test_manager();
    let stored = manager.store_unassigned(waiting("W", 3)).unwrap();

    let tables = manager.confirm(stored.id).unwrap();

    assert_eq!(ids(&tables), vec![1, 2]);
    let confirmed = manager.reservation(stored.id).unwrap();
    assert_eq!(confirmed.reservation_type, ReservationType::InAdvance);
    assert_eq!(confirmed.status, ReservationStatus::Pending);
    assert!(manager.is_table_locked(2, at(1, 12, 0), at(1, 13, 30)));
}


#[test]
fn test_confirm_failure_stays_on_waiting_list() {
    let manager = create_test_manager();
    let stored = manager.store_unassigned(waiting("Crowd", 40)).unwrap();

    let result = manager.confirm(stored.id);

    assert!(matches!(
        result,
        Err(AllocationError::Assignment(AssignmentError::InsufficientTables))
    ));
    assert!(manager.reservation(stored.id).unwrap().is_waiting_list());
}


#[test]
fn test_confirm_rejects_regular_reservation() {
    let manager = create_test_manager();
    let id = seat(&manager, lunch_reservation("A", 2, 1, (12, 0), (13, 30)));

    assert!(matches!(
        manager.confirm(id),
        Err(AllocationError::NotWaitingList(_))
    ));
    assert!(matches!(
        manager.confirm(Uuid::new_v4()),
        Err(AllocationError::ReservationNotFound(_))
    ));
}


// ========================================================================
// Release and presence
// ========================================================================

#[test]
fn test_release_keeps_status() {
    let manager = create_test_manager();
    let id = seat(&manager, lunch_reservation("A", 4, 1, (12, 0), (13, 30)));

    let released = manager.release(id).unwrap();

    assert_eq!(released.status, ReservationStatus::Pending);
    assert!(released.tables.is_empty());
    assert!(!manager.is_table_locked(1, at(1, 12, 0), at(1, 13, 30)));
    assert!(!manager.is_table_locked(2, at(1, 12, 0), at(1, 13, 30)));
}


#[test]
fn test_presence_is_advisory() {
    let presence = Arc::new(SharedPresence::new());
    let manager = create_test_manager().with_presence(presence.clone());
    let reservation = lunch_reservation("A", 2, 1, (12, 0), (13, 30));
    let id = reservation.id;

    presence.begin_editing(id);
    assert!(manager.is_edited_elsewhere(id));
    assert!(manager.assign(reservation, AssignmentMode::Automatic).is_ok());

    presence.end_editing(id);
    assert!(!manager.is_edited_elsewhere(id));
}


#[test]
fn test_error_codes() {
    let id = Uuid::new_v4();
    let err: AppError = AllocationError::TablesRequired(id).into();
    assert_eq!(err.code, ErrorCode::TablesRequired);

    let err: AppError = AllocationError::Assignment(AssignmentError::TableLocked).into();
    assert_eq!(err.code, ErrorCode::TableLocked);

    let err = AllocationError::InvalidTransition {
        from: ReservationStatus::Canceled,
        to: ReservationStatus::Pending,
    };
    assert_eq!(err.code(), ErrorCode::InvalidStatusTransition);
}
