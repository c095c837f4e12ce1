use super::*;
use crate::locks::IntervalLockTable;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use shared::models::{DiningTable, Reservation, ReservationStatus, ReservationType, ServiceCategory};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn at(hour: u32, minute: u32) -> NaiveDateTime {
    day().and_hms_opt(hour, minute, 0).unwrap()
}

fn reservation(persons: u32, start: (u32, u32), end: (u32, u32)) -> Reservation {
    Reservation::new(
        "Test Guest",
        persons,
        ServiceCategory::Lunch,
        day(),
        NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
        NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
    )
}

fn tables(names: &[&str]) -> Vec<DiningTable> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| DiningTable::new(i as i64 + 1, *name, 2, 1, 1 + 3 * i as i32))
        .collect()
}

fn table_named<'a>(tables: &'a [DiningTable], name: &str) -> &'a DiningTable {
    tables.iter().find(|t| t.name == name).unwrap()
}

fn names(assigned: &[DiningTable]) -> Vec<&str> {
    assigned.iter().map(|t| t.name.as_str()).collect()
}

fn engine(order: &[&str]) -> AssignmentEngine {
    AssignmentEngine::new(order.iter().map(|s| s.to_string()).collect(), 0)
}

// ========================================================================
// Preference order
// ========================================================================

#[test]
fn test_sort_by_preference() {
    let layout = tables(&["T5", "T1", "X9", "T2", "A0"]);
    let sorted = engine(&["T1", "T2", "T5"]).sort_by_preference(&layout);
    // Unlisted tables follow by id
    assert_eq!(names(&sorted), vec!["T1", "T2", "T5", "X9", "A0"]);
}

// ========================================================================
// Manual mode
// ========================================================================

#[test]
fn test_manual_contiguous_block_from_forced_table() {
    let layout = tables(&["A", "B", "C"]);
    let b = table_named(&layout, "B").id;
    let r = reservation(4, (12, 0), (14, 0));

    let assigned = engine(&["A", "B", "C"])
        .assign(&r, &layout, &[], &IntervalLockTable::new(), AssignmentMode::Manual(b))
        .unwrap();
    assert_eq!(names(&assigned), vec!["B", "C"]);
}

#[test]
fn test_manual_walk_skips_occupied_tables() {
    let layout = tables(&["A", "B", "C", "D"]);
    let other = reservation(2, (12, 0), (14, 0))
        .with_tables(vec![table_named(&layout, "C").clone()]);
    let r = reservation(4, (13, 0), (15, 0));

    let assigned = engine(&["A", "B", "C", "D"])
        .assign(
            &r,
            &layout,
            &[other],
            &IntervalLockTable::new(),
            AssignmentMode::Manual(table_named(&layout, "B").id),
        )
        .unwrap();
    assert_eq!(names(&assigned), vec!["B", "D"]);
}

#[test]
fn test_manual_fallback_includes_earlier_tables() {
    let layout = tables(&["A", "B", "C"]);
    let c = table_named(&layout, "C").id;
    let r = reservation(6, (12, 0), (14, 0));

    let assigned = engine(&["A", "B", "C"])
        .assign(&r, &layout, &[], &IntervalLockTable::new(), AssignmentMode::Manual(c))
        .unwrap();
    assert_eq!(names(&assigned), vec!["C", "A", "B"]);
}

#[test]
fn test_manual_table_not_found() {
    let layout = tables(&["A", "B"]);
    let r = reservation(2, (12, 0), (14, 0));
    let err = engine(&["A", "B"])
        .assign(&r, &layout, &[], &IntervalLockTable::new(), AssignmentMode::Manual(99))
        .unwrap_err();
    assert_eq!(err, AssignmentError::TableNotFound);
}

#[test]
fn test_manual_locked_table() {
    let layout = tables(&["A", "B"]);
    let a = table_named(&layout, "A").clone();
    let mut locks = IntervalLockTable::new();
    locks.lock(a.id, at(12, 30), at(13, 30));

    let r = reservation(2, (12, 0), (14, 0));
    let err = engine(&["A", "B"])
        .assign(&r, &layout, &[], &locks, AssignmentMode::Manual(a.id))
        .unwrap_err();
    assert_eq!(err, AssignmentError::TableLocked);

    // The owner may keep its own locked table
    let owner = r.with_tables(vec![a.clone()]);
    let assigned = engine(&["A", "B"])
        .assign(&owner, &layout, &[], &locks, AssignmentMode::Manual(a.id))
        .unwrap();
    assert_eq!(names(&assigned), vec!["A"]);
}

#[test]
fn test_manual_occupied_table() {
    let layout = tables(&["A", "B"]);
    let a = table_named(&layout, "A").clone();
    let other = reservation(2, (11, 0), (12, 30)).with_tables(vec![a.clone()]);
    let r = reservation(2, (12, 0), (14, 0));

    let err = engine(&["A", "B"])
        .assign(&r, &layout, &[other], &IntervalLockTable::new(), AssignmentMode::Manual(a.id))
        .unwrap_err();
    assert_eq!(err, AssignmentError::TableLocked);
}

#[test]
fn test_oversized_grace_period_is_bounded() {
    let layout = tables(&["A", "B"]);
    let engine = AssignmentEngine::new(vec!["A".into(), "B".into()], i64::MAX);

    let assigned = engine
        .assign(
            &reservation(2, (12, 0), (13, 0)),
            &layout,
            &[],
            &IntervalLockTable::new(),
            AssignmentMode::Automatic,
        )
        .unwrap();
    assert_eq!(names(&assigned), vec!["A"]);
}

#[test]
fn test_manual_insufficient() {
    let layout = tables(&["A", "B"]);
    let r = reservation(6, (12, 0), (14, 0));
    let err = engine(&["A", "B"])
        .assign(&r, &layout, &[], &IntervalLockTable::new(), AssignmentMode::Manual(1))
        .unwrap_err();
    assert_eq!(err, AssignmentError::InsufficientTables);
}

// ========================================================================
// Automatic mode
// ========================================================================

#[test]
fn test_automatic_skips_locked_tables() {
    let layout = tables(&["A", "B", "C", "D"]);
    let mut locks = IntervalLockTable::new();
    locks.lock(table_named(&layout, "A").id, at(12, 0), at(14, 0));
    locks.lock(table_named(&layout, "B").id, at(12, 0), at(14, 0));

    let r = reservation(4, (12, 0), (14, 0));
    let assigned = engine(&["A", "D", "B", "C"])
        .assign(&r, &layout, &[], &locks, AssignmentMode::Automatic)
        .unwrap();
    assert_eq!(names(&assigned), vec!["D", "C"]);
}

#[test]
fn test_automatic_all_locked() {
    let layout = tables(&["A", "B"]);
    let mut locks = IntervalLockTable::new();
    for t in &layout {
        locks.lock(t.id, at(12, 0), at(14, 0));
    }
    let r = reservation(2, (12, 0), (14, 0));
    let err = engine(&["A", "B"])
        .assign(&r, &layout, &[], &locks, AssignmentMode::Automatic)
        .unwrap_err();
    assert_eq!(err, AssignmentError::NoTablesLeft);
}

#[test]
fn test_automatic_fallback_over_whole_layout() {
    // B is locked but held by no reservation; C is occupied
    let layout = tables(&["A", "B", "C"]);
    let mut locks = IntervalLockTable::new();
    locks.lock(table_named(&layout, "B").id, at(12, 0), at(14, 0));
    let other = reservation(2, (12, 0), (14, 0))
        .with_tables(vec![table_named(&layout, "C").clone()]);

    let r = reservation(4, (12, 0), (14, 0));
    let assigned = engine(&["A", "B", "C"])
        .assign(&r, &layout, &[other], &locks, AssignmentMode::Automatic)
        .unwrap();
    assert_eq!(names(&assigned), vec!["A", "B"]);
}

#[test]
fn test_automatic_insufficient() {
    let layout = tables(&["A", "B"]);
    let r = reservation(5, (12, 0), (14, 0));
    let err = engine(&["A", "B"])
        .assign(&r, &layout, &[], &IntervalLockTable::new(), AssignmentMode::Automatic)
        .unwrap_err();
    assert_eq!(err, AssignmentError::InsufficientTables);
}

// ========================================================================
// Preconditions and occupancy
// ========================================================================

#[test]
fn test_invalid_requests() {
    let layout = tables(&["A"]);
    let locks = IntervalLockTable::new();
    let e = engine(&["A"]);

    let empty_window = reservation(2, (14, 0), (14, 0));
    assert_eq!(
        e.assign(&empty_window, &layout, &[], &locks, AssignmentMode::Automatic),
        Err(AssignmentError::Unknown)
    );

    let nobody = reservation(0, (12, 0), (14, 0));
    assert_eq!(
        e.assign(&nobody, &layout, &[], &locks, AssignmentMode::Automatic),
        Err(AssignmentError::Unknown)
    );

    let r = reservation(2, (12, 0), (14, 0));
    assert_eq!(
        e.assign(&r, &[], &[], &locks, AssignmentMode::Automatic),
        Err(AssignmentError::NoTablesLeft)
    );
}

#[test]
fn test_occupancy_ignores_released_reservations() {
    let layout = tables(&["A"]);
    let a = layout[0].clone();
    let r = reservation(2, (12, 0), (14, 0));
    let window = r.window().unwrap();
    let e = engine(&["A"]);

    let holder = reservation(2, (12, 0), (14, 0)).with_tables(vec![a.clone()]);
    assert!(e.is_occupied(a.id, &r, &window, std::slice::from_ref(&holder)));

    for released in [
        holder.clone().with_status(ReservationStatus::Canceled),
        holder.clone().with_status(ReservationStatus::NoShow),
        holder.clone().with_status(ReservationStatus::Deleted),
        holder.clone().with_type(ReservationType::WaitingList),
    ] {
        assert!(!e.is_occupied(a.id, &r, &window, &[released]));
    }

    // Editing a reservation never conflicts with itself
    let own = r.clone().with_tables(vec![a.clone()]);
    assert!(!e.is_occupied(a.id, &r, &window, &[own]));

    // Another day
    let mut tomorrow = holder;
    tomorrow.date = day().succ_opt().unwrap();
    assert!(!e.is_occupied(a.id, &r, &window, &[tomorrow]));
}

#[test]
fn test_occupancy_grace_period() {
    let layout = tables(&["A"]);
    let a = layout[0].clone();
    let earlier = reservation(2, (11, 0), (12, 0)).with_tables(vec![a.clone()]);
    let r = reservation(2, (12, 10), (13, 0));
    let window = r.window().unwrap();

    assert!(!engine(&["A"]).is_occupied(a.id, &r, &window, std::slice::from_ref(&earlier)));

    let strict = AssignmentEngine::new(vec!["A".into()], 15);
    assert!(strict.is_occupied(a.id, &r, &window, &[earlier]));
}

#[test]
fn test_back_to_back_is_free() {
    let layout = tables(&["A"]);
    let a = layout[0].clone();
    let earlier = reservation(2, (11, 0), (12, 0)).with_tables(vec![a.clone()]);
    let r = reservation(2, (12, 0), (13, 0));

    let assigned = engine(&["A"])
        .assign(&r, &layout, &[earlier], &IntervalLockTable::new(), AssignmentMode::Automatic)
        .unwrap();
    assert_eq!(names(&assigned), vec!["A"]);
}

#[test]
fn test_available_tables() {
    let layout = tables(&["A", "B", "C"]);
    let a = table_named(&layout, "A").clone();
    let b = table_named(&layout, "B").clone();
    let other = reservation(2, (12, 0), (14, 0)).with_tables(vec![b.clone()]);
    let r = reservation(2, (12, 0), (14, 0)).with_tables(vec![a.clone()]);

    let available = engine(&["A", "B", "C"]).available_tables(&r, &layout, &[other]);
    let summary: Vec<_> = available
        .iter()
        .map(|a| (a.table.name.as_str(), a.is_currently_assigned))
        .collect();
    assert_eq!(summary, vec![("A", true), ("C", false)]);
}

#[test]
fn test_error_codes() {
    use shared::error::{AppError, ErrorCode};
    assert_eq!(ErrorCode::from(AssignmentError::TableLocked), ErrorCode::TableLocked);
    let app: AppError = AssignmentError::InsufficientTables.into();
    assert_eq!(app.code, ErrorCode::InsufficientTables);
}
