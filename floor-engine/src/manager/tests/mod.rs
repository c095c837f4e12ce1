use super::*;
use crate::core::{default_assignment_order, default_base_tables};
use chrono::{NaiveDate, NaiveTime};
use shared::models::ServiceCategory;


fn test_config() -> EngineConfig {
    let mut config = EngineConfig::with_overrides("./target/test_work_dir", default_base_tables())
        .with_assignment_order(default_assignment_order())
        .with_grace_period(0)
        .with_cluster_capacity(100);
    config.grid_rows = 15;
    config.grid_columns = 18;
    config
}


fn create_test_manager() -> AllocationManager {
    AllocationManager::in_memory(&test_config())
}


fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}


fn lunch(d: u32) -> LayoutKey {
    LayoutKey::new(day(d), ServiceCategory::Lunch)
}


fn at(d: u32, hour: u32, minute: u32) -> NaiveDateTime {
    day(d).and_hms_opt(hour, minute, 0).unwrap()
}


// ========================================================================
// Helper: a lunch reservation on March `d`
// ========================================================================

fn lunch_reservation(
    name: &str,
    persons: u32,
    d: u32,
    start: (u32, u32),
    end: (u32, u32),
) -> Reservation {
    Reservation::new(
        name,
        persons,
        ServiceCategory::Lunch,
        day(d),
        NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
        NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
    )
}


fn ids(tables: &[DiningTable]) -> Vec<i64> {
    tables.iter().map(|t| t.id).collect()
}


/// Assign automatically and return the reservation id
fn seat(manager: &AllocationManager, reservation: Reservation) -> Uuid {
    let id = reservation.id;
    manager
        .assign(reservation, AssignmentMode::Automatic)
        .expect("automatic assignment failed");
    id
}

mod test_status;
