//! Reservation Model

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::dining_table::DiningTable;
use super::layout_key::{LayoutKey, ServiceCategory};
use crate::util::now_millis;

/// Reservation status (预订状态)
///
/// ```text
/// pending ⇄ showedUp
/// pending → late → showedUp | noShow
/// any non-terminal → canceled | toHandle | deleted   (terminal, tables released)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReservationStatus {
    Pending,
    ShowedUp,
    Late,
    NoShow,
    Canceled,
    ToHandle,
    Deleted,
}

impl ReservationStatus {
    /// Terminal states force the release of every assigned table
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Canceled | Self::ToHandle | Self::Deleted)
    }

    pub fn can_transition_to(&self, next: ReservationStatus) -> bool {
        use ReservationStatus::*;
        if *self == next || self.is_terminal() {
            return false;
        }
        match (self, next) {
            (_, Canceled | ToHandle | Deleted) => true,
            (Pending, ShowedUp | Late) => true,
            (ShowedUp, Pending) => true,
            (Late, ShowedUp | NoShow) => true,
            _ => false,
        }
    }
}

/// How the reservation entered the book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReservationType {
    WalkIn,
    InAdvance,
    WaitingList,
}

/// Half-open time range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    /// `None` unless `end` is strictly after `start`
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Option<Self> {
        (end > start).then_some(Self { start, end })
    }

    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// Reservation entity (预订)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub name: String,
    pub number_of_persons: u32,
    pub category: ServiceCategory,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: ReservationStatus,
    pub reservation_type: ReservationType,
    #[serde(default)]
    pub tables: Vec<DiningTable>,
    /// Table the user forced for this reservation, if any
    #[serde(default)]
    pub manual_override: Option<i64>,
    pub created_at: i64,
    pub last_edited_at: i64,
}

impl Reservation {
    /// New pending, in-advance reservation without tables
    pub fn new(
        name: impl Into<String>,
        number_of_persons: u32,
        category: ServiceCategory,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        let now = now_millis();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            number_of_persons,
            category,
            date,
            start_time,
            end_time,
            status: ReservationStatus::Pending,
            reservation_type: ReservationType::InAdvance,
            tables: Vec::new(),
            manual_override: None,
            created_at: now,
            last_edited_at: now,
        }
    }

    pub fn with_status(mut self, status: ReservationStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_type(mut self, reservation_type: ReservationType) -> Self {
        self.reservation_type = reservation_type;
        self
    }

    pub fn with_tables(mut self, tables: Vec<DiningTable>) -> Self {
        self.tables = tables;
        self
    }

    pub fn layout_key(&self) -> LayoutKey {
        LayoutKey::new(self.date, self.category)
    }

    /// Booked window, `None` when the end time is not after the start time
    pub fn window(&self) -> Option<TimeWindow> {
        TimeWindow::new(
            self.date.and_time(self.start_time),
            self.date.and_time(self.end_time),
        )
    }

    pub fn is_waiting_list(&self) -> bool {
        self.reservation_type == ReservationType::WaitingList
    }

    /// Whether this reservation blocks its tables for other bookings
    pub fn occupies_tables(&self) -> bool {
        !self.is_waiting_list()
            && !matches!(
                self.status,
                ReservationStatus::Canceled
                    | ReservationStatus::NoShow
                    | ReservationStatus::Deleted
                    | ReservationStatus::ToHandle
            )
    }

    /// Whether this reservation must hold zero tables
    pub fn must_release_tables(&self) -> bool {
        self.status.is_terminal() || self.is_waiting_list()
    }

    pub fn holds_table(&self, table_id: i64) -> bool {
        self.tables.iter().any(|t| t.id == table_id)
    }

    pub fn table_ids(&self) -> Vec<i64> {
        self.tables.iter().map(|t| t.id).collect()
    }

    pub fn assigned_capacity(&self) -> u32 {
        self.tables.iter().map(|t| t.capacity).sum()
    }

    pub fn touch(&mut self) {
        self.last_edited_at = now_millis();
    }
}
