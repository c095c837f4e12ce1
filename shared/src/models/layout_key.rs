//! Layout Key Model
//!
//! A layout key addresses one timeslot: a calendar date plus a daily
//! service category. Keys order by category first and date second, so the
//! keys of one category form a single chronologically ordered range.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorCode};
use crate::util::parse_date;

/// Daily service window (营业时段)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ServiceCategory {
    Lunch,
    Dinner,
    NoBookingZone,
}

impl ServiceCategory {
    pub const ALL: [ServiceCategory; 3] = [Self::Lunch, Self::Dinner, Self::NoBookingZone];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::NoBookingZone => "noBookingZone",
        }
    }
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::InvalidFormat,
                    format!("Unknown service category: {}", s),
                )
            })
    }
}

/// Timeslot address for cached layouts and clusters
///
/// Field order matters: the derived `Ord` compares `category` before `date`.
/// The `YYYY-MM-DD-<category>` string form is only used for persistence and
/// logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct LayoutKey {
    pub category: ServiceCategory,
    pub date: NaiveDate,
}

impl LayoutKey {
    pub fn new(date: NaiveDate, category: ServiceCategory) -> Self {
        Self { category, date }
    }

    /// Smallest key of a category, used as the lower bound of range scans
    pub fn first_of(category: ServiceCategory) -> Self {
        Self {
            category,
            date: NaiveDate::MIN,
        }
    }

    /// Largest key of a category, used as the upper bound of range scans
    pub fn last_of(category: ServiceCategory) -> Self {
        Self {
            category,
            date: NaiveDate::MAX,
        }
    }

    pub fn same_category(&self, other: &LayoutKey) -> bool {
        self.category == other.category
    }
}

impl fmt::Display for LayoutKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.date.format("%Y-%m-%d"), self.category)
    }
}

impl FromStr for LayoutKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (date, category) = s.rsplit_once('-').ok_or_else(|| {
            AppError::with_message(ErrorCode::InvalidFormat, format!("Invalid layout key: {}", s))
        })?;
        Ok(Self::new(parse_date(date)?, category.parse()?))
    }
}

impl From<LayoutKey> for String {
    fn from(key: LayoutKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for LayoutKey {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(y: i32, m: u32, d: u32, category: ServiceCategory) -> LayoutKey {
        LayoutKey::new(NaiveDate::from_ymd_opt(y, m, d).unwrap(), category)
    }

    #[test]
    fn test_display_and_parse() {
        let k = key(2024, 1, 1, ServiceCategory::Lunch);
        assert_eq!(k.to_string(), "2024-01-01-lunch");
        assert_eq!("2024-01-01-lunch".parse::<LayoutKey>().unwrap(), k);

        let k = key(2024, 12, 31, ServiceCategory::NoBookingZone);
        assert_eq!(k.to_string(), "2024-12-31-noBookingZone");
        assert_eq!(k.to_string().parse::<LayoutKey>().unwrap(), k);
    }

    #[test]
    fn test_parse_invalid() {
        assert!("lunch".parse::<LayoutKey>().is_err());
        assert!("2024-01-01-brunch".parse::<LayoutKey>().is_err());
        assert!("2024-13-01-lunch".parse::<LayoutKey>().is_err());
    }

    #[test]
    fn test_ordering_is_chronological_within_category() {
        let mut keys = vec![
            key(2024, 2, 1, ServiceCategory::Lunch),
            key(2023, 12, 31, ServiceCategory::Dinner),
            key(2024, 1, 1, ServiceCategory::Lunch),
            key(2024, 1, 10, ServiceCategory::Lunch),
        ];
        keys.sort();

        let lunch: Vec<_> = keys
            .iter()
            .filter(|k| k.category == ServiceCategory::Lunch)
            .map(|k| k.to_string())
            .collect();
        assert_eq!(
            lunch,
            vec!["2024-01-01-lunch", "2024-01-10-lunch", "2024-02-01-lunch"]
        );

        // Categories never interleave
        assert!(LayoutKey::last_of(ServiceCategory::Lunch) < key(1970, 1, 1, ServiceCategory::Dinner));
        assert!(LayoutKey::first_of(ServiceCategory::Lunch) < key(1970, 1, 1, ServiceCategory::Lunch));
    }

    #[test]
    fn test_serde_as_string() {
        let k = key(2024, 1, 2, ServiceCategory::Dinner);
        let json = serde_json::to_string(&k).unwrap();
        assert_eq!(json, "\"2024-01-02-dinner\"");

        let back: LayoutKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, k);
    }
}
