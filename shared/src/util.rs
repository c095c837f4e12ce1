use chrono::{NaiveDate, NaiveTime};

use crate::error::{AppError, AppResult, ErrorCode};

/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Parse a calendar date (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
        AppError::with_message(ErrorCode::Unknown, format!("Invalid date format: {}", date))
    })
}

/// Parse a time of day (HH:MM)
pub fn parse_time(time: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(time, "%H:%M").map_err(|_| {
        AppError::with_message(ErrorCode::Unknown, format!("Invalid time format: {}", time))
    })
}
