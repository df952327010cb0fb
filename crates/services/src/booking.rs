use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::convert;
use crate::validation::ValidationError;

/// Start and end instants of a booking. Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BookingWindow {
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Inbound booking slot as clients send it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    /// 12-hour clock time, e.g. `"2:30 PM"`
    pub time: String,
    /// `HH:MM` service duration
    #[serde(default)]
    pub duration: Option<String>,
}

/// Compute the window starting at `date` + `time` (UTC) and lasting `duration_minutes`.
///
/// A zero duration gives an empty window. Negative durations are not rejected here and
/// produce an end before the start; callers must refuse them upstream.
pub fn compute_window(
    date: &str,
    time: &str,
    duration_minutes: i64,
) -> Result<BookingWindow, ValidationError> {
    let start_time = convert::parse_12_hour(time)?;
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::new("date", format!("expected YYYY-MM-DD, got {date:?}")))?;

    let start = date.and_time(start_time).and_utc();
    let end = TimeDelta::try_minutes(duration_minutes)
        .and_then(|delta| start.checked_add_signed(delta))
        .ok_or_else(|| ValidationError::new("durationMinutes", "duration is out of range"))?;

    Ok(BookingWindow { start, end })
}

/// Window for a request whose duration arrives as `HH:MM` text.
/// A missing or unreadable duration counts as zero minutes.
pub fn window_for_request(request: &BookingRequest) -> Result<BookingWindow, ValidationError> {
    let minutes = convert::to_minutes(request.duration.as_deref());
    tracing::debug!(
        "Computing booking window: date={}, time={}, minutes={}",
        request.date,
        request.time,
        minutes
    );
    compute_window(&request.date, &request.time, minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_afternoon_window() {
        let window = compute_window("2024-01-01", "2:30 PM", 90).unwrap();
        assert_eq!(
            window.start,
            Utc.with_ymd_and_hms(2024, 1, 1, 14, 30, 0).unwrap()
        );
        assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 1, 1, 16, 0, 0).unwrap());
        assert_eq!(window.start.to_rfc3339(), "2024-01-01T14:30:00+00:00");
    }

    #[test]
    fn test_zero_duration_is_empty_window() {
        let window = compute_window("2024-03-10", "9:00 AM", 0).unwrap();
        assert_eq!(window.start, window.end);
        assert_eq!(window.duration(), TimeDelta::zero());
    }

    #[test]
    fn test_window_crossing_midnight() {
        let window = compute_window("2024-12-31", "11:30 PM", 60).unwrap();
        assert_eq!(window.end, Utc.with_ymd_and_hms(2025, 1, 1, 0, 30, 0).unwrap());
    }

    #[test]
    fn test_negative_duration_is_not_guarded() {
        let window = compute_window("2024-01-01", "2:30 PM", -30).unwrap();
        assert!(window.end < window.start);
        assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 1, 1, 14, 0, 0).unwrap());
    }

    #[test]
    fn test_invalid_time_is_rejected() {
        let err = compute_window("2024-01-01", "14:30", 30).unwrap_err();
        assert_eq!(err.field, "time");
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        let err = compute_window("01/01/2024", "2:30 PM", 30).unwrap_err();
        assert_eq!(err.field, "date");
        assert!(compute_window("2024-02-30", "2:30 PM", 30).is_err());
    }

    #[test]
    fn test_huge_duration_is_rejected_instead_of_overflowing() {
        assert!(compute_window("2024-01-01", "2:30 PM", i64::MAX).is_err());
    }

    #[test]
    fn test_contains_is_half_open() {
        let window = compute_window("2024-01-01", "10:00 AM", 30).unwrap();
        assert!(window.contains(window.start));
        assert!(!window.contains(window.end));
    }

    #[test]
    fn test_window_for_request_uses_duration_text() {
        let request = BookingRequest {
            date: "2024-01-01".to_string(),
            time: "2:30 PM".to_string(),
            duration: Some("01:30".to_string()),
        };
        let window = window_for_request(&request).unwrap();
        assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 1, 1, 16, 0, 0).unwrap());
    }

    #[test]
    fn test_window_for_request_with_bad_duration_is_empty() {
        let request: BookingRequest =
            serde_json::from_str(r#"{"date":"2024-01-01","time":"8:00 AM","duration":"soon"}"#)
                .unwrap();
        let window = window_for_request(&request).unwrap();
        assert_eq!(window.start, window.end);
    }
}
