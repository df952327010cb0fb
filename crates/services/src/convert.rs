//! Scalar converters for the textual encodings clients send.

use chrono::NaiveTime;

use crate::validation::ValidationError;

/// Parse a 12-hour clock time such as `"2:30 PM"`.
///
/// Accepts `H:MM` or `HH:MM` followed by `AM`/`PM` (any case, space optional).
pub fn parse_12_hour(raw: &str) -> Result<NaiveTime, ValidationError> {
    let trimmed = raw.trim();
    let invalid = |reason: &str| ValidationError::new("time", format!("{reason} in {trimmed:?}"));

    let split = trimmed
        .len()
        .checked_sub(2)
        .filter(|&at| trimmed.is_char_boundary(at))
        .ok_or_else(|| invalid("missing AM/PM marker"))?;
    let (clock, meridiem) = trimmed.split_at(split);
    let is_pm = match meridiem.to_ascii_uppercase().as_str() {
        "AM" => false,
        "PM" => true,
        _ => return Err(invalid("missing AM/PM marker")),
    };

    let (hours, minutes) = clock
        .trim_end()
        .split_once(':')
        .ok_or_else(|| invalid("expected H:MM"))?;

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(hours) || hours.len() > 2 {
        return Err(invalid("hour is not a number"));
    }
    if !all_digits(minutes) || minutes.len() != 2 {
        return Err(invalid("minutes must be two digits"));
    }

    let hour: u32 = hours.parse().map_err(|_| invalid("hour is not a number"))?;
    let minute: u32 = minutes
        .parse()
        .map_err(|_| invalid("minutes must be two digits"))?;

    if !(1..=12).contains(&hour) {
        return Err(invalid("hour must be between 1 and 12"));
    }
    if minute > 59 {
        return Err(invalid("minutes must be between 00 and 59"));
    }

    let hour = match (hour, is_pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, false) => h,
        (h, true) => h + 12,
    };

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| invalid("time out of range"))
}

/// `"2:30 PM"` → `"14:30"`
pub fn to_24_hour(raw: &str) -> Result<String, ValidationError> {
    Ok(parse_12_hour(raw)?.format("%H:%M").to_string())
}

/// Total minutes of an `HH:MM` duration.
///
/// Absent or malformed input is `0`, never an error: durations are advisory display data.
pub fn to_minutes(duration: Option<&str>) -> i64 {
    let Some((hours, minutes)) = duration.and_then(|d| d.split_once(':')) else {
        return 0;
    };

    match (hours.trim().parse::<i64>(), minutes.trim().parse::<i64>()) {
        (Ok(h), Ok(m)) => h.saturating_mul(60).saturating_add(m),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_minutes() {
        assert_eq!(to_minutes(Some("02:15")), 135);
        assert_eq!(to_minutes(Some("0:45")), 45);
        assert_eq!(to_minutes(Some("10:00")), 600);
    }

    #[test]
    fn test_to_minutes_falls_back_to_zero() {
        assert_eq!(to_minutes(None), 0);
        assert_eq!(to_minutes(Some("")), 0);
        assert_eq!(to_minutes(Some("90")), 0);
        assert_eq!(to_minutes(Some("2:xx")), 0);
        assert_eq!(to_minutes(Some("xx:15")), 0);
        assert_eq!(to_minutes(Some("1:2:3")), 0);
    }

    #[test]
    fn test_to_24_hour() {
        assert_eq!(to_24_hour("2:30 PM").unwrap(), "14:30");
        assert_eq!(to_24_hour("9:05 AM").unwrap(), "09:05");
        assert_eq!(to_24_hour("11:59 pm").unwrap(), "23:59");
        assert_eq!(to_24_hour(" 7:00PM ").unwrap(), "19:00");
    }

    #[test]
    fn test_noon_and_midnight() {
        assert_eq!(to_24_hour("12:00 AM").unwrap(), "00:00");
        assert_eq!(to_24_hour("12:15 AM").unwrap(), "00:15");
        assert_eq!(to_24_hour("12:00 PM").unwrap(), "12:00");
        assert_eq!(to_24_hour("12:45 PM").unwrap(), "12:45");
    }

    #[test]
    fn test_rejects_hour_out_of_range() {
        assert!(to_24_hour("0:30 AM").is_err());
        assert!(to_24_hour("13:30 PM").is_err());
    }

    #[test]
    fn test_rejects_missing_meridiem() {
        let err = to_24_hour("2:30").unwrap_err();
        assert_eq!(err.field, "time");
        assert!(to_24_hour("2:30 XM").is_err());
        assert!(to_24_hour("").is_err());
    }

    #[test]
    fn test_rejects_malformed_separator() {
        assert!(to_24_hour("2.30 PM").is_err());
        assert!(to_24_hour("230 PM").is_err());
        assert!(to_24_hour("2:3 PM").is_err());
        assert!(to_24_hour("2:60 PM").is_err());
        assert!(to_24_hour("2:30:00 PM").is_err());
    }

    #[test]
    fn test_non_ascii_input_does_not_panic() {
        assert!(to_24_hour("2:30 ПМ").is_err());
        assert!(to_24_hour("é").is_err());
    }
}
