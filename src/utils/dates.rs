// src/utils/dates.rs

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

// MM/DD/YY
static SLASH_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{2})/([0-9]{2})/([0-9]{2})$").expect("valid slash date regex"));

// DD-MM-YY
static DASH_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{2})-([0-9]{2})-([0-9]{2})$").expect("valid dash date regex"));

/// Parses the two literal date layouts found on the scanned records.
///
/// `MM/DD/YY` and `DD-MM-YY`, two-digit years in the 2000s. Anything else,
/// including surrounding whitespace or an impossible calendar date, is `None`.
pub fn parse_document_date(value: &str) -> Option<NaiveDate> {
    if let Some(caps) = SLASH_DATE.captures(value) {
        let month = caps[1].parse::<u32>().ok()?;
        let day = caps[2].parse::<u32>().ok()?;
        let year = caps[3].parse::<i32>().ok()?;
        return NaiveDate::from_ymd_opt(2000 + year, month, day);
    }
    if let Some(caps) = DASH_DATE.captures(value) {
        let day = caps[1].parse::<u32>().ok()?;
        let month = caps[2].parse::<u32>().ok()?;
        let year = caps[3].parse::<i32>().ok()?;
        return NaiveDate::from_ymd_opt(2000 + year, month, day);
    }
    None
}

/// Milliseconds since the Unix epoch at UTC midnight of the parsed date, or
/// `f64::INFINITY` when the value is empty or not a recognised date.
pub fn sortable_timestamp(value: &str) -> f64 {
    parse_document_date(value)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis() as f64)
        .unwrap_or(f64::INFINITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slash_dates_are_month_first() {
        assert_eq!(
            parse_document_date("01/15/24"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
    }

    #[test]
    fn dash_dates_are_day_first() {
        assert_eq!(
            parse_document_date("20-01-24"),
            NaiveDate::from_ymd_opt(2024, 1, 20)
        );
    }

    #[test]
    fn rejects_other_layouts() {
        for value in [
            "",
            "2024-01-15",
            "1/15/24",
            "01/15/2024",
            "01-15/24",
            " 01/15/24",
            "01/15/24 ",
            "15.01.24",
            "sin fecha",
        ] {
            assert_eq!(parse_document_date(value), None, "{value:?} should not parse");
        }
    }

    #[test]
    fn rejects_impossible_calendar_dates() {
        assert_eq!(parse_document_date("02/30/24"), None);
        assert_eq!(parse_document_date("31-04-24"), None);
        assert_eq!(parse_document_date("13/01/24"), None);
        assert_eq!(parse_document_date("00-01-24"), None);
    }

    #[test]
    fn leap_day_is_valid_in_leap_years_only() {
        assert!(parse_document_date("02/29/24").is_some());
        assert!(parse_document_date("29-02-23").is_none());
    }

    #[test]
    fn unparseable_values_sort_last() {
        assert_eq!(sortable_timestamp("garbage"), f64::INFINITY);
        assert!(sortable_timestamp("01/15/24") < sortable_timestamp("20-01-24"));
        assert!(sortable_timestamp("01/01/70").is_finite());
    }
}
