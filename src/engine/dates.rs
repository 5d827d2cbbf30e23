use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::storage::CellValue;

/// Follow-up dates sit exactly this many calendar days before the renewal.
pub const FOLLOW_UP_OFFSET_DAYS: i64 = 42;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"];

/// Parse a heterogeneous date-like cell into a canonical date-time.
///
/// Typed date cells pass through untouched. Text goes through a naive ISO
/// cleanup first: the literal `T` separator becomes a space and a trailing
/// `Z` is dropped, then a fixed locale-independent format list is tried.
/// Anything unparseable is `None`; callers log and skip, they never fail the
/// batch over a bad date.
pub fn normalize(raw: &CellValue) -> Option<NaiveDateTime> {
    match raw {
        CellValue::Date(d) => Some(*d),
        CellValue::Text(s) if !s.trim().is_empty() => {
            let cleaned = s.trim().replace('T', " ");
            let cleaned = cleaned.strip_suffix('Z').unwrap_or(&cleaned).trim();

            for fmt in DATETIME_FORMATS {
                if let Ok(dt) = NaiveDateTime::parse_from_str(cleaned, fmt) {
                    return Some(dt);
                }
            }
            for fmt in DATE_FORMATS {
                if let Ok(d) = NaiveDate::parse_from_str(cleaned, fmt) {
                    return d.and_hms_opt(0, 0, 0);
                }
            }

            debug!("Invalid date format after parsing: {:?}", s);
            None
        }
        _ => None,
    }
}

/// True iff year, month and day-of-month all match; time-of-day is ignored.
pub fn is_same_date(a: NaiveDateTime, b: NaiveDateTime) -> bool {
    a.date() == b.date()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_iso_markers_are_stripped() {
        let normalized = normalize(&CellValue::text("2024-03-01T09:30:00Z")).unwrap();
        assert_eq!(normalized, dt("2024-03-01 09:30:00"));
    }

    #[test]
    fn test_typed_dates_pass_through() {
        let d = dt("2024-06-15 13:45:00");
        assert_eq!(normalize(&CellValue::Date(d)), Some(d));
    }

    #[test]
    fn test_date_only_strings() {
        let normalized = normalize(&CellValue::text("2024-03-01")).unwrap();
        assert_eq!(normalized, dt("2024-03-01 00:00:00"));
        let slash = normalize(&CellValue::text("03/01/2024")).unwrap();
        assert_eq!(slash, dt("2024-03-01 00:00:00"));
    }

    #[test]
    fn test_missing_or_invalid_is_none() {
        assert_eq!(normalize(&CellValue::Empty), None);
        assert_eq!(normalize(&CellValue::text("  ")), None);
        assert_eq!(normalize(&CellValue::text("not a date")), None);
        assert_eq!(normalize(&CellValue::Number(42.0)), None);
    }

    #[test]
    fn test_same_date_ignores_time() {
        let a = dt("2024-03-01 00:00:01");
        let b = dt("2024-03-01 23:59:59");
        assert!(is_same_date(a, a));
        assert!(is_same_date(a, b));
        assert!(!is_same_date(a, dt("2024-03-02 00:00:01")));
    }
}
