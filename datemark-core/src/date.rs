//! ISO-8601 date handling at the library boundary.
//!
//! Dates travel as `YYYY-MM-DD` strings between the store, the CLI and the
//! holiday API; everything inside the crate works with `NaiveDate`.

use chrono::{Datelike, NaiveDate};

use crate::error::{DatemarkError, DatemarkResult};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a strict `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> DatemarkResult<NaiveDate> {
    let trimmed = s.trim();

    // chrono accepts signs and space-padded fields ("+2024-1-01", "2024- 1-01");
    // the wire format is exactly four, two and two digits
    let bytes = trimmed.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(invalid_date(s));
    }

    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| invalid_date(s))
}

/// Format a date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse `YYYY-MM` into the first and last day of that month.
pub fn parse_month(s: &str) -> DatemarkResult<(NaiveDate, NaiveDate)> {
    let invalid = || DatemarkError::Parse(format!("Invalid month '{}'. Expected YYYY-MM", s));

    let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
    if year.len() != 4 || month.len() != 2 || !all_digits(year) || !all_digits(month) {
        return Err(invalid());
    }

    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;

    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    Ok((first, last_day_of_month(first)))
}

/// Last calendar day of the month containing `date`.
pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };

    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

fn invalid_date(s: &str) -> DatemarkError {
    DatemarkError::Parse(format!("Invalid date '{}'. Expected YYYY-MM-DD", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_accepts_iso() {
        let date = parse_date("2024-02-29").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(format_date(date), "2024-02-29");
    }

    #[test]
    fn test_parse_date_rejects_malformed() {
        for input in [
            "2023-02-29",
            "2024-13-01",
            "2024-1-5",
            "20240105",
            "",
            "tomorrow",
            "+2024-1-01",
            "2024-01- 1",
            "2024- 1-01",
            "+002024-01-01",
            "2024/01/01",
        ] {
            let err = parse_date(input).unwrap_err();
            assert!(
                matches!(err, DatemarkError::Parse(_)),
                "expected parse error for {:?}, got {:?}",
                input,
                err
            );
        }
    }

    #[test]
    fn test_parse_month_bounds() {
        let (first, last) = parse_month("2024-02").unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let (_, december_end) = parse_month("2023-12").unwrap();
        assert_eq!(december_end, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());

        assert!(parse_month("2024-2").is_err());
        assert!(parse_month("2024-00").is_err());
        assert!(parse_month("2024-+1").is_err());
        assert!(parse_month("+024-01").is_err());
    }
}
