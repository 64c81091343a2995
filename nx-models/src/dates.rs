//! Date conversion helpers for automation date strings.
//!
//! The server sends ISO-like timestamps ("2024-03-18T10:41:06.00Z") and
//! accepts plain "YYYY-MM-DD" dates in request parameters. User-facing
//! input dates use a "YYYY/MM/DD" form.

use chrono::NaiveDate;

use nx_core::error::{NxError, NxResult};

/// Format a date the way the server expects it in request parameters.
pub fn to_server_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse the date part of a server timestamp string.
///
/// Everything after the 'T' separator is ignored; the server's
/// sub-second and zone suffixes vary between versions.
pub fn parse_server_date(value: &str) -> NxResult<NaiveDate> {
    let date_part = value.split('T').next().unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|e| NxError::InvalidDate(format!("{value}: {e}")))
}

/// Parse a "YYYY/MM/DD" input date, validating that the date exists.
pub fn parse_input_date(value: &str) -> NxResult<NaiveDate> {
    let mut parts = value.split('/');
    let (year, month, day) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(y), Some(m), Some(d), None) => (y, m, d),
        _ => {
            return Err(NxError::InvalidDate(format!(
                "{value}: expected YYYY/MM/DD"
            )))
        }
    };

    let year: i32 = year
        .parse()
        .map_err(|_| NxError::InvalidDate(format!("{value}: bad year")))?;
    let month: u32 = month
        .parse()
        .map_err(|_| NxError::InvalidDate(format!("{value}: bad month")))?;
    let day: u32 = day
        .parse()
        .map_err(|_| NxError::InvalidDate(format!("{value}: bad day")))?;

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| NxError::InvalidDate(format!("{value}: no such calendar date")))
}
