//! Timestamps in sheet cells.
//!
//! Cells hold wall-clock time at a fixed offset, formatted the way a US-locale
//! spreadsheet shows it, e.g. `4/15/2023 12:00:00 PM`. The sheet stays readable
//! for whoever moderates it, at the cost of sub-second precision.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

const WRITE_FORMAT: &str = "%-m/%-d/%Y %-I:%M:%S %p";
const READ_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

pub fn format(ts: DateTime<Utc>, offset: FixedOffset) -> String {
    ts.with_timezone(&offset).format(WRITE_FORMAT).to_string()
}

/// Also accepts RFC 3339, for cells typed in by hand.
pub fn parse(cell: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let cell = cell.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(cell) {
        return Some(ts.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(cell, READ_FORMAT)
        .ok()
        .and_then(|naive| naive.and_local_timezone(offset).single())
        .map(|ts| ts.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seoul() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    #[test]
    fn formats_in_local_time() {
        // 2023-04-15 03:00:00 UTC is noon in Seoul.
        let ts = DateTime::from_timestamp(1_681_527_600, 0).unwrap();
        assert_eq!(format(ts, seoul()), "4/15/2023 12:00:00 PM");
    }

    #[test]
    fn parses_what_it_writes() {
        let ts = DateTime::from_timestamp(1_694_000_123, 0).unwrap();
        assert_eq!(parse(&format(ts, seoul()), seoul()), Some(ts));
    }

    #[test]
    fn parses_padded_and_rfc3339_cells() {
        let expected = DateTime::from_timestamp(1_681_527_600, 0).unwrap();
        assert_eq!(parse("04/15/2023 12:00:00 PM", seoul()), Some(expected));
        assert_eq!(parse("2023-04-15T03:00:00Z", seoul()), Some(expected));
        assert_eq!(parse("next tuesday", seoul()), None);
        assert_eq!(parse("", seoul()), None);
    }
}
