pub mod aggregate;
pub mod chart;
pub mod document;

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::{store::entities::SessionRecord, utils::time::DATE_FORMAT};

/// User-state export failures. Everything here is recoverable; the caller
/// surfaces the message and no file is written.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("no activity data available")]
    NoData,
    #[error("please enter both start and end dates")]
    MissingDate,
    #[error("invalid date {0:?}: use YYYY-MM-DD")]
    InvalidDate(String),
    #[error("no activity found between {start} and {end}")]
    EmptyRange { start: NaiveDate, end: NaiveDate },
    #[error("failed to write {path:?}")]
    Render {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

impl ExportError {
    /// Missing or malformed input rather than an empty result; the two map
    /// onto warning and informational feedback respectively.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::MissingDate | Self::InvalidDate(_))
    }
}

/// Parses a report boundary date, rejecting empty input and anything that is
/// not strictly `YYYY-MM-DD`.
pub fn parse_report_date(input: &str) -> Result<NaiveDate, ExportError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ExportError::MissingDate);
    }
    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .map_err(|_| ExportError::InvalidDate(input.to_string()))
}

/// Records whose start falls on a calendar day within [start, end]
/// inclusive. A reversed range simply matches nothing.
pub fn filter_by_date_range(
    records: &[SessionRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<&SessionRecord> {
    records
        .iter()
        .filter(|record| {
            let date = record.start_date();
            date >= start && date <= end
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{ExportError, filter_by_date_range, parse_report_date, test_support::record};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_strict_dates_only() {
        assert_eq!(parse_report_date("2024-01-15").unwrap(), day(2024, 1, 15));
        assert!(matches!(
            parse_report_date(""),
            Err(ExportError::MissingDate)
        ));
        assert!(matches!(
            parse_report_date("2024-13-01"),
            Err(ExportError::InvalidDate(_))
        ));
        assert!(matches!(
            parse_report_date("15/01/2024"),
            Err(ExportError::InvalidDate(_))
        ));
    }

    #[test]
    fn range_filter_is_inclusive_on_both_ends() {
        let records = vec![
            record("Study", (2024, 1, 1), (9, 0, 0), 1.0),
            record("Game", (2024, 1, 2), (9, 0, 0), 1.0),
            record("Study", (2024, 1, 3), (9, 0, 0), 1.0),
        ];

        let filtered = filter_by_date_range(&records, day(2024, 1, 1), day(2024, 1, 2));
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.start_date() <= day(2024, 1, 2)));
    }

    #[test]
    fn reversed_range_matches_nothing() {
        let records = vec![record("Study", (2024, 1, 2), (9, 0, 0), 1.0)];
        let filtered = filter_by_date_range(&records, day(2024, 1, 3), day(2024, 1, 1));
        assert!(filtered.is_empty());
    }
}
