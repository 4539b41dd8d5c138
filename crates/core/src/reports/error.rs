//! Report error types.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// Invalid date range.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// The date-period breakdown would produce too many columns.
    #[error("Too many date columns: {count} (maximum {max})")]
    TooManyColumns {
        /// Columns the query would produce.
        count: usize,
        /// Allowed maximum.
        max: usize,
    },
}
