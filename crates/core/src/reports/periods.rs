//! Date column generation.

use chrono::{Datelike, NaiveDate};

use super::types::{DatePeriod, PeriodUnit};

/// Splits an inclusive date range into consecutive calendar periods.
///
/// The first and last periods are clipped to the range, so a range starting mid-month yields a
/// partial first month. Returns an empty list if `from` is after `to`.
#[must_use]
pub fn date_periods(from: NaiveDate, to: NaiveDate, unit: PeriodUnit) -> Vec<DatePeriod> {
    let mut periods = Vec::new();
    let mut start = from;

    while start <= to {
        let end = unit_end(start, unit).min(to);
        periods.push(DatePeriod {
            start,
            end,
            label: label(start, unit),
        });
        match end.succ_opt() {
            Some(next) => start = next,
            None => break,
        }
    }

    periods
}

/// Number of columns [`date_periods`] would produce, without building them.
#[must_use]
pub fn period_count(from: NaiveDate, to: NaiveDate, unit: PeriodUnit) -> usize {
    if from > to {
        return 0;
    }
    let months = |d: NaiveDate| i64::from(d.year()) * 12 + i64::from(d.month0());
    let count = match unit {
        PeriodUnit::Day => (to - from).num_days() + 1,
        PeriodUnit::Month => months(to) - months(from) + 1,
        PeriodUnit::Quarter => months(to) / 3 - months(from) / 3 + 1,
        PeriodUnit::Year => i64::from(to.year()) - i64::from(from.year()) + 1,
    };
    usize::try_from(count).unwrap_or(usize::MAX)
}

fn unit_end(date: NaiveDate, unit: PeriodUnit) -> NaiveDate {
    match unit {
        PeriodUnit::Day => date,
        PeriodUnit::Month => month_end(date.year(), date.month()),
        PeriodUnit::Quarter => month_end(date.year(), date.month0() / 3 * 3 + 3),
        PeriodUnit::Year => month_end(date.year(), 12),
    }
}

fn month_end(year: i32, month: u32) -> NaiveDate {
    let next_month_start = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next_month_start
        .and_then(|d| d.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

fn label(start: NaiveDate, unit: PeriodUnit) -> String {
    match unit {
        PeriodUnit::Day => start.format("%Y-%m-%d").to_string(),
        PeriodUnit::Month => start.format("%Y-%m").to_string(),
        PeriodUnit::Quarter => format!("{}-Q{}", start.year(), start.month0() / 3 + 1),
        PeriodUnit::Year => start.year().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_months_are_clipped_to_range() {
        let periods = date_periods(date(2024, 1, 15), date(2024, 3, 10), PeriodUnit::Month);
        let bounds: Vec<_> = periods.iter().map(|p| (p.start, p.end)).collect();
        assert_eq!(
            bounds,
            vec![
                (date(2024, 1, 15), date(2024, 1, 31)),
                (date(2024, 2, 1), date(2024, 2, 29)),
                (date(2024, 3, 1), date(2024, 3, 10)),
            ]
        );
        assert_eq!(periods[1].label, "2024-02");
    }

    #[test]
    fn test_quarters_cross_year_end() {
        let periods = date_periods(date(2023, 11, 1), date(2024, 4, 30), PeriodUnit::Quarter);
        let labels: Vec<_> = periods.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["2023-Q4", "2024-Q1", "2024-Q2"]);
        assert_eq!(periods[0].end, date(2023, 12, 31));
        assert_eq!(periods[1].end, date(2024, 3, 31));
        assert_eq!(periods[2].end, date(2024, 4, 30));
    }

    #[test]
    fn test_days_and_years() {
        assert_eq!(
            date_periods(date(2024, 2, 28), date(2024, 3, 1), PeriodUnit::Day).len(),
            3
        );
        let years = date_periods(date(2022, 6, 1), date(2024, 1, 1), PeriodUnit::Year);
        assert_eq!(years.len(), 3);
        assert_eq!(years[2].start, date(2024, 1, 1));
        assert_eq!(years[2].end, date(2024, 1, 1));
    }

    #[test]
    fn test_period_count_matches_generation() {
        let from = date(2023, 5, 17);
        let to = date(2025, 2, 3);
        for unit in [PeriodUnit::Day, PeriodUnit::Month, PeriodUnit::Quarter, PeriodUnit::Year] {
            assert_eq!(period_count(from, to, unit), date_periods(from, to, unit).len());
        }
        assert_eq!(period_count(to, from, PeriodUnit::Month), 0);
    }

    #[test]
    fn test_empty_when_reversed() {
        assert!(date_periods(date(2024, 2, 1), date(2024, 1, 1), PeriodUnit::Month).is_empty());
    }
}
