//! Working-day calendar arithmetic.
//!
//! Schedules compute in working-day offsets; the calendar maps offsets to
//! civil dates only at the reporting edge.

use std::collections::BTreeSet;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Calendar constraints: which weekdays count as working days, plus an
/// explicit holiday set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    /// Indexed by `Weekday::num_days_from_monday()`.
    working_weekdays: [bool; 7],
    holidays: BTreeSet<NaiveDate>,
}

impl Calendar {
    /// Monday–Friday working week, no holidays.
    pub fn standard() -> Self {
        Self {
            working_weekdays: [true, true, true, true, true, false, false],
            holidays: BTreeSet::new(),
        }
    }

    /// Calendar with an explicit working-weekday set.
    ///
    /// An empty set is rejected: offset arithmetic would never terminate.
    pub fn new(weekdays: &[Weekday]) -> EngineResult<Self> {
        if weekdays.is_empty() {
            return Err(EngineError::validation(
                "calendar needs at least one working weekday",
            ));
        }
        let mut mask = [false; 7];
        for day in weekdays {
            mask[day.num_days_from_monday() as usize] = true;
        }
        Ok(Self {
            working_weekdays: mask,
            holidays: BTreeSet::new(),
        })
    }

    pub fn with_holidays(mut self, holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.holidays = holidays.into_iter().collect();
        self
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        self.working_weekdays[date.weekday().num_days_from_monday() as usize]
            && !self.holidays.contains(&date)
    }

    /// The `offset`-th working day on or after `start` (offset 0 = the first
    /// working day at or after `start`).
    pub fn date_at(&self, start: NaiveDate, offset: u32) -> NaiveDate {
        let mut date = start;
        while !self.is_working_day(date) {
            date = date + Days::new(1);
        }
        let mut remaining = offset;
        while remaining > 0 {
            date = date + Days::new(1);
            if self.is_working_day(date) {
                remaining -= 1;
            }
        }
        date
    }

    /// Count of working days in the half-open range `[from, to)`.
    pub fn working_days_between(&self, from: NaiveDate, to: NaiveDate) -> u32 {
        if to <= from {
            return 0;
        }
        let mut count = 0;
        let mut date = from;
        while date < to {
            if self.is_working_day(date) {
                count += 1;
            }
            date = date + Days::new(1);
        }
        count
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn offsets_skip_weekends() {
        let cal = Calendar::standard();
        // 2026-08-07 is a Friday; the next working day is Monday the 10th.
        assert_eq!(cal.date_at(date(2026, 8, 7), 0), date(2026, 8, 7));
        assert_eq!(cal.date_at(date(2026, 8, 7), 1), date(2026, 8, 10));
        // Starting on a Saturday snaps forward to Monday.
        assert_eq!(cal.date_at(date(2026, 8, 8), 0), date(2026, 8, 10));
    }

    #[test]
    fn holidays_are_skipped() {
        let cal = Calendar::standard().with_holidays([date(2026, 8, 10)]);
        assert_eq!(cal.date_at(date(2026, 8, 7), 1), date(2026, 8, 11));
    }

    #[test]
    fn working_days_between_counts_half_open_range() {
        let cal = Calendar::standard();
        // Mon 2026-08-03 .. Mon 2026-08-10: one full working week.
        assert_eq!(cal.working_days_between(date(2026, 8, 3), date(2026, 8, 10)), 5);
        assert_eq!(cal.working_days_between(date(2026, 8, 10), date(2026, 8, 3)), 0);
    }

    #[test]
    fn empty_weekday_set_is_rejected() {
        assert!(matches!(
            Calendar::new(&[]),
            Err(EngineError::Validation(_))
        ));
    }
}
