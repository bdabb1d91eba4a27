//! Calendar-month intervals and month-by-month navigation.
//!
//! Months start at local midnight on the 1st in the configured time zone and
//! are stored as UTC instants. Interval ends come from calendar arithmetic
//! (the 1st of the following month), never from a fixed day count.

use chrono::{DateTime, Datelike, Duration, Month, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::{EngineError, ResultEngine};

/// Half-open interval `[start, end)` covering one calendar month.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MonthInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MonthInterval {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

/// A month selected relative to the month of a reference instant.
///
/// Offset `0` is the reference month, `-1` the one before, and so on. The
/// offset is not bounded; only months chrono cannot represent are rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonthCursor {
    timezone: Tz,
    year: i32,
    month: u32,
    offset: i64,
}

impl MonthCursor {
    /// Anchors the cursor on the month `now` falls in, as seen in `timezone`.
    pub fn new(now: DateTime<Utc>, timezone: Tz) -> Self {
        let local = now.with_timezone(&timezone);
        Self {
            timezone,
            year: local.year(),
            month: local.month(),
            offset: 0,
        }
    }

    /// Starts the cursor `offset` months away from the anchor month.
    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn prev(&mut self) {
        self.offset = self.offset.saturating_sub(1);
    }

    pub fn next(&mut self) {
        self.offset = self.offset.saturating_add(1);
    }

    /// Interval of the currently selected month.
    pub fn interval(&self) -> ResultEngine<MonthInterval> {
        self.compute_interval(self.offset)
    }

    /// Interval of the month `offset` months away from the anchor month.
    pub fn compute_interval(&self, offset: i64) -> ResultEngine<MonthInterval> {
        let (year, month) = shift_month(self.year, self.month, offset)?;
        let (next_year, next_month) = shift_month(year, month, 1)?;
        Ok(MonthInterval {
            start: first_instant(&self.timezone, year, month)?,
            end: first_instant(&self.timezone, next_year, next_month)?,
        })
    }

    /// Human readable name of the selected month, e.g. "March 2025".
    pub fn label(&self) -> ResultEngine<String> {
        let (year, month) = shift_month(self.year, self.month, self.offset)?;
        let name = u8::try_from(month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name())
            .ok_or_else(|| EngineError::InvalidRange(format!("invalid month {month}")))?;
        Ok(format!("{name} {year}"))
    }
}

/// Moves `(year, month)` by `offset` months, rolling the year over as needed.
fn shift_month(year: i32, month: u32, offset: i64) -> ResultEngine<(i32, u32)> {
    let out_of_range = || EngineError::InvalidRange(format!("month offset {offset} is out of range"));

    let index = i64::from(year)
        .checked_mul(12)
        .and_then(|i| i.checked_add(i64::from(month) - 1))
        .and_then(|i| i.checked_add(offset))
        .ok_or_else(out_of_range)?;
    let shifted_year = i32::try_from(index.div_euclid(12)).map_err(|_| out_of_range())?;
    let shifted_month = index.rem_euclid(12) as u32 + 1;
    Ok((shifted_year, shifted_month))
}

fn first_instant(timezone: &Tz, year: i32, month: u32) -> ResultEngine<DateTime<Utc>> {
    let date = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        EngineError::InvalidRange(format!("{year}-{month:02} is outside the calendar"))
    })?;
    local_midnight(timezone, date)
}

/// First instant of `date` in `timezone`, as UTC.
pub fn local_midnight(timezone: &Tz, date: NaiveDate) -> ResultEngine<DateTime<Utc>> {
    let midnight = date.and_time(NaiveTime::MIN);
    let local = timezone
        .from_local_datetime(&midnight)
        .earliest()
        // Midnight skipped by a DST jump: the day starts when the gap ends.
        .or_else(|| {
            timezone
                .from_local_datetime(&(midnight + Duration::hours(1)))
                .earliest()
        })
        .ok_or_else(|| EngineError::InvalidRange(format!("{date} has no local midnight")))?;
    Ok(local.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use chrono_tz::{America::Toronto, UTC};

    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn current_month_is_half_open() {
        let cursor = MonthCursor::new(utc(2025, 3, 17, 12), UTC);
        let interval = cursor.interval().unwrap();
        assert_eq!(interval.start, utc(2025, 3, 1, 0));
        assert_eq!(interval.end, utc(2025, 4, 1, 0));
        assert!(interval.contains(interval.start));
        assert!(!interval.contains(interval.end));
        assert_eq!(cursor.label().unwrap(), "March 2025");
    }

    #[test]
    fn year_rolls_over_in_both_directions() {
        let cursor = MonthCursor::new(utc(2025, 1, 10, 0), UTC);
        let december = cursor.compute_interval(-1).unwrap();
        assert_eq!(december.start, utc(2024, 12, 1, 0));
        assert_eq!(december.end, utc(2025, 1, 1, 0));

        let cursor = MonthCursor::new(utc(2025, 12, 10, 0), UTC);
        let january = cursor.compute_interval(1).unwrap();
        assert_eq!(january.start, utc(2026, 1, 1, 0));
        assert_eq!(january.end, utc(2026, 2, 1, 0));

        let far_back = cursor.compute_interval(-25).unwrap();
        assert_eq!(far_back.start, utc(2023, 11, 1, 0));
    }

    #[test]
    fn month_lengths_follow_the_calendar() {
        let cursor = MonthCursor::new(utc(2024, 2, 29, 23), UTC);
        let leap_feb = cursor.interval().unwrap();
        assert_eq!(leap_feb.end - leap_feb.start, Duration::days(29));

        let feb = cursor.compute_interval(12).unwrap();
        assert_eq!(feb.end - feb.start, Duration::days(28));

        let april = cursor.compute_interval(2).unwrap();
        assert_eq!(april.end - april.start, Duration::days(30));
    }

    #[test]
    fn local_midnight_is_used_for_boundaries() {
        // 2025-03-01 02:00 UTC is still February in Toronto.
        let cursor = MonthCursor::new(utc(2025, 3, 1, 2), Toronto);
        assert_eq!(cursor.label().unwrap(), "February 2025");
        let interval = cursor.interval().unwrap();
        assert_eq!(interval.start, utc(2025, 2, 1, 5));
        assert_eq!(interval.end, utc(2025, 3, 1, 5));

        // DST starts on 2025-03-09, so April begins at UTC-4.
        let march = cursor.compute_interval(1).unwrap();
        assert_eq!(march.end, utc(2025, 4, 1, 4));
    }

    #[test]
    fn local_midnight_converts_to_utc() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 4).unwrap();
        assert_eq!(local_midnight(&Toronto, date).unwrap(), utc(2025, 7, 4, 4));
        assert_eq!(local_midnight(&UTC, date).unwrap(), utc(2025, 7, 4, 0));
    }

    #[test]
    fn prev_and_next_are_inverse() {
        let mut cursor = MonthCursor::new(utc(2025, 3, 17, 12), UTC).with_offset(-3);
        let original = cursor.interval().unwrap();

        cursor.prev();
        assert_eq!(cursor.offset(), -4);
        assert_ne!(cursor.interval().unwrap(), original);
        cursor.next();
        assert_eq!(cursor.interval().unwrap(), original);

        cursor.next();
        cursor.prev();
        assert_eq!(cursor.interval().unwrap(), original);
    }

    #[test]
    fn unrepresentable_months_are_errors() {
        let cursor = MonthCursor::new(utc(2025, 3, 17, 12), UTC);
        assert!(matches!(
            cursor.compute_interval(i64::MAX),
            Err(EngineError::InvalidRange(_))
        ));
        assert!(matches!(
            cursor.compute_interval(-12 * 1_000_000),
            Err(EngineError::InvalidRange(_))
        ));
    }
}
