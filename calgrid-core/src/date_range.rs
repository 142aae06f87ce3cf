//! Date and slot sets for the calendar views.
//!
//! Everything here is a pure function of its arguments: the grid is
//! recomputed on every navigation and must come out identical for the same
//! anchor date.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{CalGridError, CalGridResult};

/// Number of cells in a month grid (6 rows of 7 days).
pub const MONTH_GRID_DAYS: usize = 42;

pub const DEFAULT_START_HOUR: u32 = 8;
pub const DEFAULT_END_HOUR: u32 = 18;
pub const DEFAULT_STEP_MINUTES: u32 = 15;

/// Monday-first ISO week containing `date`.
pub fn week_of(date: NaiveDate) -> Vec<NaiveDate> {
    let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
    monday.iter_days().take(7).collect()
}

/// The 6x7 grid for the month containing `date`, Monday first, padded with
/// days from the neighbouring months.
pub fn month_grid(date: NaiveDate) -> Vec<NaiveDate> {
    let first = first_of_month(date);
    let grid_start = first - Duration::days(first.weekday().num_days_from_monday() as i64);
    grid_start.iter_days().take(MONTH_GRID_DAYS).collect()
}

/// Slot markers for one day of the given working window.
pub fn day_slots(start_hour: u32, end_hour: u32, step_minutes: u32) -> CalGridResult<Vec<TimeSlot>> {
    let window = SlotWindow::new(start_hour, end_hour, step_minutes)?;
    Ok(window.slots())
}

/// `floor(minutes_since_midnight / step)`.
pub fn slot_index_for(time: NaiveTime, step_minutes: u32) -> u32 {
    (time.hour() * 60 + time.minute()) / step_minutes.max(1)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    // Day 1 exists in every month
    date.with_day(1).unwrap_or(date)
}

fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

fn shift_month_preserving_day(current: NaiveDate, delta_months: i32) -> NaiveDate {
    let total_months = current.year() * 12 + (current.month() as i32 - 1) + delta_months;
    let year = total_months.div_euclid(12);
    let month = total_months.rem_euclid(12) as u32 + 1;
    let day = current.day().min(last_day_of_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(current)
}

/// A slot start marker within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSlot {
    /// `floor(minutes_since_midnight / step)`, comparable with [`slot_index_for`].
    pub index: u32,
    pub time: NaiveTime,
}

impl TimeSlot {
    pub fn is_hour_start(&self) -> bool {
        self.time.minute() == 0
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.time.format("%H:%M"))
    }
}

/// Visible working window for timed views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotWindow {
    pub start_hour: u32,
    pub end_hour: u32,
    pub step_minutes: u32,
}

impl Default for SlotWindow {
    fn default() -> Self {
        SlotWindow {
            start_hour: DEFAULT_START_HOUR,
            end_hour: DEFAULT_END_HOUR,
            step_minutes: DEFAULT_STEP_MINUTES,
        }
    }
}

impl SlotWindow {
    pub fn new(start_hour: u32, end_hour: u32, step_minutes: u32) -> CalGridResult<Self> {
        let window = SlotWindow {
            start_hour,
            end_hour,
            step_minutes,
        };
        window.validate()?;
        Ok(window)
    }

    pub fn validate(&self) -> CalGridResult<()> {
        if self.step_minutes == 0 || 60 % self.step_minutes != 0 {
            return Err(CalGridError::Config(format!(
                "slot step must divide an hour evenly, got {} minutes",
                self.step_minutes
            )));
        }
        if self.start_hour >= self.end_hour || self.end_hour > 24 {
            return Err(CalGridError::Config(format!(
                "invalid working window {}:00-{}:00",
                self.start_hour, self.end_hour
            )));
        }
        Ok(())
    }

    pub fn slots(&self) -> Vec<TimeSlot> {
        let step = self.step_minutes.max(1);
        (self.start_hour * 60..self.end_hour * 60)
            .step_by(step as usize)
            .filter_map(|minutes| {
                NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0).map(|time| TimeSlot {
                    index: minutes / step,
                    time,
                })
            })
            .collect()
    }

    pub fn slot_count(&self) -> u32 {
        (self.end_hour - self.start_hour) * 60 / self.step_minutes.max(1)
    }

    /// Window bounds on `day`. The end may fall on the next midnight.
    pub fn bounds_on(&self, day: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
        let midnight = day.and_time(NaiveTime::MIN);
        (
            midnight + Duration::hours(self.start_hour as i64),
            midnight + Duration::hours(self.end_hour as i64),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Day,
    #[default]
    Week,
    Month,
}

impl ViewMode {
    /// Dates rendered for this mode around `anchor`.
    pub fn visible_dates(self, anchor: NaiveDate) -> Vec<NaiveDate> {
        match self {
            ViewMode::Day => vec![anchor],
            ViewMode::Week => week_of(anchor),
            ViewMode::Month => month_grid(anchor),
        }
    }

    /// Move `anchor` one page in `direction`.
    pub fn navigate(self, anchor: NaiveDate, direction: Direction) -> NaiveDate {
        let sign = match direction {
            Direction::Previous => -1,
            Direction::Next => 1,
        };
        match self {
            ViewMode::Day => anchor + Duration::days(sign as i64),
            ViewMode::Week => anchor + Duration::weeks(sign as i64),
            ViewMode::Month => shift_month_preserving_day(anchor, sign),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ViewMode::Day => "day",
            ViewMode::Week => "week",
            ViewMode::Month => "month",
        };
        f.write_str(name)
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(ViewMode::Day),
            "week" => Ok(ViewMode::Week),
            "month" => Ok(ViewMode::Month),
            other => Err(format!("Unknown view mode '{}'. Expected day, week or month", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// Today's date on the local clock.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Inclusive range used when listing events from a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    /// From the first midnight to the last instant of the given days.
    pub fn covering(dates: &[NaiveDate]) -> Option<Self> {
        let first = dates.iter().min()?;
        let last = dates.iter().max()?;
        let end = last.and_hms_milli_opt(23, 59, 59, 999)?;
        Some(DateRange {
            start: first.and_time(NaiveTime::MIN),
            end,
        })
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.start && at <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} .. {}",
            self.start.format("%Y-%m-%d %H:%M"),
            self.end.format("%Y-%m-%d %H:%M")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_of_starts_monday() {
        // Sample a couple of years of anchors, including Sundays
        for anchor in date(2024, 1, 1).iter_days().take(800) {
            let week = week_of(anchor);
            assert_eq!(week.len(), 7);
            assert_eq!(week[0].weekday(), Weekday::Mon);
            assert!(week.contains(&anchor));
            for pair in week.windows(2) {
                assert_eq!(pair[1] - pair[0], Duration::days(1));
            }
        }
    }

    #[test]
    fn test_week_of_sunday_belongs_to_previous_monday() {
        let week = week_of(date(2025, 3, 23));
        assert_eq!(week[0], date(2025, 3, 17));
        assert_eq!(week[6], date(2025, 3, 23));
    }

    #[test]
    fn test_month_grid_covers_month_once() {
        for anchor in date(2024, 1, 15).iter_days().step_by(29).take(40) {
            let grid = month_grid(anchor);
            assert_eq!(grid.len(), MONTH_GRID_DAYS);
            assert_eq!(grid[0].weekday(), Weekday::Mon);
            for pair in grid.windows(2) {
                assert_eq!(pair[1] - pair[0], Duration::days(1));
            }

            let days_in_month = last_day_of_month(anchor.year(), anchor.month());
            let in_month = grid
                .iter()
                .filter(|d| d.year() == anchor.year() && d.month() == anchor.month())
                .count();
            assert_eq!(in_month as u32, days_in_month);
        }
    }

    #[test]
    fn test_month_grid_leading_days() {
        // March 2025 starts on a Saturday
        let grid = month_grid(date(2025, 3, 19));
        assert_eq!(grid[0], date(2025, 2, 24));
        assert_eq!(grid[5], date(2025, 3, 1));
        assert_eq!(grid[41], date(2025, 4, 6));
    }

    #[test]
    fn test_day_slots_default_window() {
        let slots = day_slots(8, 18, 15).unwrap();
        assert_eq!(slots.len(), 40);
        assert_eq!(slots[0].time, NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(slots[39].time, NaiveTime::from_hms_opt(17, 45, 0).unwrap());
        assert_eq!(slots[0].index, 32);
    }

    #[test]
    fn test_day_slots_full_day() {
        let slots = day_slots(0, 24, 30).unwrap();
        assert_eq!(slots.len(), 48);
        assert_eq!(slots[47].time, NaiveTime::from_hms_opt(23, 30, 0).unwrap());
    }

    #[test]
    fn test_day_slots_rejects_bad_windows() {
        assert!(day_slots(9, 9, 15).is_err());
        assert!(day_slots(8, 25, 15).is_err());
        assert!(day_slots(8, 18, 7).is_err());
        assert!(day_slots(8, 18, 0).is_err());
    }

    #[test]
    fn test_slot_index_floor() {
        let t = NaiveTime::from_hms_opt(10, 14, 59).unwrap();
        assert_eq!(slot_index_for(t, 15), 40);
        let t = NaiveTime::from_hms_opt(10, 15, 0).unwrap();
        assert_eq!(slot_index_for(t, 15), 41);
    }

    #[test]
    fn test_navigate_month_clamps_day() {
        let next = ViewMode::Month.navigate(date(2025, 1, 31), Direction::Next);
        assert_eq!(next, date(2025, 2, 28));
        let prev = ViewMode::Month.navigate(date(2025, 1, 15), Direction::Previous);
        assert_eq!(prev, date(2024, 12, 15));
    }

    #[test]
    fn test_navigate_week_and_day() {
        let anchor = date(2025, 3, 19);
        assert_eq!(ViewMode::Week.navigate(anchor, Direction::Next), date(2025, 3, 26));
        assert_eq!(ViewMode::Day.navigate(anchor, Direction::Previous), date(2025, 3, 18));
    }

    #[test]
    fn test_range_covering_is_inclusive() {
        let range = DateRange::covering(&week_of(date(2025, 3, 19))).unwrap();
        assert!(range.contains(date(2025, 3, 17).and_hms_opt(0, 0, 0).unwrap()));
        assert!(range.contains(date(2025, 3, 23).and_hms_opt(23, 59, 0).unwrap()));
        assert!(!range.contains(date(2025, 3, 24).and_hms_opt(0, 0, 0).unwrap()));
    }
}
