use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::error::Result;
use crate::habits::HabitLog;
use crate::jalali::{self, JalaliDate};

/// One cell of a month grid. A cell with no `day_number` is leading or
/// trailing padding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub day_number:   Option<u32>,
    pub iso_date:     Option<String>,
    pub is_completed: bool,
    pub is_today:     bool,
}

impl CalendarDay {
    pub fn blank() -> Self {
        Self { day_number: None, iso_date: None, is_completed: false, is_today: false }
    }

    pub fn is_blank(&self) -> bool { self.day_number.is_none() }
}

/// A Jalali month laid out on a Saturday-first week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    pub year:              i32,
    pub month:             u32,
    /// 0 = Saturday … 6 = Friday.
    pub start_day_of_week: u32,
    pub days_in_month:     u32,
    /// `start_day_of_week` blanks followed by one cell per day.
    pub cells:             Vec<CalendarDay>,
}

impl MonthGrid {
    /// Rows of 7 cells; the last row is padded with blanks.
    pub fn weeks(&self) -> Vec<Vec<CalendarDay>> {
        let mut weeks: Vec<Vec<CalendarDay>> = Vec::new();
        for chunk in self.cells.chunks(7) {
            let mut week = chunk.to_vec();
            while week.len() < 7 { week.push(CalendarDay::blank()); }
            weeks.push(week);
        }
        weeks
    }

    pub fn day(&self, day: u32) -> Option<&CalendarDay> {
        if day == 0 || day > self.days_in_month { return None; }
        self.cells.get((self.start_day_of_week + day - 1) as usize)
    }

    pub fn completed_days(&self) -> usize {
        self.cells.iter().filter(|c| c.is_completed).count()
    }
}

/// Builds the grid for Jalali `year`/`month`, marking days found completed in
/// `logs` and the cell matching `today` (a Gregorian local date).
pub fn month_grid(year: i32, month: u32, logs: &[HabitLog], today: NaiveDate) -> Result<MonthGrid> {
    let days_in_month     = jalali::month_length(year, month)?;
    let start_day_of_week = start_day_of_week(year, month)?;
    let today_j           = jalali::from_naive(today);

    let mut cells = Vec::with_capacity((start_day_of_week + days_in_month) as usize);
    for _ in 0..start_day_of_week { cells.push(CalendarDay::blank()); }

    for d in 1..=days_in_month {
        let iso = jalali::to_gregorian_unchecked(year, month, d).to_iso();
        let is_completed = logs.iter().any(|l| l.date == iso && l.completed);
        let is_today = today_j == JalaliDate { year, month, day: d };
        cells.push(CalendarDay {
            day_number: Some(d),
            iso_date:   Some(iso),
            is_completed,
            is_today,
        });
    }

    Ok(MonthGrid { year, month, start_day_of_week, days_in_month, cells })
}

/// Weekday of the 1st of a Jalali month, 0 = Saturday … 6 = Friday.
pub fn start_day_of_week(year: i32, month: u32) -> Result<u32> {
    let first = jalali::to_gregorian(JalaliDate { year, month, day: 1 })?;
    Ok(saturday_index(NaiveDate::try_from(first)?))
}

/// Remaps chrono's Sunday-based weekday so the week starts on Saturday.
pub fn saturday_index(date: NaiveDate) -> u32 {
    (date.weekday().num_days_from_sunday() + 1) % 7
}

// ─── Month navigation ─────────────────────────────────────────────────────────

/// The Jalali month currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCursor {
    pub year:  i32,
    pub month: u32,
}

impl MonthCursor {
    pub fn containing(date: NaiveDate) -> Self {
        let j = jalali::from_naive(date);
        Self { year: j.year, month: j.month }
    }

    pub fn next(self) -> Self {
        if self.month == 12 { Self { year: self.year + 1, month: 1 } }
        else                { Self { year: self.year, month: self.month + 1 } }
    }

    pub fn prev(self) -> Self {
        if self.month == 1 { Self { year: self.year - 1, month: 12 } }
        else               { Self { year: self.year, month: self.month - 1 } }
    }

    pub fn grid(&self, logs: &[HabitLog], today: NaiveDate) -> Result<MonthGrid> {
        month_grid(self.year, self.month, logs, today)
    }
}
