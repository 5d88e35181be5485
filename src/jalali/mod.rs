//! Jalali (Persian solar hijri) ↔ Gregorian conversion.
//!
//! Day-counting conversion between the two calendars, anchored on two epochs:
//! one for dates up to Gregorian 1600 / Jalali 979 and one after. Conversions
//! are exact inverses from Gregorian 1601-03-21 (Jalali 980-01-01) onward.
//! The checked API rejects earlier dates with `YearOutOfRange`; the
//! `_unchecked` functions still run them through the approximate early epoch.
//!
//! The length of Esfand is never derived from a closed-form leap rule. It is
//! measured as the day span between two consecutive Jalali new years.
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CalendarError, Result};

// ─── Epochs ───────────────────────────────────────────────────────────────────

/// A pair of years that line up at the start of a conversion era.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Epoch {
    pub gregorian: i64,
    pub jalali:    i64,
}

/// Anchor for Gregorian years up to 1600 (Jalali years up to 979).
pub const EARLY_EPOCH: Epoch = Epoch { gregorian: 621, jalali: 0 };
/// Anchor for Gregorian years after 1600 (Jalali years after 979).
pub const LATE_EPOCH: Epoch = Epoch { gregorian: 1600, jalali: 979 };

/// First Gregorian date from which both conversions round-trip exactly.
pub const FIRST_EXACT_GREGORIAN: GregorianDate = GregorianDate { year: 1601, month: 3, day: 21 };
/// Jalali equivalent of [`FIRST_EXACT_GREGORIAN`].
pub const FIRST_EXACT_JALALI: JalaliDate = JalaliDate { year: 980, month: 1, day: 1 };

const GREGORIAN_DAYS_BEFORE_MONTH: [i64; 12] =
    [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

// Shifts the Gregorian day count so that day 0 is 1 Farvardin.
const NEW_YEAR_SHIFT: i64 = -80;
const JALALI_DAY_COUNT_SHIFT: i64 = 78;

const JALALI_33_YEAR_DAYS:    i64 = 12_053;
const FOUR_YEAR_DAYS:         i64 = 1_461;
const GREGORIAN_400_YEAR_DAYS: i64 = 146_097;
const GREGORIAN_100_YEAR_DAYS: i64 = 36_524;

// Day offset of 1 Mehr: six 31-day months.
const FIRST_HALF_DAYS: i64 = 186;

// ─── Date values ──────────────────────────────────────────────────────────────

/// A proleptic Gregorian civil date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GregorianDate {
    pub year:  i32,
    pub month: u32,
    pub day:   u32,
}

/// A date in the Persian solar hijri calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JalaliDate {
    pub year:  i32,
    pub month: u32,
    pub day:   u32,
}

impl GregorianDate {
    /// Builds a validated Gregorian date.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self> {
        let date = Self { year, month, day };
        date.validate()?;
        Ok(date)
    }

    /// Checks the date is real and no earlier than [`FIRST_EXACT_GREGORIAN`].
    pub fn validate(&self) -> Result<()> {
        self.check_civil()?;
        if *self < FIRST_EXACT_GREGORIAN {
            return Err(CalendarError::YearOutOfRange { year: self.year });
        }
        Ok(())
    }

    /// Month and day checks only, for any year.
    fn check_civil(&self) -> Result<()> {
        check_month(self.month)?;
        let max = gregorian_month_length(self.year as i64, self.month);
        if self.day == 0 || self.day > max {
            return Err(CalendarError::DayOutOfRange {
                year: self.year, month: self.month, day: self.day, max,
            });
        }
        Ok(())
    }

    /// Parses a zero-padded `YYYY-MM-DD` string.
    pub fn parse_iso(s: &str) -> Result<Self> {
        let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|_| CalendarError::InvalidIsoDate(s.to_owned()))?;
        Ok(Self::from(date))
    }

    /// `YYYY-MM-DD`, zero-padded. This is the key habit logs are stored under.
    pub fn to_iso(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }

    pub fn to_jalali(&self) -> Result<JalaliDate> { to_jalali(*self) }

    pub fn today() -> Self { Self::from(Local::now().date_naive()) }
}

impl JalaliDate {
    /// Builds a validated Jalali date.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self> {
        let date = Self { year, month, day };
        date.validate()?;
        Ok(date)
    }

    pub fn validate(&self) -> Result<()> {
        check_year(self.year)?;
        let max = month_length(self.year, self.month)?;
        if self.day == 0 || self.day > max {
            return Err(CalendarError::DayOutOfRange {
                year: self.year, month: self.month, day: self.day, max,
            });
        }
        Ok(())
    }

    /// Parses `YYYY-MM-DD` or `YYYY/MM/DD` as a Jalali date.
    pub fn parse(s: &str) -> Result<Self> {
        let bad = || CalendarError::InvalidIsoDate(s.to_owned());
        let parts: Vec<&str> = s.trim().split(['-', '/']).collect();
        let [y, m, d] = parts.as_slice() else { return Err(bad()) };
        let year  = y.parse().map_err(|_| bad())?;
        let month = m.parse().map_err(|_| bad())?;
        let day   = d.parse().map_err(|_| bad())?;
        Self::new(year, month, day)
    }

    pub fn to_gregorian(&self) -> Result<GregorianDate> { to_gregorian(*self) }

    /// ISO string of the Gregorian equivalent.
    pub fn to_iso(&self) -> Result<String> { Ok(self.to_gregorian()?.to_iso()) }

    pub fn today() -> Self { from_naive(Local::now().date_naive()) }
}

impl fmt::Display for GregorianDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso())
    }
}

impl fmt::Display for JalaliDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}/{:02}/{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for GregorianDate {
    type Err = CalendarError;
    fn from_str(s: &str) -> Result<Self> { Self::parse_iso(s) }
}

impl FromStr for JalaliDate {
    type Err = CalendarError;
    fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl From<NaiveDate> for GregorianDate {
    fn from(d: NaiveDate) -> Self {
        Self { year: d.year(), month: d.month(), day: d.day() }
    }
}

impl TryFrom<GregorianDate> for NaiveDate {
    type Error = CalendarError;
    fn try_from(g: GregorianDate) -> Result<Self> {
        g.check_civil()?;
        NaiveDate::from_ymd_opt(g.year, g.month, g.day)
            .ok_or(CalendarError::YearOutOfRange { year: g.year })
    }
}

// ─── Conversions ──────────────────────────────────────────────────────────────

/// Gregorian → Jalali, validating the input first.
pub fn to_jalali(date: GregorianDate) -> Result<JalaliDate> {
    date.validate()?;
    Ok(to_jalali_unchecked(date.year, date.month, date.day))
}

/// Jalali → Gregorian, validating the input first.
pub fn to_gregorian(date: JalaliDate) -> Result<GregorianDate> {
    date.validate()?;
    Ok(to_gregorian_unchecked(date.year, date.month, date.day))
}

/// Jalali equivalent of a chrono date, through the raw arithmetic. Dates
/// before [`FIRST_EXACT_GREGORIAN`] come out approximate.
pub fn from_naive(date: NaiveDate) -> JalaliDate {
    to_jalali_unchecked(date.year(), date.month(), date.day())
}

/// ISO string of the Gregorian day matching a Jalali date.
pub fn jalali_to_iso(year: i32, month: u32, day: u32) -> Result<String> {
    JalaliDate::new(year, month, day)?.to_iso()
}

/// Raw Gregorian → Jalali day-counting conversion.
///
/// Does not validate its input: an impossible day produces an impossible
/// answer.
///
/// # Panics
///
/// Panics if `month` is not in `1..=12`.
pub fn to_jalali_unchecked(year: i32, month: u32, day: u32) -> JalaliDate {
    let epoch = if year as i64 <= LATE_EPOCH.gregorian { EARLY_EPOCH } else { LATE_EPOCH };
    let mut jy = epoch.jalali;
    let gy     = year as i64 - epoch.gregorian;

    // Leap days are counted through the end of February of the target year.
    let gy2 = if month > 2 { gy + 1 } else { gy };
    let mut days = 365 * gy
        + (gy2 + 3).div_euclid(4)
        - (gy2 + 99).div_euclid(100)
        + (gy2 + 399).div_euclid(400)
        + NEW_YEAR_SHIFT
        + day as i64
        + GREGORIAN_DAYS_BEFORE_MONTH[month as usize - 1];

    jy  += 33 * days.div_euclid(JALALI_33_YEAR_DAYS);
    days = days.rem_euclid(JALALI_33_YEAR_DAYS);
    jy  += 4 * (days / FOUR_YEAR_DAYS);
    days %= FOUR_YEAR_DAYS;
    if days > 365 {
        jy  += (days - 1) / 365;
        days = (days - 1) % 365;
    }

    let (jm, jd) = if days < FIRST_HALF_DAYS {
        (1 + days / 31, 1 + days % 31)
    } else {
        let rest = days - FIRST_HALF_DAYS;
        (7 + rest / 30, 1 + rest % 30)
    };

    JalaliDate { year: jy as i32, month: jm as u32, day: jd as u32 }
}

/// Raw Jalali → Gregorian day-counting conversion. Does not validate its input.
pub fn to_gregorian_unchecked(year: i32, month: u32, day: u32) -> GregorianDate {
    let epoch  = if year as i64 <= LATE_EPOCH.jalali { EARLY_EPOCH } else { LATE_EPOCH };
    let mut gy = epoch.gregorian;
    let jy     = year as i64 - epoch.jalali;
    let jm     = month as i64;

    let month_offset = if jm < 7 { (jm - 1) * 31 } else { (jm - 7) * 30 + FIRST_HALF_DAYS };
    let mut days = 365 * jy
        + jy.div_euclid(33) * 8
        + (jy.rem_euclid(33) + 3) / 4
        + JALALI_DAY_COUNT_SHIFT
        + day as i64
        + month_offset;

    gy  += 400 * days.div_euclid(GREGORIAN_400_YEAR_DAYS);
    days = days.rem_euclid(GREGORIAN_400_YEAR_DAYS);
    if days > GREGORIAN_100_YEAR_DAYS {
        // The first century of a 400-year cycle is one day longer.
        days -= 1;
        gy  += 100 * (days / GREGORIAN_100_YEAR_DAYS);
        days %= GREGORIAN_100_YEAR_DAYS;
        if days >= 365 {
            days += 1;
        }
    }
    gy  += 4 * (days / FOUR_YEAR_DAYS);
    days %= FOUR_YEAR_DAYS;
    if days > 365 {
        gy  += (days - 1) / 365;
        days = (days - 1) % 365;
    }

    let mut gd = days + 1;
    let mut gm = 1u32;
    for len in 1..=12 {
        let len = gregorian_month_length(gy, len) as i64;
        if gd <= len {
            break;
        }
        gd -= len;
        gm += 1;
    }

    GregorianDate { year: gy as i32, month: gm, day: gd as u32 }
}

// ─── Month and year lengths ───────────────────────────────────────────────────

/// Number of days in a Jalali month: 31, 30, or 29/30 for Esfand.
pub fn month_length(year: i32, month: u32) -> Result<u32> {
    check_year(year)?;
    match month {
        1..=6  => Ok(31),
        7..=11 => Ok(30),
        12     => Ok(if is_leap_year(year)? { 30 } else { 29 }),
        _      => Err(CalendarError::MonthOutOfRange { month }),
    }
}

/// Days between 1 Farvardin of `year` and 1 Farvardin of `year + 1`.
pub fn year_length(year: i32) -> Result<u32> {
    check_year(year)?;
    let out_of_range = move |_: CalendarError| CalendarError::YearOutOfRange { year };
    let next_year    = year.checked_add(1).ok_or(CalendarError::YearOutOfRange { year })?;
    let this = NaiveDate::try_from(to_gregorian_unchecked(year, 1, 1)).map_err(out_of_range)?;
    let next = NaiveDate::try_from(to_gregorian_unchecked(next_year, 1, 1)).map_err(out_of_range)?;
    Ok((next - this).num_days() as u32)
}

pub fn is_leap_year(year: i32) -> Result<bool> {
    Ok(year_length(year)? == 366)
}

/// True when 30 Esfand of `year` lands on 1 Farvardin of the next year after a
/// round trip, meaning Esfand has 29 days. Must agree with [`is_leap_year`].
pub fn esfand_overflows(year: i32) -> bool {
    let g = to_gregorian_unchecked(year, 12, 30);
    to_jalali_unchecked(g.year, g.month, g.day) == JalaliDate { year: year + 1, month: 1, day: 1 }
}

/// Gregorian month length under the 4/100/400 leap rule.
fn gregorian_month_length(year: i64, month: u32) -> u32 {
    match month {
        2 if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 => 29,
        2                  => 28,
        4 | 6 | 9 | 11     => 30,
        _                  => 31,
    }
}

fn check_month(month: u32) -> Result<()> {
    if (1..=12).contains(&month) { Ok(()) } else { Err(CalendarError::MonthOutOfRange { month }) }
}

/// Jalali years before [`FIRST_EXACT_JALALI`] only convert approximately.
fn check_year(year: i32) -> Result<()> {
    if year >= FIRST_EXACT_JALALI.year { Ok(()) } else { Err(CalendarError::YearOutOfRange { year }) }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn g(year: i32, month: u32, day: u32) -> GregorianDate { GregorianDate { year, month, day } }
    fn j(year: i32, month: u32, day: u32) -> JalaliDate { JalaliDate { year, month, day } }

    #[test]
    fn nowruz_1403() {
        assert_eq!(to_jalali(g(2024, 3, 20)).unwrap(), j(1403, 1, 1));
        assert_eq!(to_gregorian(j(1403, 1, 1)).unwrap(), g(2024, 3, 20));
    }

    #[test]
    fn known_dates() {
        assert_eq!(to_jalali(g(2025, 3, 21)).unwrap(), j(1404, 1, 1));
        assert_eq!(to_jalali(g(2000, 1, 1)).unwrap(), j(1378, 10, 11));
        assert_eq!(to_jalali(g(1979, 2, 11)).unwrap(), j(1357, 11, 22));
        assert_eq!(to_gregorian(j(1399, 12, 30)).unwrap(), g(2021, 3, 20));
        assert_eq!(to_gregorian(j(1403, 12, 30)).unwrap(), g(2025, 3, 20));
        assert_eq!(to_jalali(FIRST_EXACT_GREGORIAN).unwrap(), FIRST_EXACT_JALALI);
    }

    #[test]
    fn esfand_lengths() {
        assert_eq!(month_length(1403, 12).unwrap(), 30);
        assert_eq!(month_length(1404, 12).unwrap(), 29);
        assert_eq!(month_length(1399, 12).unwrap(), 30);
        assert_eq!(month_length(1400, 12).unwrap(), 29);
    }

    #[test]
    fn fixed_month_lengths() {
        for m in 1..=6 { assert_eq!(month_length(1402, m).unwrap(), 31); }
        for m in 7..=11 { assert_eq!(month_length(1402, m).unwrap(), 30); }
    }

    #[test]
    fn leap_years_around_today() {
        let leaps: Vec<i32> = (1390..=1420).filter(|&y| is_leap_year(y).unwrap()).collect();
        assert_eq!(leaps, vec![1391, 1395, 1399, 1403, 1408, 1412, 1416, 1420]);
    }

    #[test]
    fn both_leap_checks_agree() {
        for year in FIRST_EXACT_JALALI.year..=2300 {
            assert_eq!(
                esfand_overflows(year),
                !is_leap_year(year).unwrap(),
                "leap checks disagree for {year}",
            );
        }
    }

    #[test]
    fn month_out_of_range_is_rejected() {
        assert_eq!(month_length(1403, 13), Err(CalendarError::MonthOutOfRange { month: 13 }));
        assert_eq!(to_jalali(g(2024, 0, 1)), Err(CalendarError::MonthOutOfRange { month: 0 }));
        assert!(matches!(to_gregorian(j(1403, 13, 1)), Err(CalendarError::MonthOutOfRange { .. })));
    }

    #[test]
    fn day_out_of_range_is_rejected() {
        assert_eq!(
            to_gregorian(j(1404, 12, 30)),
            Err(CalendarError::DayOutOfRange { year: 1404, month: 12, day: 30, max: 29 }),
        );
        assert!(matches!(to_jalali(g(2023, 2, 29)), Err(CalendarError::DayOutOfRange { max: 28, .. })));
        assert!(matches!(to_jalali(g(2024, 4, 0)), Err(CalendarError::DayOutOfRange { .. })));
        assert!(to_jalali(g(2024, 2, 29)).is_ok());
    }

    #[test]
    fn dates_before_exact_range_are_rejected() {
        assert_eq!(to_gregorian(j(0, 1, 1)), Err(CalendarError::YearOutOfRange { year: 0 }));
        assert_eq!(to_gregorian(j(979, 12, 29)), Err(CalendarError::YearOutOfRange { year: 979 }));
        assert_eq!(to_jalali(g(1601, 3, 20)), Err(CalendarError::YearOutOfRange { year: 1601 }));
        assert_eq!(to_jalali(g(624, 3, 1)), Err(CalendarError::YearOutOfRange { year: 624 }));
        assert_eq!(month_length(979, 1), Err(CalendarError::YearOutOfRange { year: 979 }));
        assert_eq!(year_length(-5), Err(CalendarError::YearOutOfRange { year: -5 }));

        assert_eq!(to_gregorian(FIRST_EXACT_JALALI).unwrap(), FIRST_EXACT_GREGORIAN);
        // Early dates still convert to chrono and through the raw arithmetic.
        assert!(NaiveDate::try_from(g(1500, 1, 1)).is_ok());
        assert_eq!(to_jalali_unchecked(1601, 3, 20), j(979, 12, 30));
    }

    #[test]
    fn oversized_year_reports_the_jalali_year() {
        assert_eq!(month_length(300_000, 12), Err(CalendarError::YearOutOfRange { year: 300_000 }));
        assert_eq!(year_length(i32::MAX), Err(CalendarError::YearOutOfRange { year: i32::MAX }));
    }

    #[test]
    fn iso_strings() {
        assert_eq!(jalali_to_iso(1403, 1, 1).unwrap(), "2024-03-20");
        assert_eq!(g(987, 3, 4).to_iso(), "0987-03-04");
        assert_eq!(GregorianDate::parse_iso("2024-03-20").unwrap(), g(2024, 3, 20));
        assert!(matches!(GregorianDate::parse_iso("20-03-2024"), Err(CalendarError::InvalidIsoDate(_))));
    }

    #[test]
    fn jalali_parse_and_display() {
        let d: JalaliDate = "1403/01/01".parse().unwrap();
        assert_eq!(d, j(1403, 1, 1));
        assert_eq!(d.to_string(), "1403/01/01");
        assert_eq!(JalaliDate::parse("1404-12-29").unwrap(), j(1404, 12, 29));
        assert!(JalaliDate::parse("1404-12").is_err());
        assert!(JalaliDate::parse("1404-12-30").is_err());
    }

    #[test]
    fn naive_date_interop() {
        let nd = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        assert_eq!(from_naive(nd), j(1403, 1, 1));
        assert_eq!(NaiveDate::try_from(g(2024, 3, 20)).unwrap(), nd);
        assert_eq!(GregorianDate::from(nd), g(2024, 3, 20));
    }
}
