/// Errors raised by the checked calendar conversions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    #[error("month {month} is outside 1..=12")]
    MonthOutOfRange { month: u32 },

    #[error("day {day} is outside 1..={max} for {year}-{month:02}")]
    DayOutOfRange { year: i32, month: u32, day: u32, max: u32 },

    #[error("year {year} is outside the range with exact conversions")]
    YearOutOfRange { year: i32 },

    #[error("not an ISO date (YYYY-MM-DD): {0:?}")]
    InvalidIsoDate(String),
}

pub type Result<T> = std::result::Result<T, CalendarError>;
