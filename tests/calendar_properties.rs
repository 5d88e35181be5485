use chrono::{Duration, NaiveDate};
use habit_inception::{
    calendar::{month_grid, start_day_of_week, saturday_index, MonthCursor},
    error::CalendarError,
    habits::HabitLog,
    jalali::{self, GregorianDate, JalaliDate, FIRST_EXACT_GREGORIAN, FIRST_EXACT_JALALI},
};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

/// Day after `j` on the Jalali calendar.
fn jalali_successor(j: JalaliDate) -> JalaliDate {
    let len = jalali::month_length(j.year, j.month).unwrap();
    match (j.day < len, j.month < 12) {
        (true, _)      => JalaliDate { day: j.day + 1, ..j },
        (false, true)  => JalaliDate { month: j.month + 1, day: 1, ..j },
        (false, false) => JalaliDate { year: j.year + 1, month: 1, day: 1 },
    }
}

#[test]
fn gregorian_round_trip_is_exact_and_monotonic() {
    let start = NaiveDate::try_from(FIRST_EXACT_GREGORIAN).unwrap();
    let end   = ymd(3000, 12, 31);

    let mut day  = start;
    let mut prev = FIRST_EXACT_JALALI;
    assert_eq!(jalali::from_naive(start), FIRST_EXACT_JALALI);

    while day < end {
        day += Duration::days(1);
        let g = GregorianDate::from(day);
        let j = g.to_jalali().unwrap();

        assert_eq!(j, jalali_successor(prev), "not consecutive at {g}");
        assert_eq!(j.to_gregorian().unwrap(), g, "round trip failed at {g}");
        prev = j;
    }
}

#[test]
fn every_jalali_date_round_trips() {
    for year in 980..=2300 {
        for month in 1..=12 {
            let len = jalali::month_length(year, month).unwrap();
            for day in 1..=len {
                let j = JalaliDate { year, month, day };
                let g = j.to_gregorian().unwrap();
                assert!(g.validate().is_ok(), "{j} -> invalid {g:?}");
                assert_eq!(g.to_jalali().unwrap(), j);
            }
        }
    }
}

#[test]
fn month_lengths_stay_in_bounds() {
    for year in 980..=2300 {
        let total: u32 = (1..=12).map(|m| jalali::month_length(year, m).unwrap()).sum();
        assert!(total == 365 || total == 366, "year {year} has {total} days");
        assert_eq!(total, jalali::year_length(year).unwrap());
        assert_eq!(jalali::is_leap_year(year).unwrap(), !jalali::esfand_overflows(year));
    }
}

#[test]
fn leap_years_follow_mostly_four_year_spacing() {
    let leaps: Vec<i32> = (1300..=1500).filter(|&y| jalali::is_leap_year(y).unwrap()).collect();
    for pair in leaps.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(gap == 4 || gap == 5, "gap {gap} between {} and {}", pair[0], pair[1]);
    }
}

#[test]
fn grids_are_complete() {
    let today = ymd(2024, 3, 20);
    for year in 1300..=1500 {
        for month in 1..=12 {
            let grid = month_grid(year, month, &[], today).unwrap();
            let len  = jalali::month_length(year, month).unwrap();
            let start = start_day_of_week(year, month).unwrap();

            assert!(start < 7);
            assert_eq!(grid.start_day_of_week, start);
            assert_eq!(grid.cells.len() as u32, start + len);

            let days: Vec<u32> = grid.cells.iter().filter_map(|c| c.day_number).collect();
            assert_eq!(days, (1..=len).collect::<Vec<_>>());
            assert!(grid.weeks().iter().all(|w| w.len() == 7));

            // The next month starts where this one leaves off.
            let next = MonthCursor { year, month }.next();
            assert_eq!(start_day_of_week(next.year, next.month).unwrap(), (start + len) % 7);
        }
    }
}

#[test]
fn grid_marks_logged_days() {
    let logs = vec![
        HabitLog { date: "2025-03-20".into(), completed: true,  notes: None },
        HabitLog { date: "2025-03-19".into(), completed: false, notes: None },
        HabitLog { date: "2025-03-01".into(), completed: true,  notes: None },
    ];
    let grid = month_grid(1403, 12, &logs, ymd(2025, 3, 20)).unwrap();

    assert_eq!(grid.days_in_month, 30);
    assert_eq!(grid.start_day_of_week, 3);
    let last = grid.day(30).unwrap();
    assert!(last.is_completed && last.is_today);
    assert_eq!(last.iso_date.as_deref(), Some("2025-03-20"));
    assert!(!grid.day(29).unwrap().is_completed);
    assert!(grid.day(11).unwrap().is_completed);
    assert_eq!(grid.completed_days(), 2);
}

#[test]
fn weekday_index_matches_chrono() {
    // 2024-03-20 was a Wednesday; Saturday is column 0.
    assert_eq!(saturday_index(ymd(2024, 3, 20)), 4);
    assert_eq!(saturday_index(ymd(2024, 3, 16)), 0);
    assert_eq!(saturday_index(ymd(2024, 3, 22)), 6);
}

#[test]
fn checked_api_rejects_impossible_dates() {
    assert_eq!(
        jalali::to_gregorian(JalaliDate { year: 1404, month: 12, day: 30 }),
        Err(CalendarError::DayOutOfRange { year: 1404, month: 12, day: 30, max: 29 }),
    );
    assert_eq!(
        jalali::to_jalali(GregorianDate { year: 2023, month: 2, day: 29 }),
        Err(CalendarError::DayOutOfRange { year: 2023, month: 2, day: 29, max: 28 }),
    );
    assert_eq!(jalali::month_length(1403, 13), Err(CalendarError::MonthOutOfRange { month: 13 }));
    assert_eq!(
        month_grid(1403, 0, &[], ymd(2024, 3, 20)).unwrap_err(),
        CalendarError::MonthOutOfRange { month: 0 },
    );
    assert!(jalali::jalali_to_iso(0, 1, 1).is_err());
}

#[test]
fn checked_api_rejects_the_early_epoch() {
    for year in 1..FIRST_EXACT_JALALI.year {
        let err = CalendarError::YearOutOfRange { year };
        assert_eq!(jalali::to_gregorian(JalaliDate { year, month: 1, day: 1 }).unwrap_err(), err);
        assert_eq!(jalali::month_length(year, 12).unwrap_err(), err);
        assert_eq!(month_grid(year, 1, &[], ymd(2024, 3, 20)).unwrap_err(), err);
    }

    let day_before = NaiveDate::try_from(FIRST_EXACT_GREGORIAN).unwrap() - Duration::days(1);
    assert_eq!(
        GregorianDate::from(day_before).to_jalali(),
        Err(CalendarError::YearOutOfRange { year: 1601 }),
    );
    assert!(FIRST_EXACT_GREGORIAN.to_jalali().is_ok());
    assert!(MonthCursor { year: FIRST_EXACT_JALALI.year, month: 1 }.prev()
        .grid(&[], ymd(2024, 3, 20)).is_err());
}
