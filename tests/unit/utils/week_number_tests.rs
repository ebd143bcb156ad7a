// Unit tests for week numbering and week alignment
// Week numbers shown in the month grid's leading column

use calendar_grid::utils::date::{date_week, get_week_start, week_column};
use chrono::NaiveDate;
use test_case::test_case;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test_case(date(2021, 1, 4), 1; "first iso week of 2021")]
#[test_case(date(2020, 12, 31), 53; "53-week year")]
#[test_case(date(2016, 1, 1), 53; "new year in previous iso year")]
#[test_case(date(2024, 12, 30), 1; "late december in next iso year")]
fn test_monday_first_is_iso(day: NaiveDate, expected: u32) {
    assert_eq!(date_week(day, 1), expected);
}

#[test_case(date(2021, 1, 4), 2; "shifted by year start")]
#[test_case(date(2016, 1, 1), 1; "january first counts as week one")]
#[test_case(date(2024, 12, 30), 53; "december stays in its own year")]
#[test_case(date(2025, 4, 6), 14; "mid year")]
fn test_sunday_first(day: NaiveDate, expected: u32) {
    assert_eq!(date_week(day, 0), expected);
}

#[test]
fn test_week_start_and_column_agree() {
    for first_day in 0..7u8 {
        for offset in 0..14 {
            let day = date(2025, 4, 1) + chrono::Duration::days(offset);
            let start = get_week_start(day, first_day);
            assert!(start <= day);
            assert_eq!((day - start).num_days() as usize, week_column(day, first_day));
        }
    }
}
