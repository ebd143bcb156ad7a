// Date utility functions
// Wall-clock conversions, week arithmetic and all-day detection

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Tz;

use crate::models::style::TimeGranularity;

/// Wall-clock representation of an instant in the display time zone.
pub fn to_local(instant: DateTime<Utc>, tz: Tz) -> DateTime<Tz> {
    instant.with_timezone(&tz)
}

/// Calendar date of an instant in the display time zone.
pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    to_local(instant, tz).date_naive()
}

/// Resolve a wall-clock time to an absolute instant.
///
/// Ambiguous times (fall-back) resolve to the earliest instant. Times that do
/// not exist (spring-forward gap) move forward until the clock is valid again.
pub fn resolve_local(tz: Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    let mut probe = naive;
    for _ in 0..8 {
        if let Some(dt) = tz.from_local_datetime(&probe).earliest() {
            return dt.with_timezone(&Utc);
        }
        probe += Duration::minutes(30);
    }
    Utc.from_utc_datetime(&naive)
}

pub fn start_of_day(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    resolve_local(tz, date.and_time(NaiveTime::default()))
}

pub fn end_of_day(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    resolve_local(tz, day_end_naive(date))
}

/// The last displayable second of a day (`23:59:59`).
pub fn day_end_naive(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::default()))
}

/// Signed number of calendar days from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Calculate the start of the week containing the given date.
///
/// # Arguments
/// * `date` - The date to find the week start for
/// * `first_day_of_week` - 0 = Sunday, 1 = Monday, etc.
pub fn get_week_start(date: NaiveDate, first_day_of_week: u8) -> NaiveDate {
    date - Duration::days(week_column(date, first_day_of_week) as i64)
}

/// Zero-based column of `date` in a week row that starts on `first_day_of_week`.
pub fn week_column(date: NaiveDate, first_day_of_week: u8) -> usize {
    let weekday = date.weekday().num_days_from_sunday() as i64;
    ((weekday - first_day_of_week as i64 + 7) % 7) as usize
}

/// Weekdays in display order starting from `first_day_of_week`.
pub fn ordered_weekdays(first_day_of_week: u8) -> [Weekday; 7] {
    let mut day = Weekday::Sun;
    for _ in 0..(first_day_of_week % 7) {
        day = day.succ();
    }
    let mut days = [day; 7];
    for slot in days.iter_mut().skip(1) {
        day = day.succ();
        *slot = day;
    }
    days
}

/// English weekday name used by the header row.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    }
}

/// Week number shown in the week-number column.
///
/// With Monday as first day this is the ISO week. Otherwise weeks are counted
/// from the start of the calendar year, and years that begin in ISO week 52/53
/// push the count forward by one.
pub fn date_week(date: NaiveDate, first_day_of_week: u8) -> u32 {
    let iso = date.iso_week();
    if first_day_of_week == 1 {
        return iso.week();
    }

    let year = date.year();
    let mut week = iso.week() as i64;
    if iso.year() > year {
        // Late December days that ISO assigns to week 1 of next year.
        week = (date - Duration::days(7)).iso_week().week() as i64 + 1;
    } else if iso.year() < year {
        week = 0;
    }

    let year_start_week = NaiveDate::from_ymd_opt(year, 1, 1)
        .map(|jan_1| jan_1.iso_week().week())
        .unwrap_or(1);
    if year_start_week != 1 {
        week += 1;
    }

    week.max(0) as u32
}

/// Largest value reachable when stepping 0..=59 by `increment`.
pub fn max_increment_value(increment: u32) -> u32 {
    let increment = increment.clamp(1, 59);
    (59 / increment) * increment
}

/// Whether a wall-clock interval covers a whole day at the given granularity.
///
/// An end of `23:59:59`, `00:00:00`, or the last value reachable with the
/// configured increment all count as the end of the day.
pub fn is_all_day(
    start: NaiveDateTime,
    end: NaiveDateTime,
    granularity: TimeGranularity,
    increment: u32,
) -> bool {
    let (h1, m1, s1) = (start.hour(), start.minute(), start.second());
    let (h2, m2, s2) = (end.hour(), end.minute(), end.second());
    let max_seconds = max_increment_value(increment);
    let max_minutes = max_increment_value(increment);
    let end_is_midnight = h2 == 0 && m2 == 0 && s2 == 0;

    let (min_match, max_match) = match granularity {
        TimeGranularity::Second => (
            h1 == 0 && m1 == 0 && s1 == 0,
            end_is_midnight
                || (h2 == 23
                    && (m2 == max_minutes || m2 == 59)
                    && (s2 == max_seconds || s2 == 59)),
        ),
        TimeGranularity::Minute => (
            h1 == 0 && m1 == 0,
            end_is_midnight
                || (h2 == 23 && (m2 == max_minutes || m2 == 59))
                || (h1 == 0 && h2 == 0 && m1 == 0 && m2 == 0),
        ),
        TimeGranularity::Hour => (h1 == 0, end_is_midnight || h2 == 23 || (h1 == 0 && h2 == 0)),
    };

    min_match && max_match
}

/// Whether `month` precedes the focal month, wrapping December into January.
pub fn is_past_month(month: u32, current_month: u32) -> bool {
    match (current_month, month) {
        (1, 12) => true,
        (12, 1) => false,
        _ => month < current_month,
    }
}

/// Whether `month` follows the focal month, wrapping December into January.
pub fn is_future_month(month: u32, current_month: u32) -> bool {
    match (current_month, month) {
        (12, 1) => true,
        (1, 12) => false,
        _ => month > current_month,
    }
}
