// Range module
// The dates a render pass covers, resolved from a date argument

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};
use crate::utils::date::{end_of_day, get_week_start, local_date, start_of_day};

/// Size of the calendar unit being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Year,
    #[default]
    Month,
    Week,
    Day,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Year => "year",
            Granularity::Month => "month",
            Granularity::Week => "week",
            Granularity::Day => "day",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "year" => Ok(Granularity::Year),
            "month" => Ok(Granularity::Month),
            "week" => Ok(Granularity::Week),
            "day" => Ok(Granularity::Day),
            other => Err(GridError::configuration(format!(
                "Unknown calendar granularity: {}",
                other
            ))),
        }
    }
}

/// The min/max instants of the current render plus the display context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibleRange {
    pub min: DateTime<Utc>,
    pub max: DateTime<Utc>,
    pub granularity: Granularity,
    pub timezone: Tz,
    pub today: NaiveDate,
    pub first_day_of_week: u8,
}

impl VisibleRange {
    /// Create a range covering whole days from `min_date` to `max_date`.
    pub fn new(
        min_date: NaiveDate,
        max_date: NaiveDate,
        granularity: Granularity,
        timezone: Tz,
        today: NaiveDate,
        first_day_of_week: u8,
    ) -> Result<Self> {
        if max_date < min_date {
            return Err(GridError::configuration(format!(
                "Range end {} is before range start {}",
                max_date, min_date
            )));
        }

        Ok(Self {
            min: start_of_day(min_date, timezone),
            max: end_of_day(max_date, timezone),
            granularity,
            timezone,
            today,
            first_day_of_week,
        })
    }

    pub fn for_year(year: i32, timezone: Tz, today: NaiveDate, first_day_of_week: u8) -> Result<Self> {
        let min = ymd(year, 1, 1)?;
        let max = ymd(year, 12, 31)?;
        Self::new(min, max, Granularity::Year, timezone, today, first_day_of_week)
    }

    pub fn for_month(
        year: i32,
        month: u32,
        timezone: Tz,
        today: NaiveDate,
        first_day_of_week: u8,
    ) -> Result<Self> {
        let min = ymd(year, month, 1)?;
        let max = last_day_of_month(year, month)?;
        Self::new(min, max, Granularity::Month, timezone, today, first_day_of_week)
    }

    /// The week holding ISO week `week` of `iso_year`, aligned to the first day of week.
    pub fn for_week(
        iso_year: i32,
        week: u32,
        timezone: Tz,
        today: NaiveDate,
        first_day_of_week: u8,
    ) -> Result<Self> {
        let monday = NaiveDate::from_isoywd_opt(iso_year, week, Weekday::Mon).ok_or_else(|| {
            GridError::configuration(format!("Week {} does not exist in {}", week, iso_year))
        })?;
        let min = get_week_start(monday, first_day_of_week);
        let max = min + Duration::days(6);
        Self::new(min, max, Granularity::Week, timezone, today, first_day_of_week)
    }

    pub fn for_day(date: NaiveDate, timezone: Tz, today: NaiveDate, first_day_of_week: u8) -> Result<Self> {
        Self::new(date, date, Granularity::Day, timezone, today, first_day_of_week)
    }

    /// Resolve a date argument for the requested granularity.
    ///
    /// Accepted forms: `YYYY` (year), `YYYY-MM` or `YYYYMM` (month),
    /// `YYYYWW` or `YYYY-Www` (week), `YYYY-MM-DD` or `YYYYMMDD` (day).
    pub fn from_argument(
        argument: Option<&str>,
        granularity: Granularity,
        timezone: Tz,
        today: NaiveDate,
        first_day_of_week: u8,
    ) -> Result<Self> {
        let value = argument.map(str::trim).filter(|v| !v.is_empty()).ok_or_else(|| {
            GridError::configuration("No calendar date argument value was provided.")
        })?;

        let invalid = || {
            GridError::configuration(format!(
                "The value {} is not a valid date argument for {}",
                value, granularity
            ))
        };

        match granularity {
            Granularity::Year => {
                let year = parse_year(value).ok_or_else(invalid)?;
                Self::for_year(year, timezone, today, first_day_of_week)
            }
            Granularity::Month => {
                let (year, month) = parse_year_month(value).ok_or_else(invalid)?;
                Self::for_month(year, month, timezone, today, first_day_of_week)
            }
            Granularity::Week => {
                let (year, week) = parse_year_week(value).ok_or_else(invalid)?;
                Self::for_week(year, week, timezone, today, first_day_of_week).map_err(|_| invalid())
            }
            Granularity::Day => {
                let date = parse_day(value).ok_or_else(invalid)?;
                Self::for_day(date, timezone, today, first_day_of_week)
            }
        }
    }

    /// First calendar day of the range in the display time zone.
    pub fn min_date(&self) -> NaiveDate {
        local_date(self.min, self.timezone)
    }

    /// Last calendar day of the range in the display time zone.
    pub fn max_date(&self) -> NaiveDate {
        local_date(self.max, self.timezone)
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.min_date() && date <= self.max_date()
    }

    /// Year and month the range is centered on.
    pub fn focal_month(&self) -> (i32, u32) {
        let min = self.min_date();
        (min.year(), min.month())
    }

    /// Every calendar day of the range, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let max = self.max_date();
        self.min_date().iter_days().take_while(move |day| *day <= max)
    }
}

fn ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| GridError::configuration(format!("Invalid date {}-{:02}-{:02}", year, month, day)))
}

pub fn last_day_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    Ok(ymd(next_year, next_month, 1)? - Duration::days(1))
}

fn all_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

fn parse_year(value: &str) -> Option<i32> {
    if value.len() == 4 && all_digits(value) {
        value.parse().ok()
    } else {
        None
    }
}

fn parse_year_month(value: &str) -> Option<(i32, u32)> {
    let (year, month) = match value.split_once('-') {
        Some((year, month)) => (year, month),
        None if value.len() == 6 => (value.get(..4)?, value.get(4..)?),
        None => return None,
    };
    if month.len() != 2 || !all_digits(month) {
        return None;
    }
    let year = parse_year(year)?;
    let month: u32 = month.parse().ok()?;
    (1..=12).contains(&month).then_some((year, month))
}

fn parse_year_week(value: &str) -> Option<(i32, u32)> {
    let (year, week) = match value.split_once('-') {
        Some((year, week)) => (year, week.strip_prefix(['W', 'w'])?),
        None if value.len() == 6 => (value.get(..4)?, value.get(4..)?),
        None => return None,
    };
    if week.len() != 2 || !all_digits(week) {
        return None;
    }
    let year = parse_year(year)?;
    let week: u32 = week.parse().ok()?;
    (1..=53).contains(&week).then_some((year, week))
}

fn parse_day(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            if value.len() == 8 && all_digits(value) {
                NaiveDate::parse_from_str(value, "%Y%m%d").ok()
            } else {
                None
            }
        })
}
